//! RenderWorld holds the scene, its reflection probes and the sky map.
//!
//! Probe influence queries go through a [`ProbeGrid`] built from every probe
//! that has a map to shade with. Edits through [`RenderWorld::probe_mut`]
//! mark the grid stale; [`RenderWorld::prepare`] rebuilds it. Queries made
//! while the grid is stale fall back to testing every probe, so results are
//! always current.

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::Vec3;
use radiance_core::scene::Scene;

use super::extracted::ExtractedProbe;
use crate::error::ProbeError;
use crate::influence::{DEFAULT_CELL_SIZE, ProbeGrid, ProbeInfluence};
use crate::probe::{ProbeId, ReflectionProbe};
use crate::resources::Texture;

/// Scene state shared by all cameras.
///
/// # Usage
///
/// ```ignore
/// let mut world = RenderWorld::new(8.0);
/// world.set_scene(Some(Arc::new(scene)));
/// let id = world.add_probe(ReflectionProbe::new());
///
/// world.prepare();
/// let influence = world.influence_at(point);
/// ```
#[derive(Debug)]
pub struct RenderWorld {
    scene: Option<Arc<Scene>>,
    probes: BTreeMap<ProbeId, ReflectionProbe>,
    /// Global fallback map when no local probe covers a point.
    sky: Option<Arc<Texture>>,
    grid: ProbeGrid,
    grid_dirty: bool,
}

impl RenderWorld {
    /// Create an empty world whose influence grid uses `cell_size` cells.
    pub fn new(cell_size: f32) -> Self {
        Self {
            scene: None,
            probes: BTreeMap::new(),
            sky: None,
            grid: ProbeGrid::new(cell_size),
            grid_dirty: false,
        }
    }

    pub fn scene(&self) -> Option<&Arc<Scene>> {
        self.scene.as_ref()
    }

    /// Replace the scene. Every probe's generated map becomes stale.
    pub fn set_scene(&mut self, scene: Option<Arc<Scene>>) {
        self.scene = scene;
        for probe in self.probes.values_mut() {
            probe.invalidate();
        }
        log::debug!(
            "Scene {} ({} probes invalidated)",
            if self.scene.is_some() { "set" } else { "cleared" },
            self.probes.len()
        );
    }

    pub fn sky(&self) -> Option<&Arc<Texture>> {
        self.sky.as_ref()
    }

    /// Set the global sky map.
    ///
    /// # Errors
    ///
    /// [`ProbeError::InvalidConfiguration`] if `sky` is not a cube map.
    pub fn set_sky(&mut self, sky: Option<Arc<Texture>>) -> Result<(), ProbeError> {
        if let Some(texture) = &sky
            && !texture.is_cube()
        {
            return Err(ProbeError::InvalidConfiguration(format!(
                "sky texture {:?} is not a cube map",
                texture.label()
            )));
        }
        self.sky = sky;
        Ok(())
    }

    /// Attach a probe. Returns its id.
    pub fn add_probe(&mut self, probe: ReflectionProbe) -> ProbeId {
        let id = probe.id();
        log::trace!("Attached {}", id);
        self.probes.insert(id, probe);
        self.grid_dirty = true;
        id
    }

    /// Detach a probe. Its pending capture is cancelled when it is dropped.
    pub fn remove_probe(&mut self, id: ProbeId) -> Option<ReflectionProbe> {
        let probe = self.probes.remove(&id)?;
        log::trace!("Detached {}", id);
        self.grid_dirty = true;
        Some(probe)
    }

    pub fn probe(&self, id: ProbeId) -> Option<&ReflectionProbe> {
        self.probes.get(&id)
    }

    /// Mutable access to a probe. Marks the influence grid stale.
    pub fn probe_mut(&mut self, id: ProbeId) -> Option<&mut ReflectionProbe> {
        let probe = self.probes.get_mut(&id)?;
        self.grid_dirty = true;
        Some(probe)
    }

    /// Probes in id order.
    pub fn probes(&self) -> impl Iterator<Item = &ReflectionProbe> {
        self.probes.values()
    }

    pub(crate) fn probes_mut(&mut self) -> impl Iterator<Item = &mut ReflectionProbe> {
        self.grid_dirty = true;
        self.probes.values_mut()
    }

    pub fn probe_count(&self) -> usize {
        self.probes.len()
    }

    /// Ids of auto probes whose map is missing or stale.
    pub fn dirty_probes(&self) -> Vec<ProbeId> {
        self.probes
            .values()
            .filter(|p| p.needs_capture())
            .map(ReflectionProbe::id)
            .collect()
    }

    pub(crate) fn mark_grid_dirty(&mut self) {
        self.grid_dirty = true;
    }

    pub fn is_grid_dirty(&self) -> bool {
        self.grid_dirty
    }

    pub fn grid(&self) -> &ProbeGrid {
        &self.grid
    }

    /// Rebuild the influence grid if probes changed since the last call.
    pub fn prepare(&mut self) {
        if !self.grid_dirty {
            return;
        }
        self.grid.clear();
        for probe in self.probes.values() {
            if probe.shading_texture().is_some() {
                self.grid.insert(probe.id(), probe.influence_volume());
            }
        }
        self.grid_dirty = false;
        log::trace!(
            "Rebuilt probe grid: {} of {} probes",
            self.grid.len(),
            self.probes.len()
        );
    }

    /// Probes influencing `point`, or the sky if none does.
    pub fn influence_at(&self, point: Vec3) -> ProbeInfluence {
        if !self.grid_dirty {
            return self.grid.query(point);
        }
        let volumes: Vec<_> = self
            .probes
            .values()
            .filter(|p| p.shading_texture().is_some())
            .map(|p| (p.id(), p.influence_volume()))
            .collect();
        ProbeInfluence::blend(point, volumes.iter().map(|(id, volume)| (*id, volume)))
    }

    /// Snapshot of every probe for a frame.
    pub fn extract_probes(&self) -> Vec<ExtractedProbe> {
        self.probes.values().map(ExtractedProbe::from_probe).collect()
    }

    /// Maps a frame in flight may read: every probe's shading map and the sky.
    pub fn shading_textures(&self) -> Vec<Arc<Texture>> {
        self.probes
            .values()
            .filter_map(|p| p.shading_texture().cloned())
            .chain(self.sky.clone())
            .collect()
    }
}

impl Default for RenderWorld {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::GraphicsDevice;
    use crate::probe::ReflectionProbeType;
    use crate::types::{TextureDescriptor, TextureFormat, TextureUsage};
    use radiance_core::math::Pose;
    use radiance_core::texture::CpuCubemap;

    fn cube(device: &Arc<GraphicsDevice>) -> Arc<Texture> {
        device
            .create_cubemap_texture("cube", TextureFormat::Rgba16Float, CpuCubemap::new(8, 1))
            .unwrap()
    }

    fn sphere_probe(center: Vec3, radius: f32) -> ReflectionProbe {
        let mut probe = ReflectionProbe::new();
        probe.set_type(ReflectionProbeType::Sphere);
        probe.set_radius(radius).unwrap();
        probe.set_pose(Pose::from_translation(center)).unwrap();
        probe
    }

    #[test]
    fn test_add_remove_probe() {
        let mut world = RenderWorld::default();
        let id = world.add_probe(ReflectionProbe::new());
        assert_eq!(world.probe_count(), 1);
        assert!(world.probe(id).is_some());
        assert_eq!(world.dirty_probes(), [id]);

        assert!(world.remove_probe(id).is_some());
        assert!(world.remove_probe(id).is_none());
        assert_eq!(world.probe_count(), 0);
    }

    #[test]
    fn test_probes_without_maps_do_not_influence() {
        let mut world = RenderWorld::default();
        world.add_probe(sphere_probe(Vec3::ZERO, 5.0));
        world.prepare();

        assert!(world.grid().is_empty());
        assert!(world.influence_at(Vec3::ZERO).is_sky());
    }

    #[test]
    fn test_custom_probe_influences_after_prepare() {
        let device = GraphicsDevice::dummy();
        let mut world = RenderWorld::default();
        let id = world.add_probe(sphere_probe(Vec3::ZERO, 5.0));
        world
            .probe_mut(id)
            .unwrap()
            .set_custom_texture(Some(cube(&device)))
            .unwrap();

        // Stale grid still answers correctly.
        assert!(world.is_grid_dirty());
        assert_eq!(world.influence_at(Vec3::X).weight_of(id), 1.0);

        world.prepare();
        assert!(!world.is_grid_dirty());
        assert_eq!(world.grid().len(), 1);
        assert_eq!(world.influence_at(Vec3::X).weight_of(id), 1.0);
        assert!(world.influence_at(Vec3::splat(10.0)).is_sky());
    }

    #[test]
    fn test_set_scene_invalidates_probes() {
        let device = GraphicsDevice::dummy();
        let mut world = RenderWorld::default();
        let auto = world.add_probe(ReflectionProbe::new());
        let custom = world.add_probe(ReflectionProbe::new());
        world
            .probe_mut(custom)
            .unwrap()
            .set_custom_texture(Some(cube(&device)))
            .unwrap();

        world.set_scene(Some(Arc::new(Scene::new())));
        assert_eq!(world.dirty_probes(), [auto]);
        assert!(world.scene().is_some());
    }

    #[test]
    fn test_sky_must_be_cube() {
        let device = GraphicsDevice::dummy();
        let mut world = RenderWorld::default();
        let flat = device
            .create_texture(&TextureDescriptor::new_2d(
                8,
                8,
                TextureFormat::Rgba16Float,
                TextureUsage::TEXTURE_BINDING,
            ))
            .unwrap();

        assert!(matches!(
            world.set_sky(Some(flat)),
            Err(ProbeError::InvalidConfiguration(_))
        ));
        assert!(world.sky().is_none());

        world.set_sky(Some(cube(&device))).unwrap();
        assert_eq!(world.shading_textures().len(), 1);
    }
}
