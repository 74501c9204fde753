//! Per-frame probe data.
//!
//! These types hold what shading needs from a probe, copied from the render
//! world when a frame begins. [`GpuProbeData`] is the packed form for upload.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::influence::InfluenceVolume;
use crate::probe::{ProbeId, ReflectionProbe, ReflectionProbeType};
use crate::resources::Texture;

/// Index used in [`GpuProbeData::texture_index`] when a probe has no map.
pub const NO_TEXTURE: u32 = u32::MAX;

/// A probe as seen by one frame.
#[derive(Debug, Clone)]
pub struct ExtractedProbe {
    pub id: ProbeId,
    pub volume: InfluenceVolume,
    /// Map used for shading: the custom texture, or the latest capture.
    pub texture: Option<Arc<Texture>>,
    pub is_custom: bool,
}

impl ExtractedProbe {
    pub fn from_probe(probe: &ReflectionProbe) -> Self {
        Self {
            id: probe.id(),
            volume: probe.influence_volume(),
            texture: probe.shading_texture().cloned(),
            is_custom: probe.custom_texture().is_some(),
        }
    }

    /// Packed form. `texture_index` is the slot of the probe's map in the
    /// frame's texture table.
    pub fn to_gpu(&self, texture_index: Option<u32>) -> GpuProbeData {
        let (position, radius, half_extents, rotation, kind) = match self.volume {
            InfluenceVolume::Sphere { center, radius } => (
                center,
                radius,
                Vec3::splat(radius),
                [0.0, 0.0, 0.0, 1.0],
                ReflectionProbeType::Sphere,
            ),
            InfluenceVolume::Box { pose, half_extents } => (
                pose.position,
                half_extents.length(),
                half_extents,
                pose.rotation.to_array(),
                ReflectionProbeType::Box,
            ),
        };
        GpuProbeData {
            position_radius: position.extend(radius).to_array(),
            half_extents: half_extents.extend(0.0).to_array(),
            rotation,
            texture_index: texture_index.unwrap_or(NO_TEXTURE),
            mip_count: self
                .texture
                .as_ref()
                .map_or(0, |texture| texture.mip_level_count()),
            probe_type: match kind {
                ReflectionProbeType::Sphere => 0,
                ReflectionProbeType::Box => 1,
            },
            flags: u32::from(self.is_custom),
        }
    }
}

/// Probe layout for shader upload (std430 compatible).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuProbeData {
    /// World position in xyz, bounding radius in w.
    pub position_radius: [f32; 4],
    /// Box half extents in xyz. Sphere probes repeat the radius.
    pub half_extents: [f32; 4],
    /// Probe-to-world rotation quaternion (x, y, z, w).
    pub rotation: [f32; 4],
    pub texture_index: u32,
    pub mip_count: u32,
    /// 0 for sphere, 1 for box.
    pub probe_type: u32,
    /// Bit 0: custom texture.
    pub flags: u32,
}

static_assertions::const_assert_eq!(std::mem::size_of::<GpuProbeData>(), 64);

#[cfg(test)]
mod tests {
    use super::*;
    use radiance_core::math::Pose;

    #[test]
    fn test_sphere_probe_packing() {
        let mut probe = ReflectionProbe::new();
        probe.set_type(ReflectionProbeType::Sphere);
        probe.set_radius(5.0).unwrap();
        probe
            .set_pose(Pose::from_translation(Vec3::new(1.0, 2.0, 3.0)))
            .unwrap();

        let extracted = ExtractedProbe::from_probe(&probe);
        assert_eq!(extracted.id, probe.id());
        assert!(extracted.texture.is_none());

        let gpu = extracted.to_gpu(None);
        assert_eq!(gpu.position_radius, [1.0, 2.0, 3.0, 5.0]);
        assert_eq!(gpu.probe_type, 0);
        assert_eq!(gpu.texture_index, NO_TEXTURE);
        assert_eq!(gpu.mip_count, 0);
    }

    #[test]
    fn test_box_probe_packing() {
        let mut probe = ReflectionProbe::new();
        probe.set_extents(Vec3::new(2.0, 1.0, 2.0)).unwrap();

        let gpu = ExtractedProbe::from_probe(&probe).to_gpu(Some(3));
        assert_eq!(gpu.half_extents, [2.0, 1.0, 2.0, 0.0]);
        assert_eq!(gpu.rotation, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(gpu.probe_type, 1);
        assert_eq!(gpu.texture_index, 3);
        assert_eq!(bytemuck::bytes_of(&gpu).len(), 64);
    }
}
