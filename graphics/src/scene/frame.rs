//! Read-only view of one frame.

use glam::Vec3;

use super::camera_system::{CameraId, ExtractedCamera};
use super::extracted::{ExtractedProbe, GpuProbeData};
use super::render_world::RenderWorld;
use crate::capture::mip_for_roughness;
use crate::influence::ProbeInfluence;
use crate::resources::Texture;
use crate::stages::FramePlan;

/// Everything a frame's consumers read: camera plans built from settings
/// snapshots, the probes as they were when the frame began, and the probe
/// influence query.
///
/// Returned by [`Renderer::begin_frame`](crate::Renderer::begin_frame) and
/// dropped before [`Renderer::end_frame`](crate::Renderer::end_frame).
#[derive(Debug)]
pub struct FrameContext<'a> {
    frame_index: u64,
    world: &'a RenderWorld,
    cameras: Vec<ExtractedCamera>,
    probes: Vec<ExtractedProbe>,
}

impl<'a> FrameContext<'a> {
    pub(crate) fn new(
        frame_index: u64,
        world: &'a RenderWorld,
        cameras: Vec<ExtractedCamera>,
    ) -> Self {
        Self {
            frame_index,
            world,
            cameras,
            probes: world.extract_probes(),
        }
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Cameras in render order.
    pub fn cameras(&self) -> &[ExtractedCamera] {
        &self.cameras
    }

    pub fn camera(&self, id: CameraId) -> Option<&ExtractedCamera> {
        self.cameras.iter().find(|c| c.id == id)
    }

    pub fn plan(&self, id: CameraId) -> Option<&FramePlan> {
        self.camera(id).map(|c| &c.plan)
    }

    /// Total passes across all cameras.
    pub fn pass_count(&self) -> usize {
        self.cameras.iter().map(|c| c.plan.stages().len()).sum()
    }

    pub fn probes(&self) -> &[ExtractedProbe] {
        &self.probes
    }

    /// Probes packed for upload. Probes with a map get consecutive texture
    /// indices in probe order.
    pub fn gpu_probe_data(&self) -> Vec<GpuProbeData> {
        let mut next_index = 0;
        self.probes
            .iter()
            .map(|probe| {
                let index = probe.texture.as_ref().map(|_| {
                    next_index += 1;
                    next_index - 1
                });
                probe.to_gpu(index)
            })
            .collect()
    }

    /// Probes influencing `point`, or the sky if none does.
    pub fn influence_at(&self, point: Vec3) -> ProbeInfluence {
        self.world.influence_at(point)
    }

    /// Reflected radiance seen from `point` along `direction` on a surface of
    /// `roughness`.
    ///
    /// Blends the maps of the influencing probes. Probe maps without texel
    /// data are skipped; when nothing is left the sky map is used, then the
    /// scene's sky color.
    pub fn sample_reflection(&self, point: Vec3, direction: Vec3, roughness: f32) -> Vec3 {
        let mut sum = Vec3::ZERO;
        let mut total = 0.0;
        for weight in self.influence_at(point).weights() {
            let radiance = self
                .world
                .probe(weight.probe)
                .and_then(|p| p.shading_texture())
                .and_then(|texture| sample(texture, direction, roughness));
            if let Some(radiance) = radiance {
                sum += radiance * weight.weight;
                total += weight.weight;
            }
        }
        if total > 0.0 {
            return sum / total;
        }

        self.world
            .sky()
            .and_then(|sky| sample(sky, direction, roughness))
            .or_else(|| self.world.scene().map(|scene| scene.sky))
            .unwrap_or(Vec3::ZERO)
    }
}

fn sample(texture: &Texture, direction: Vec3, roughness: f32) -> Option<Vec3> {
    texture.sample(
        direction,
        mip_for_roughness(roughness, texture.mip_level_count()),
    )
}
