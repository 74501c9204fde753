use glam::Vec3;
use radiance_core::compute::{CancellationToken, Cancelled};
use radiance_core::math::CubeFace;
use radiance_core::scene::{Ray, Scene};
use radiance_core::texture::{CpuCubemap, CubemapMip};

use crate::config::CaptureConfig;

/// Render the six 90° views around `origin` into a single-level radiance cube map.
///
/// Each texel traces the scene along the direction through its center,
/// ignoring surfaces outside the near/far range. The token is checked before
/// every face.
pub fn render_radiance_cubemap(
    scene: &Scene,
    origin: Vec3,
    config: &CaptureConfig,
    token: &CancellationToken,
) -> Result<CpuCubemap, Cancelled> {
    let mut map = CpuCubemap::new(config.resolution, 1);
    if let Some(level) = map.mip_mut(0) {
        for face in CubeFace::ALL {
            token.checkpoint()?;
            render_face(scene, origin, config, face, level);
        }
    }
    log::trace!(
        "Rendered {}px radiance cube at {origin}",
        config.resolution
    );
    Ok(map)
}

fn render_face(
    scene: &Scene,
    origin: Vec3,
    config: &CaptureConfig,
    face: CubeFace,
    level: &mut CubemapMip,
) {
    let size = level.size();
    for y in 0..size {
        for x in 0..size {
            let ray = Ray::new(origin, face.texel_direction(x, y, size));
            let radiance = scene.radiance(&ray, config.near_plane, config.far_plane);
            level.set_texel(face, x, y, radiance);
        }
    }
}
