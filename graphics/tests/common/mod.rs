//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use glam::Vec3;
use radiance_core::math::Pose;
use radiance_core::scene::{Material, Scene, Shape, Surface};
use radiance_core::texture::CpuCubemap;
use radiance_graphics::{
    CaptureConfig, DeviceCapabilities, DummyBackend, GraphicsDevice, ReflectionProbe,
    ReflectionProbeType, Texture, TextureFormat,
};

/// Route `log` output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

/// Capture settings small enough for the software backend to finish fast.
pub fn small_capture() -> CaptureConfig {
    CaptureConfig {
        resolution: 16,
        mip_levels: 3,
        sample_count: 16,
        timeout_ms: 30_000,
        ..CaptureConfig::default()
    }
}

/// Device on a dummy backend that holds work until flushed, plus the backend.
pub fn deferred_device() -> (Arc<GraphicsDevice>, Arc<DummyBackend>) {
    let backend = Arc::new(DummyBackend::deferred());
    let device = GraphicsDevice::new(
        "Deferred",
        backend.clone(),
        DeviceCapabilities::default(),
    );
    (device, backend)
}

/// Dark scene with one red emitter of radius 1 centered at `center`.
pub fn red_sphere_scene(center: Vec3) -> Arc<Scene> {
    Arc::new(
        Scene::new().with_surface(
            Surface::new(
                Shape::Sphere {
                    center,
                    radius: 1.0,
                },
                Material::emissive(Vec3::new(5.0, 0.0, 0.0)),
            )
            .with_name("red emitter"),
        ),
    )
}

pub fn sphere_probe(center: Vec3, radius: f32) -> ReflectionProbe {
    let mut probe = ReflectionProbe::new();
    probe.set_type(ReflectionProbeType::Sphere);
    probe.set_radius(radius).expect("valid radius");
    probe
        .set_pose(Pose::from_translation(center))
        .expect("valid pose");
    probe
}

/// Cube texture filled with one color on every face and mip.
pub fn uniform_cube(device: &Arc<GraphicsDevice>, color: Vec3) -> Arc<Texture> {
    device
        .create_cubemap_texture(
            "uniform",
            TextureFormat::Rgba16Float,
            CpuCubemap::from_fn(8, |_, _, _, _| color),
        )
        .expect("cube texture")
}
