//! # Radiance Graphics
//!
//! Reflection-probe capture and per-camera render settings for the Radiance
//! renderer.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`ReflectionProbe`] - Scene-attached capture unit producing a GGX
//!   pre-filtered environment map, or referencing a custom one
//! - [`GpuBackend`] - Trait for backends executing captures and frames
//!   ([`SoftwareBackend`] ray-casts on worker threads, [`DummyBackend`] is for testing)
//! - [`RenderSettings`] / [`SharedRenderSettings`] - Per-camera settings with
//!   snapshot semantics
//! - [`FramePlan`] - Stages a camera runs this frame, ordered by a [`RenderGraph`]
//! - [`ProbeGrid`] - Uniform-grid probe influence query with sky fallback
//! - [`Renderer`] - Ties device, world, cameras and frames in flight together
//!
//! ## Example
//!
//! ```ignore
//! use radiance_graphics::{Renderer, RendererConfig, ReflectionProbe, RenderSettings};
//!
//! let mut renderer = Renderer::new(RendererConfig::default())?;
//! renderer.world_mut().set_scene(Some(scene));
//! let probe = renderer.world_mut().add_probe(ReflectionProbe::new());
//! let camera = renderer.cameras_mut().add_camera(RenderSettings::default());
//!
//! renderer.capture_probe_blocking(probe)?;
//! let frame = renderer.begin_frame()?;
//! let influence = frame.influence_at(point);
//! drop(frame);
//! renderer.end_frame()?;
//! ```

pub mod backend;
pub mod capture;
pub mod config;
pub mod device;
pub mod error;
pub mod graph;
pub mod influence;
pub mod pipeline;
pub mod probe;
mod renderer;
pub mod resources;
pub mod scene;
pub mod scheduler;
pub mod settings;
pub mod stages;
pub mod types;

// Re-export main types for convenience
pub use backend::{BackendConfig, BackendKind, DummyBackend, GpuBackend, SoftwareBackend};
pub use capture::{CaptureJob, CaptureOutcome};
pub use config::{CaptureConfig, ConfigError, RendererConfig};
pub use device::{DeviceCapabilities, GraphicsDevice};
pub use error::{GraphicsError, ProbeError};
pub use graph::{CompiledGraph, GraphError, PassHandle, RenderGraph};
pub use influence::{InfluenceVolume, ProbeGrid, ProbeInfluence, ProbeWeight};
pub use pipeline::FramePipeline;
pub use probe::{
    CaptureContext, CaptureProgress, CaptureStatus, CaptureTicket, ProbeId, ProbeSource,
    ReflectionProbe, ReflectionProbeType,
};
pub use renderer::Renderer;
pub use resources::Texture;
pub use scene::{CameraId, CameraSystem, FrameContext, RenderWorld};
pub use scheduler::{Fence, FenceStatus};
pub use settings::{RenderSettings, SettingsSnapshot, SharedRenderSettings};
pub use stages::{FramePlan, OutputCurve, OutputTransform, RenderStage};
pub use types::{Extent3d, TextureDescriptor, TextureFormat, TextureUsage};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the graphics subsystem.
///
/// Logs the version of this crate and of `radiance-core`.
pub fn init() {
    radiance_core::init();
    log::info!("Radiance Graphics v{} initialized", VERSION);
}
