//! Scene state and per-frame extraction.
//!
//! - [`RenderWorld`] - Scene description, reflection probes and sky map
//! - [`CameraSystem`] - Cameras and their shared render settings
//! - [`FrameContext`] - Read-only view of one frame: camera plans, probe
//!   snapshots and the probe influence query
//!
//! # Architecture
//!
//! Each frame follows two phases:
//!
//! 1. **Extract** - Snapshot camera settings into frame plans and probes
//!    into [`ExtractedProbe`]s
//! 2. **Render** - Consumers read the [`FrameContext`]; the renderer submits
//!    the frame and keeps the probe maps it read alive until it completes
//!
//! Settings edits and probe captures that land during a frame become
//! visible in the next one.

mod camera_system;
mod extracted;
mod frame;
mod render_world;

pub use camera_system::{Camera, CameraId, CameraSystem, ExtractedCamera};
pub use extracted::{ExtractedProbe, GpuProbeData, NO_TEXTURE};
pub use frame::FrameContext;
pub use render_world::RenderWorld;
