//! GPU backend abstraction layer.
//!
//! This module provides a trait-based abstraction for the backends that
//! execute captures and frames.
//!
//! # Available Backends
//!
//! - [`SoftwareBackend`] (default): CPU ray-cast renderer running captures on
//!   a pool of worker threads
//! - [`DummyBackend`]: no rendering; completes submissions immediately or,
//!   in deferred mode, when flushed. Used for testing.
//!
//! # Architecture
//!
//! Each backend implements the [`GpuBackend`] trait, which provides:
//! - Capture submission (render + convolution into a destination texture)
//! - Frame submission (signals the frame fence once prior work completed)
//! - Shutdown

pub mod dummy;
pub mod software;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::capture::CaptureJob;
use crate::error::GraphicsError;
use crate::scheduler::Fence;

pub use dummy::DummyBackend;
pub use software::SoftwareBackend;

/// End-of-frame marker submitted after a frame's work.
#[derive(Debug, Clone)]
pub struct FrameSubmission {
    /// Frame counter from the frame pipeline.
    pub frame_index: u64,
    /// Number of stage passes recorded for the frame, over all cameras.
    pub pass_count: usize,
    /// Signaled once the frame's work has completed.
    pub fence: Fence,
}

/// GPU backend trait for abstracting different execution strategies.
pub trait GpuBackend: Send + Sync + 'static {
    /// Get the backend name.
    fn name(&self) -> &'static str;

    /// Whether several captures can run at the same time.
    fn supports_concurrent_submission(&self) -> bool;

    /// Queue a capture. The backend must eventually complete the job's
    /// completion state, either by running it or by dropping the job.
    fn submit_capture(&self, job: CaptureJob) -> Result<(), GraphicsError>;

    /// Queue a frame marker. The backend signals its fence once the marker
    /// reaches the front of its queue.
    fn submit_frame(&self, frame: FrameSubmission) -> Result<(), GraphicsError>;

    /// Stop accepting work. Queued work may still complete.
    fn shutdown(&self) {}
}

/// Backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Software,
    Dummy,
}

/// Backend configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Capture worker threads for the software backend.
    pub workers: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Software,
            workers: 2,
        }
    }
}

/// Creates the configured backend.
///
/// # Errors
///
/// [`GraphicsError::InitializationFailed`] when the software backend cannot
/// start its workers. The dummy backend is only used when configured.
pub fn create_backend(config: &BackendConfig) -> Result<Arc<dyn GpuBackend>, GraphicsError> {
    match config.kind {
        BackendKind::Software => {
            let backend = SoftwareBackend::new(config.workers).inspect_err(|e| {
                log::error!("Failed to create software backend: {}", e);
            })?;
            log::info!("Using software backend ({} workers)", backend.worker_count());
            Ok(Arc::new(backend))
        }
        BackendKind::Dummy => {
            log::info!("Using dummy backend");
            Ok(Arc::new(DummyBackend::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_dummy_backend() {
        let backend = create_backend(&BackendConfig {
            kind: BackendKind::Dummy,
            workers: 0,
        })
        .unwrap();
        assert_eq!(backend.name(), "Dummy");
    }

    #[test]
    fn test_create_software_backend() {
        let backend = create_backend(&BackendConfig::default()).unwrap();
        assert_eq!(backend.name(), "Software");
        assert!(backend.supports_concurrent_submission());
        backend.shutdown();
    }
}
