//! Graphics error types.

use thiserror::Error;

/// Errors that can occur in the graphics system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphicsError {
    /// Failed to initialize the graphics system.
    #[error("initialization failed: {0}")]
    InitializationFailed(String),
    /// Failed to create a resource.
    #[error("resource creation failed: {0}")]
    ResourceCreationFailed(String),
    /// Device memory budget exhausted.
    #[error("out of GPU memory")]
    OutOfMemory,
    /// The GPU device was lost.
    #[error("GPU device lost")]
    DeviceLost,
    /// The backend no longer accepts work.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    /// A wait did not complete in time.
    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),
    /// An invalid parameter was provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors reported by reflection probes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The capture could not run or did not complete. The probe keeps its
    /// previous map.
    #[error("reflection probe capture failed: {reason}")]
    CaptureFailed { reason: String },
    /// A probe property was set to an unusable value. The previous value is kept.
    #[error("invalid probe configuration: {0}")]
    InvalidConfiguration(String),
    /// The device was lost while the capture was in flight. Retry after recovery.
    #[error("graphics device lost during capture")]
    DeviceLost,
}

impl ProbeError {
    pub(crate) fn capture_failed(reason: impl Into<String>) -> Self {
        Self::CaptureFailed {
            reason: reason.into(),
        }
    }
}

impl From<GraphicsError> for ProbeError {
    fn from(err: GraphicsError) -> Self {
        match err {
            GraphicsError::DeviceLost => Self::DeviceLost,
            other => Self::capture_failed(other.to_string()),
        }
    }
}
