use std::sync::Arc;
use std::time::Duration;

use crate::capture::{CaptureCompletion, CaptureOutcome};
use crate::error::ProbeError;
use crate::resources::Texture;
use crate::scheduler::Fence;

/// Result of [`ReflectionProbe::capture`](super::ReflectionProbe::capture).
#[derive(Debug, Clone)]
pub enum CaptureStatus {
    /// A custom texture is set; nothing was submitted.
    Skipped,
    /// The capture was submitted to the backend.
    Submitted(CaptureTicket),
}

impl CaptureStatus {
    pub fn ticket(&self) -> Option<&CaptureTicket> {
        match self {
            Self::Skipped => None,
            Self::Submitted(ticket) => Some(ticket),
        }
    }
}

/// Handle to a submitted capture for callers that want to wait on it.
///
/// The ticket only observes the capture. The new map reaches the probe when
/// the probe's owner calls [`ReflectionProbe::update`](super::ReflectionProbe::update).
#[derive(Debug, Clone)]
pub struct CaptureTicket {
    completion: CaptureCompletion,
}

impl CaptureTicket {
    pub(crate) fn new(completion: CaptureCompletion) -> Self {
        Self { completion }
    }

    /// Fence signaled when the capture completes.
    pub fn fence(&self) -> &Fence {
        self.completion.fence()
    }

    pub fn is_complete(&self) -> bool {
        self.completion.is_complete()
    }

    /// Current outcome, [`CaptureOutcome::Pending`] until the fence signals.
    pub fn outcome(&self) -> CaptureOutcome {
        self.completion.outcome()
    }

    /// Wait up to `timeout` for completion. Returns true if the capture completed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.completion.fence().wait_timeout(timeout)
    }
}

/// What [`ReflectionProbe::update`](super::ReflectionProbe::update) observed.
#[derive(Debug, Clone)]
pub enum CaptureProgress {
    /// No capture is pending.
    Idle,
    /// A capture is pending and its fence has not signaled.
    InFlight,
    /// The new map is now the probe's generated texture. `retired` is the map
    /// it replaced; callers keep it alive while in-flight frames still use it.
    Completed { retired: Option<Arc<Texture>> },
    /// The capture failed; the previous map is unchanged.
    Failed(ProbeError),
    /// The capture was cancelled; the previous map is unchanged.
    Cancelled,
}
