use std::sync::Arc;

use parking_lot::Mutex;
use radiance_core::compute::CancellationToken;

use crate::error::ProbeError;
use crate::scheduler::Fence;

/// Result of one capture submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Work is queued or running.
    Pending,
    /// The destination texture holds the filtered map.
    Succeeded,
    /// The capture failed; the destination must not be used.
    Failed(ProbeError),
    /// The capture was cancelled before it finished.
    Cancelled,
}

/// Shared completion state of one capture.
///
/// The submitting probe, the backend worker and the device each hold a clone.
/// The first call to `complete` wins: later outcomes (a worker finishing after
/// device loss, for example) are ignored. The fence is signaled after the
/// outcome is stored, so a signaled fence always has a final outcome.
#[derive(Debug, Clone)]
pub struct CaptureCompletion {
    fence: Fence,
    token: CancellationToken,
    outcome: Arc<Mutex<CaptureOutcome>>,
}

impl CaptureCompletion {
    pub(crate) fn new() -> Self {
        Self {
            fence: Fence::new_unsignaled(),
            token: CancellationToken::new(),
            outcome: Arc::new(Mutex::new(CaptureOutcome::Pending)),
        }
    }

    /// Fence signaled when the outcome is final.
    pub fn fence(&self) -> &Fence {
        &self.fence
    }

    /// Token checked by the worker between units of work.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Current outcome.
    pub fn outcome(&self) -> CaptureOutcome {
        self.outcome.lock().clone()
    }

    /// Returns true once the outcome is final.
    pub fn is_complete(&self) -> bool {
        self.fence.is_signaled()
    }

    /// Request cancellation. The worker completes the capture as cancelled at
    /// its next checkpoint.
    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }

    /// Store `outcome` and signal the fence. Returns false if the capture had
    /// already completed.
    pub(crate) fn complete(&self, outcome: CaptureOutcome) -> bool {
        {
            let mut current = self.outcome.lock();
            if *current != CaptureOutcome::Pending {
                return false;
            }
            *current = outcome;
        }
        self.fence.signal();
        true
    }
}
