//! GPU synchronization primitives.
//!
//! This module provides the [`Fence`] used to coordinate work between the
//! CPU and the backend's workers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Status of a fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceStatus {
    /// The fence has not yet been signaled.
    Unsignaled,
    /// The fence has been signaled (GPU work complete).
    Signaled,
}

/// CPU-GPU synchronization primitive.
///
/// Fences allow the CPU to wait for submitted work to complete. A capture's
/// texture and a frame slot's resources are only reused after their fence
/// is signaled.
///
/// Cloning a fence shares the underlying state: the backend keeps one clone
/// to signal, callers keep others to wait on.
///
/// # Example
///
/// ```ignore
/// let ticket = probe.capture(&ctx)?;
///
/// // Later, before sampling the new map:
/// if ticket.fence().wait_timeout(Duration::from_secs(1)) {
///     probe.update();
/// }
/// ```
#[derive(Debug)]
pub struct Fence {
    /// Whether the fence has been signaled.
    signaled: Arc<AtomicBool>,
}

impl Fence {
    /// Create a new fence in the unsignaled state.
    pub fn new_unsignaled() -> Self {
        Self {
            signaled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a new fence in the signaled state.
    pub fn new_signaled() -> Self {
        Self {
            signaled: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Check the current status of the fence.
    pub fn status(&self) -> FenceStatus {
        if self.signaled.load(Ordering::Acquire) {
            FenceStatus::Signaled
        } else {
            FenceStatus::Unsignaled
        }
    }

    /// Check if the fence is signaled (non-blocking).
    pub fn is_signaled(&self) -> bool {
        self.status() == FenceStatus::Signaled
    }

    /// Wait for the fence with a timeout.
    ///
    /// Returns `true` if the fence was signaled, `false` if timeout elapsed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        while !self.signaled.load(Ordering::Acquire) {
            if start.elapsed() >= timeout {
                return false;
            }
            std::thread::yield_now();
        }
        true
    }

    /// Reset the fence to unsignaled state.
    ///
    /// Must only be called when no work is pending on this fence.
    pub fn reset(&self) {
        self.signaled.store(false, Ordering::Release);
    }

    /// Signal the fence.
    ///
    /// Backends call this once the submitted work has finished writing its
    /// outputs.
    pub(crate) fn signal(&self) {
        self.signaled.store(true, Ordering::Release);
    }
}

impl Clone for Fence {
    fn clone(&self) -> Self {
        Self {
            signaled: Arc::clone(&self.signaled),
        }
    }
}

impl Default for Fence {
    fn default() -> Self {
        Self::new_unsignaled()
    }
}
