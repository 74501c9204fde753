use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Error returned when work is cancelled at a checkpoint.
///
/// Long-running jobs call [`CancellationToken::checkpoint`] between units of
/// work and propagate this error with `?` to stop early.
///
/// # Example
///
/// ```
/// use radiance_core::compute::{CancellationToken, Cancelled};
///
/// fn render_faces(token: &CancellationToken) -> Result<u32, Cancelled> {
///     let mut done = 0;
///     for _face in 0..6 {
///         token.checkpoint()?;
///         done += 1;
///     }
///     Ok(done)
/// }
///
/// let token = CancellationToken::new();
/// assert_eq!(render_faces(&token), Ok(6));
/// token.cancel();
/// assert_eq!(render_faces(&token), Err(Cancelled));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl std::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("task cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// Token that signals cancellation to cooperative jobs.
///
/// Cloning a token creates another handle to the same cancellation flag.
/// Calling [`cancel()`](CancellationToken::cancel) on any clone affects all.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a new cancellation token (not cancelled).
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signals cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Returns `Err(Cancelled)` once cancellation has been signalled.
    #[inline]
    pub fn checkpoint(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
