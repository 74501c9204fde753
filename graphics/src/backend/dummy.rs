//! Dummy GPU backend for testing and development.
//!
//! This backend doesn't render anything. Captures complete successfully
//! without writing texels, so their destination has no contents. In deferred
//! mode work is held until [`DummyBackend::flush`] so tests can observe the
//! in-flight state.

use parking_lot::Mutex;

use crate::capture::CaptureJob;
use crate::error::GraphicsError;

use super::{FrameSubmission, GpuBackend};

#[derive(Debug)]
enum Queued {
    Capture(CaptureJob),
    Frame(FrameSubmission),
}

/// Dummy GPU backend.
#[derive(Debug, Default)]
pub struct DummyBackend {
    deferred: bool,
    queue: Mutex<Vec<Queued>>,
}

impl DummyBackend {
    /// Create a backend that completes work on submission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that holds work until [`flush`](Self::flush).
    pub fn deferred() -> Self {
        Self {
            deferred: true,
            queue: Mutex::new(Vec::new()),
        }
    }

    /// Complete all queued work in submission order. Returns the number of
    /// submissions completed.
    pub fn flush(&self) -> usize {
        let queued: Vec<Queued> = std::mem::take(&mut *self.queue.lock());
        let count = queued.len();
        for work in queued {
            match work {
                Queued::Capture(job) => job.complete_without_rendering(),
                Queued::Frame(frame) => frame.fence.signal(),
            }
        }
        log::trace!("DummyBackend: flushed {count} submission(s)");
        count
    }

    /// Number of submissions waiting for [`flush`](Self::flush).
    pub fn pending_count(&self) -> usize {
        self.queue.lock().len()
    }
}

impl GpuBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy"
    }

    fn supports_concurrent_submission(&self) -> bool {
        false
    }

    fn submit_capture(&self, job: CaptureJob) -> Result<(), GraphicsError> {
        log::trace!("DummyBackend: capture for {}", job.probe);
        if self.deferred {
            self.queue.lock().push(Queued::Capture(job));
        } else {
            job.complete_without_rendering();
        }
        Ok(())
    }

    fn submit_frame(&self, frame: FrameSubmission) -> Result<(), GraphicsError> {
        log::trace!(
            "DummyBackend: frame {} ({} passes)",
            frame.frame_index,
            frame.pass_count
        );
        if self.deferred {
            self.queue.lock().push(Queued::Frame(frame));
        } else {
            frame.fence.signal();
        }
        Ok(())
    }
}
