//! CPU software backend.
//!
//! Captures are executed on a fixed pool of named worker threads that pull
//! from a shared channel. Each capture owns its destination texture, so
//! workers never contend on a texture; they only share the read-only scene.

use std::sync::{Arc, mpsc};
use std::thread::JoinHandle;

use parking_lot::Mutex;

use crate::capture::CaptureJob;
use crate::error::GraphicsError;

use super::{FrameSubmission, GpuBackend};

enum Work {
    Capture(CaptureJob),
    Frame(FrameSubmission),
}

/// Software backend running captures on worker threads.
pub struct SoftwareBackend {
    sender: Mutex<Option<mpsc::Sender<Work>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
}

impl SoftwareBackend {
    /// Start a backend with `workers` threads (at least one).
    pub fn new(workers: usize) -> Result<Self, GraphicsError> {
        let worker_count = workers.max(1);
        let (sender, receiver) = mpsc::channel::<Work>();
        let receiver = Arc::new(Mutex::new(receiver));

        let mut handles = Vec::with_capacity(worker_count);
        for index in 0..worker_count {
            let receiver = Arc::clone(&receiver);
            let spawned = std::thread::Builder::new()
                .name(format!("radiance-capture-{index}"))
                .spawn(move || worker_loop(&receiver));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    drop(sender);
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(GraphicsError::InitializationFailed(format!(
                        "failed to spawn capture worker: {e}"
                    )));
                }
            }
        }

        log::debug!("SoftwareBackend: started {worker_count} worker(s)");
        Ok(Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(handles),
            worker_count,
        })
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    fn send(&self, work: Work) -> Result<(), GraphicsError> {
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            return Err(GraphicsError::BackendUnavailable(
                "software backend is shut down".to_string(),
            ));
        };
        // On failure the work is dropped here, which fails any capture it held.
        sender.send(work).map_err(|_| {
            GraphicsError::BackendUnavailable("all capture workers have exited".to_string())
        })
    }
}

fn worker_loop(receiver: &Mutex<mpsc::Receiver<Work>>) {
    loop {
        let work = receiver.lock().recv();
        match work {
            Ok(Work::Capture(job)) => job.execute(),
            Ok(Work::Frame(frame)) => frame.fence.signal(),
            Err(_) => break,
        }
    }
}

impl GpuBackend for SoftwareBackend {
    fn name(&self) -> &'static str {
        "Software"
    }

    fn supports_concurrent_submission(&self) -> bool {
        self.worker_count > 1
    }

    fn submit_capture(&self, job: CaptureJob) -> Result<(), GraphicsError> {
        log::trace!(
            "SoftwareBackend: queueing capture for {} ({}px, {} mips)",
            job.probe,
            job.config.resolution,
            job.config.mip_levels
        );
        self.send(Work::Capture(job))
    }

    fn submit_frame(&self, frame: FrameSubmission) -> Result<(), GraphicsError> {
        self.send(Work::Frame(frame))
    }

    /// Stop accepting work and join the workers once the queue is drained.
    fn shutdown(&self) {
        let Some(sender) = self.sender.lock().take() else {
            return;
        };
        drop(sender);

        // The last device reference can be released by a finishing job, so the
        // calling thread may be a worker. It exits on its own once the
        // channel is closed.
        let current = std::thread::current().id();
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.workers.lock());
        for handle in handles {
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                log::error!("SoftwareBackend: capture worker panicked");
            }
        }
        log::debug!("SoftwareBackend: shut down");
    }
}

impl Drop for SoftwareBackend {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for SoftwareBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareBackend")
            .field("worker_count", &self.worker_count)
            .field("running", &self.sender.lock().is_some())
            .finish()
    }
}

static_assertions::assert_impl_all!(SoftwareBackend: Send, Sync);
