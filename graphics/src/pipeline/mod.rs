//! Frame pipeline for managing multiple frames in flight.
//!
//! [`FramePipeline`] tracks one fence per frame slot so the CPU can prepare
//! frame N+1 while the backend still renders frame N.
//!
//! ```text
//! frames_in_flight = 2
//!
//! Slot 0: [Frame 0] ──► [Frame 2] ──► [Frame 4] ──►
//! Slot 1: [Frame 1] ──► [Frame 3] ──► [Frame 5] ──►
//! ```
//!
//! Textures that submitted frames may still read (a probe map that a capture
//! just replaced, or the maps the current frame shades with) are handed to
//! [`FramePipeline::retain_until_complete`]. They stay alive until every frame
//! that was in flight at that point has signaled its fence.
//!
//! Every wait takes a timeout. A lost device never signals its fences, so an
//! untimed wait could block forever.
//!
//! # Example
//!
//! ```ignore
//! let mut pipeline = FramePipeline::new(2);
//!
//! loop {
//!     if !pipeline.begin_frame_timeout(Duration::from_secs(1)) {
//!         log::warn!("Backend is falling behind");
//!         continue;
//!     }
//!     let fence = submit_frame(...)?;
//!     pipeline.end_frame(fence);
//! }
//!
//! pipeline.wait_idle_timeout(Duration::from_secs(5));
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::resources::Texture;
use crate::scheduler::Fence;

/// A texture kept alive until all of `fences` signal.
#[derive(Debug)]
struct Retained {
    texture: Arc<Texture>,
    fences: Vec<Fence>,
}

impl Retained {
    fn is_released(&self) -> bool {
        self.fences.iter().all(Fence::is_signaled)
    }
}

/// Manages multiple frames in flight for CPU-GPU parallelism.
///
/// `FramePipeline` is not thread-safe. It is owned by the thread that
/// drives the renderer.
#[derive(Debug)]
pub struct FramePipeline {
    /// Fences for each frame slot. `None` if slot hasn't been used yet.
    frame_fences: Vec<Option<Fence>>,

    /// Current frame slot index (0 to frames_in_flight - 1).
    current_slot: usize,

    frame_count: u64,

    /// Whether `begin_frame_timeout` succeeded and `end_frame` is pending.
    frame_open: bool,

    /// Retained while the open frame is built; bound to fences at `end_frame`.
    open_frame_textures: Vec<Arc<Texture>>,

    retained: Vec<Retained>,
}

impl FramePipeline {
    /// Create a new frame pipeline.
    ///
    /// # Panics
    ///
    /// Panics if `frames_in_flight` is 0.
    pub fn new(frames_in_flight: usize) -> Self {
        assert!(frames_in_flight > 0, "frames_in_flight must be at least 1");

        Self {
            frame_fences: (0..frames_in_flight).map(|_| None).collect(),
            current_slot: 0,
            frame_count: 0,
            frame_open: false,
            open_frame_textures: Vec::new(),
            retained: Vec::new(),
        }
    }

    /// Begin a new frame.
    ///
    /// Waits for the previous frame in the current slot to complete. Returns
    /// `false` if the timeout elapses first; no frame is started then.
    pub fn begin_frame_timeout(&mut self, timeout: Duration) -> bool {
        if let Some(fence) = &self.frame_fences[self.current_slot]
            && !fence.wait_timeout(timeout)
        {
            log::warn!(
                "Frame slot {} still busy after {:?}",
                self.current_slot,
                timeout
            );
            return false;
        }

        self.frame_count += 1;
        self.frame_open = true;
        self.release_completed();

        log::trace!(
            "Begin frame {} (slot {})",
            self.frame_count,
            self.current_slot
        );

        true
    }

    /// Keep `texture` alive until every frame currently in flight completes.
    ///
    /// While a frame is open, the frame being built counts as in flight too.
    pub fn retain_until_complete(&mut self, texture: Arc<Texture>) {
        if self.frame_open {
            self.open_frame_textures.push(texture);
            return;
        }
        let fences = self.in_flight_fences();
        if !fences.is_empty() {
            self.retained.push(Retained { texture, fences });
        }
    }

    /// End the current frame.
    ///
    /// Records the fence for this frame and advances to the next frame slot.
    pub fn end_frame(&mut self, fence: Fence) {
        log::trace!(
            "End frame {} (slot {})",
            self.frame_count,
            self.current_slot
        );

        self.frame_fences[self.current_slot] = Some(fence);
        self.frame_open = false;

        if !self.open_frame_textures.is_empty() {
            let fences = self.in_flight_fences();
            for texture in self.open_frame_textures.drain(..) {
                self.retained.push(Retained {
                    texture,
                    fences: fences.clone(),
                });
            }
        }

        self.current_slot = (self.current_slot + 1) % self.frame_fences.len();
    }

    /// Wait for all in-flight frames with a timeout.
    ///
    /// `timeout` bounds the total time across all slots. Returns `true` if
    /// every frame completed.
    pub fn wait_idle_timeout(&mut self, timeout: Duration) -> bool {
        log::trace!("Waiting for idle ({} slots)", self.frame_fences.len());
        let start = Instant::now();

        for (i, fence) in self.frame_fences.iter().enumerate() {
            let Some(fence) = fence else {
                continue;
            };
            let remaining = timeout.saturating_sub(start.elapsed());
            if !fence.wait_timeout(remaining) {
                log::warn!("Frame slot {} did not complete within {:?}", i, timeout);
                return false;
            }
        }

        self.release_completed();
        log::trace!("Idle");
        true
    }

    /// Drop retained textures whose frames have all completed. Returns the
    /// number released.
    pub fn release_completed(&mut self) -> usize {
        let before = self.retained.len();
        self.retained.retain(|r| !r.is_released());
        let released = before - self.retained.len();
        if released > 0 {
            log::trace!("Released {} retained textures", released);
        }
        released
    }

    fn in_flight_fences(&self) -> Vec<Fence> {
        self.frame_fences
            .iter()
            .flatten()
            .filter(|f| !f.is_signaled())
            .cloned()
            .collect()
    }

    pub fn frames_in_flight(&self) -> usize {
        self.frame_fences.len()
    }

    /// Get the current frame slot index.
    ///
    /// Returns a value from 0 to `frames_in_flight - 1`.
    pub fn current_slot(&self) -> usize {
        self.current_slot
    }

    /// Total number of frames started.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Returns true between a successful `begin_frame_timeout` and `end_frame`.
    pub fn is_frame_open(&self) -> bool {
        self.frame_open
    }

    /// Number of textures currently kept alive for in-flight frames.
    pub fn retained_count(&self) -> usize {
        self.retained.len() + self.open_frame_textures.len()
    }

    /// Check if a specific frame slot is ready (non-blocking).
    ///
    /// Returns `true` if the slot's fence is signaled or if the slot
    /// hasn't been used yet.
    pub fn is_slot_ready(&self, slot: usize) -> bool {
        assert!(slot < self.frame_fences.len(), "Invalid slot index");

        match &self.frame_fences[slot] {
            Some(fence) => fence.is_signaled(),
            None => true,
        }
    }

    /// Check if all frame slots are ready (non-blocking).
    pub fn is_idle(&self) -> bool {
        self.frame_fences
            .iter()
            .all(|f| f.as_ref().is_none_or(Fence::is_signaled))
    }
}

impl Default for FramePipeline {
    /// Creates a pipeline with 2 frames in flight.
    fn default() -> Self {
        Self::new(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::GraphicsDevice;
    use crate::types::{TextureDescriptor, TextureFormat, TextureUsage};

    const WAIT: Duration = Duration::from_millis(5);

    fn texture() -> Arc<Texture> {
        GraphicsDevice::dummy()
            .create_texture(&TextureDescriptor::new_2d(
                4,
                4,
                TextureFormat::Rgba16Float,
                TextureUsage::TEXTURE_BINDING,
            ))
            .unwrap()
    }

    #[test]
    fn test_new() {
        let pipeline = FramePipeline::new(2);
        assert_eq!(pipeline.frames_in_flight(), 2);
        assert_eq!(pipeline.current_slot(), 0);
        assert_eq!(pipeline.frame_count(), 0);
        assert!(pipeline.is_idle());
        assert!(!pipeline.is_frame_open());
    }

    #[test]
    fn test_default() {
        let pipeline = FramePipeline::default();
        assert_eq!(pipeline.frames_in_flight(), 2);
    }

    #[test]
    #[should_panic(expected = "frames_in_flight must be at least 1")]
    fn test_zero_frames_panics() {
        FramePipeline::new(0);
    }

    #[test]
    fn test_end_frame_advances_slot() {
        let mut pipeline = FramePipeline::new(3);

        for expected in [1, 2, 0] {
            assert!(pipeline.begin_frame_timeout(WAIT));
            pipeline.end_frame(Fence::new_signaled());
            assert_eq!(pipeline.current_slot(), expected);
        }
        assert_eq!(pipeline.frame_count(), 3);
    }

    #[test]
    fn test_begin_frame_times_out_on_busy_slot() {
        let mut pipeline = FramePipeline::new(1);
        let fence = Fence::new_unsignaled();

        assert!(pipeline.begin_frame_timeout(WAIT));
        pipeline.end_frame(fence.clone());
        assert!(!pipeline.is_slot_ready(0));

        assert!(!pipeline.begin_frame_timeout(WAIT));
        assert_eq!(pipeline.frame_count(), 1);
        assert!(!pipeline.is_frame_open());

        fence.signal();
        assert!(pipeline.begin_frame_timeout(WAIT));
        assert_eq!(pipeline.frame_count(), 2);
    }

    #[test]
    fn test_open_frame_texture_released_after_its_fence() {
        let mut pipeline = FramePipeline::new(2);
        let fence = Fence::new_unsignaled();
        let texture = texture();
        let weak = Arc::downgrade(&texture);

        assert!(pipeline.begin_frame_timeout(WAIT));
        pipeline.retain_until_complete(texture);
        pipeline.end_frame(fence.clone());

        assert_eq!(pipeline.release_completed(), 0);
        assert!(weak.upgrade().is_some());

        fence.signal();
        assert_eq!(pipeline.release_completed(), 1);
        assert!(weak.upgrade().is_none());
        assert_eq!(pipeline.retained_count(), 0);
    }

    #[test]
    fn test_retired_texture_waits_for_all_in_flight_frames() {
        let mut pipeline = FramePipeline::new(2);
        let first = Fence::new_unsignaled();
        let second = Fence::new_unsignaled();

        assert!(pipeline.begin_frame_timeout(WAIT));
        pipeline.end_frame(first.clone());
        assert!(pipeline.begin_frame_timeout(WAIT));
        pipeline.end_frame(second.clone());

        let texture = texture();
        let weak = Arc::downgrade(&texture);
        pipeline.retain_until_complete(texture);

        second.signal();
        pipeline.release_completed();
        assert!(weak.upgrade().is_some());

        first.signal();
        pipeline.release_completed();
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_retain_when_idle_drops_immediately() {
        let mut pipeline = FramePipeline::new(2);
        let texture = texture();
        let weak = Arc::downgrade(&texture);

        pipeline.retain_until_complete(texture);
        assert_eq!(pipeline.retained_count(), 0);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_wait_idle_timeout() {
        let mut pipeline = FramePipeline::new(2);
        assert!(pipeline.wait_idle_timeout(WAIT));

        let fence = Fence::new_unsignaled();
        assert!(pipeline.begin_frame_timeout(WAIT));
        pipeline.retain_until_complete(texture());
        pipeline.end_frame(fence.clone());

        assert!(!pipeline.wait_idle_timeout(WAIT));
        assert_eq!(pipeline.retained_count(), 1);

        fence.signal();
        assert!(pipeline.wait_idle_timeout(WAIT));
        assert!(pipeline.is_idle());
        assert_eq!(pipeline.retained_count(), 0);
    }

    #[test]
    #[should_panic(expected = "Invalid slot index")]
    fn test_is_slot_ready_invalid() {
        let pipeline = FramePipeline::new(2);
        pipeline.is_slot_ready(5);
    }
}
