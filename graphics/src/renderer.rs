//! Renderer facade.
//!
//! [`Renderer`] owns the device, the [`RenderWorld`], the [`CameraSystem`] and
//! the [`FramePipeline`], and runs the per-frame loop:
//!
//! ```text
//! begin_frame ──► resolve finished captures ──► rebuild probe grid
//!             ──► snapshot camera settings ──► FrameContext
//! end_frame   ──► retain shading maps ──► submit frame marker ──► fence
//! ```
//!
//! # Example
//!
//! ```ignore
//! let mut renderer = Renderer::new(RendererConfig::load_or_default(path))?;
//! renderer.world_mut().set_scene(Some(Arc::new(scene)));
//! let probe = renderer.world_mut().add_probe(ReflectionProbe::new());
//! let camera = renderer.cameras_mut().add_camera(RenderSettings::default());
//!
//! renderer.capture_dirty()?;
//! loop {
//!     let frame = renderer.begin_frame()?;
//!     let plan = frame.plan(camera);
//!     // ... record work ...
//!     drop(frame);
//!     renderer.end_frame()?;
//! }
//! renderer.wait_idle()?;
//! ```

use std::sync::Arc;

use crate::backend::FrameSubmission;
use crate::config::RendererConfig;
use crate::device::{DeviceCapabilities, GraphicsDevice};
use crate::error::{GraphicsError, ProbeError};
use crate::pipeline::FramePipeline;
use crate::probe::{CaptureContext, CaptureProgress, CaptureStatus, ProbeId};
use crate::scene::{CameraSystem, FrameContext, RenderWorld};
use crate::scheduler::Fence;

/// Owns everything needed to capture probes and drive frames.
#[derive(Debug)]
pub struct Renderer {
    device: Arc<GraphicsDevice>,
    config: RendererConfig,
    world: RenderWorld,
    cameras: CameraSystem,
    pipeline: FramePipeline,
    /// Passes recorded by the open frame.
    open_pass_count: usize,
}

impl Renderer {
    /// Create a renderer and its device from `config`.
    pub fn new(config: RendererConfig) -> Result<Self, GraphicsError> {
        let capabilities = DeviceCapabilities::default().with_memory_budget(config.memory_budget);
        let device = GraphicsDevice::from_config(&config.backend, capabilities)?;
        Ok(Self::with_device(device, config))
    }

    /// Create a renderer on an existing device.
    pub fn with_device(device: Arc<GraphicsDevice>, config: RendererConfig) -> Self {
        let frames_in_flight = config.frames_in_flight.max(1);
        if frames_in_flight != config.frames_in_flight {
            log::warn!("frames_in_flight must be at least 1, using 1");
        }
        log::info!(
            "Renderer on '{}' ({} frames in flight)",
            device.name(),
            frames_in_flight
        );
        Self {
            device,
            world: RenderWorld::new(config.probe_grid_cell_size),
            cameras: CameraSystem::new(),
            pipeline: FramePipeline::new(frames_in_flight),
            config,
            open_pass_count: 0,
        }
    }

    pub fn device(&self) -> &Arc<GraphicsDevice> {
        &self.device
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn world(&self) -> &RenderWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut RenderWorld {
        &mut self.world
    }

    pub fn cameras(&self) -> &CameraSystem {
        &self.cameras
    }

    pub fn cameras_mut(&mut self) -> &mut CameraSystem {
        &mut self.cameras
    }

    pub fn pipeline(&self) -> &FramePipeline {
        &self.pipeline
    }

    /// Submit a capture for one probe.
    ///
    /// # Errors
    ///
    /// [`ProbeError::InvalidConfiguration`] for an unknown probe, otherwise
    /// as [`ReflectionProbe::capture`](crate::ReflectionProbe::capture).
    pub fn capture_probe(&mut self, id: ProbeId) -> Result<CaptureStatus, ProbeError> {
        let scene = self.world.scene().cloned();
        let probe = self
            .world
            .probe_mut(id)
            .ok_or_else(|| ProbeError::InvalidConfiguration(format!("unknown probe {id}")))?;
        let ctx = CaptureContext::new(&self.device, scene.as_ref(), &self.config.capture);
        probe.capture(&ctx)
    }

    /// Capture one probe and wait for the result, up to the configured
    /// capture timeout.
    pub fn capture_probe_blocking(&mut self, id: ProbeId) -> Result<(), ProbeError> {
        let scene = self.world.scene().cloned();
        let timeout = self.config.capture.timeout();
        let probe = self
            .world
            .probe_mut(id)
            .ok_or_else(|| ProbeError::InvalidConfiguration(format!("unknown probe {id}")))?;
        let ctx = CaptureContext::new(&self.device, scene.as_ref(), &self.config.capture);
        if let Some(retired) = probe.capture_blocking(&ctx, timeout)? {
            self.pipeline.retain_until_complete(retired);
        }
        Ok(())
    }

    /// Submit captures for every auto probe flagged as needing one and not
    /// already capturing. Returns the number submitted.
    ///
    /// Probes that fail to submit are logged and skipped.
    ///
    /// # Errors
    ///
    /// [`ProbeError::DeviceLost`] stops the pass; nothing more is submitted.
    pub fn capture_dirty(&mut self) -> Result<usize, ProbeError> {
        let mut submitted = 0;
        for id in self.world.dirty_probes() {
            if self.world.probe(id).is_some_and(|p| p.is_capturing()) {
                continue;
            }
            match self.capture_probe(id) {
                Ok(CaptureStatus::Submitted(_)) => submitted += 1,
                Ok(CaptureStatus::Skipped) => {}
                Err(ProbeError::DeviceLost) => return Err(ProbeError::DeviceLost),
                Err(e) => log::warn!("{id}: {e}"),
            }
        }
        Ok(submitted)
    }

    /// Swap in every capture whose fence has signaled. Replaced maps stay
    /// alive until the frames in flight that may read them complete.
    /// Returns the number of probes that received a new map.
    pub fn update_captures(&mut self) -> usize {
        let mut completed = 0;
        let mut retired = Vec::new();
        for probe in self.world.probes_mut() {
            match probe.update() {
                CaptureProgress::Completed { retired: old } => {
                    completed += 1;
                    retired.extend(old);
                }
                CaptureProgress::Failed(e) => log::warn!("{}: capture failed: {e}", probe.id()),
                CaptureProgress::Idle | CaptureProgress::InFlight | CaptureProgress::Cancelled => {}
            }
        }
        for texture in retired {
            self.pipeline.retain_until_complete(texture);
        }
        completed
    }

    /// Begin a frame.
    ///
    /// Waits for a free frame slot, resolves finished captures, rebuilds the
    /// probe grid and snapshots every camera's settings.
    ///
    /// # Errors
    ///
    /// - [`GraphicsError::DeviceLost`] while the device is lost.
    /// - [`GraphicsError::Timeout`] if no slot frees up within the configured
    ///   frame timeout.
    /// - [`GraphicsError::InvalidParameter`] if the previous frame was not ended.
    pub fn begin_frame(&mut self) -> Result<FrameContext<'_>, GraphicsError> {
        if self.device.is_lost() {
            return Err(GraphicsError::DeviceLost);
        }
        if self.pipeline.is_frame_open() {
            return Err(GraphicsError::InvalidParameter(
                "begin_frame called twice without end_frame".to_string(),
            ));
        }
        let timeout = self.config.frame_timeout();
        if !self.pipeline.begin_frame_timeout(timeout) {
            return Err(GraphicsError::Timeout(timeout));
        }

        self.update_captures();
        self.world.prepare();
        let cameras = match self.cameras.extract() {
            Ok(cameras) => cameras,
            Err(e) => {
                self.pipeline.end_frame(Fence::new_signaled());
                return Err(GraphicsError::Internal(format!(
                    "frame plan compilation failed: {e}"
                )));
            }
        };

        let frame_index = self.pipeline.frame_count();
        let frame = FrameContext::new(frame_index, &self.world, cameras);
        self.open_pass_count = frame.pass_count();
        Ok(frame)
    }

    /// End the open frame and submit it. Returns the frame's fence.
    ///
    /// # Errors
    ///
    /// [`GraphicsError::InvalidParameter`] without an open frame, or the
    /// backend's error if it refuses the submission (the frame slot is freed).
    pub fn end_frame(&mut self) -> Result<Fence, GraphicsError> {
        if !self.pipeline.is_frame_open() {
            return Err(GraphicsError::InvalidParameter(
                "end_frame called without begin_frame".to_string(),
            ));
        }
        for texture in self.world.shading_textures() {
            self.pipeline.retain_until_complete(texture);
        }

        let fence = Fence::new_unsignaled();
        let submission = FrameSubmission {
            frame_index: self.pipeline.frame_count(),
            pass_count: std::mem::take(&mut self.open_pass_count),
            fence: fence.clone(),
        };
        if let Err(e) = self.device.backend().submit_frame(submission) {
            log::warn!("Frame submission refused: {e}");
            self.pipeline.end_frame(Fence::new_signaled());
            return Err(e);
        }
        self.pipeline.end_frame(fence.clone());
        Ok(fence)
    }

    /// Wait for every frame in flight, bounded by `frames_in_flight` frame
    /// timeouts.
    pub fn wait_idle(&mut self) -> Result<(), GraphicsError> {
        let timeout = self.config.frame_timeout() * self.pipeline.frames_in_flight() as u32;
        if self.pipeline.wait_idle_timeout(timeout) {
            Ok(())
        } else {
            Err(GraphicsError::Timeout(timeout))
        }
    }
}
