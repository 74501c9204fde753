//! Probe capture: cube render, specular convolution and completion tracking.
//!
//! A capture is described by a [`CaptureJob`] and handed to the device's
//! backend. The backend runs [`CaptureJob::execute`] (on a worker thread for
//! the software backend), which:
//!
//! 1. renders the scene into a source radiance cube ([`render_radiance_cubemap`]),
//! 2. convolves it into a roughness mip chain ([`prefilter_environment`]),
//! 3. writes the chain into the job's freshly allocated destination texture,
//! 4. completes the shared [`CaptureCompletion`], signaling its fence.
//!
//! Each job owns its destination, so concurrent captures never write the same
//! texture. A job that is dropped without running completes as failed.

mod completion;
mod filter;
mod render;

use std::sync::Arc;

use glam::Vec3;
use radiance_core::scene::Scene;

pub use completion::{CaptureCompletion, CaptureOutcome};
pub use filter::{mip_for_roughness, prefilter_environment, roughness_for_mip};
pub use render::render_radiance_cubemap;

use crate::config::CaptureConfig;
use crate::error::ProbeError;
use crate::probe::ProbeId;
use crate::resources::Texture;

/// One probe capture submitted to a backend.
#[derive(Debug)]
pub struct CaptureJob {
    /// Probe the capture belongs to.
    pub probe: ProbeId,
    /// World position the cube is rendered from.
    pub origin: Vec3,
    /// Scene state visible to the capture.
    pub scene: Arc<Scene>,
    /// Resolution, roughness levels and sampling parameters.
    pub config: CaptureConfig,
    /// Texture the filtered chain is written into.
    pub destination: Arc<Texture>,
    /// Shared completion state.
    pub completion: CaptureCompletion,
}

impl CaptureJob {
    /// Render, filter and publish the capture on the calling thread.
    pub fn execute(self) {
        let outcome = self.run();
        match &outcome {
            CaptureOutcome::Succeeded => log::debug!("{}: capture complete", self.probe),
            CaptureOutcome::Cancelled => log::debug!("{}: capture cancelled", self.probe),
            CaptureOutcome::Failed(err) => log::warn!("{}: {err}", self.probe),
            CaptureOutcome::Pending => {}
        }
        self.completion.complete(outcome);
    }

    /// Complete the job without rendering.
    ///
    /// Used by backends that do no real work; cancellation and device loss
    /// are still honored.
    pub fn complete_without_rendering(self) {
        let outcome = if self.completion.token().is_cancelled() {
            CaptureOutcome::Cancelled
        } else if self.destination.device().is_lost() {
            CaptureOutcome::Failed(ProbeError::DeviceLost)
        } else {
            CaptureOutcome::Succeeded
        };
        self.completion.complete(outcome);
    }

    fn run(&self) -> CaptureOutcome {
        let device = self.destination.device();
        if device.is_lost() {
            return CaptureOutcome::Failed(ProbeError::DeviceLost);
        }

        let token = self.completion.token();
        let Ok(source) = render_radiance_cubemap(&self.scene, self.origin, &self.config, token)
        else {
            return CaptureOutcome::Cancelled;
        };
        let Ok(filtered) = prefilter_environment(
            &source,
            self.config.mip_levels,
            self.config.sample_count,
            token,
        ) else {
            return CaptureOutcome::Cancelled;
        };

        if device.is_lost() {
            return CaptureOutcome::Failed(ProbeError::DeviceLost);
        }
        match self.destination.write_contents(filtered) {
            Ok(()) => CaptureOutcome::Succeeded,
            Err(err) => CaptureOutcome::Failed(err.into()),
        }
    }
}

impl Drop for CaptureJob {
    fn drop(&mut self) {
        // No-op when the job already completed.
        if self.completion.complete(CaptureOutcome::Failed(ProbeError::capture_failed(
            "capture dropped by backend before completion",
        ))) {
            log::warn!("{}: capture dropped before completion", self.probe);
        }
    }
}
