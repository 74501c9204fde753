use std::sync::Arc;

use crate::capture::CaptureCompletion;
use crate::resources::Texture;

/// Where a probe's environment map comes from.
///
/// Exactly one source is authoritative at a time. A custom texture is only
/// referenced; the generated map is owned by the probe.
#[derive(Debug)]
pub enum ProbeSource {
    /// Captured from the scene.
    Auto(GeneratedMap),
    /// Supplied externally. Capture is a no-op while set.
    Custom(Arc<Texture>),
}

impl Default for ProbeSource {
    fn default() -> Self {
        Self::Auto(GeneratedMap::default())
    }
}

/// Generated map of a probe in auto mode.
#[derive(Debug, Default)]
pub struct GeneratedMap {
    /// Last successfully captured map.
    pub(crate) current: Option<Arc<Texture>>,
    /// Capture whose fence has not been resolved yet.
    pub(crate) pending: Option<PendingCapture>,
}

impl GeneratedMap {
    pub fn current(&self) -> Option<&Arc<Texture>> {
        self.current.as_ref()
    }

    pub fn is_capturing(&self) -> bool {
        self.pending.is_some()
    }

    /// Cancel the pending capture, if any. Returns true if one was pending.
    pub(crate) fn cancel_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                pending.completion.cancel();
                true
            }
            None => false,
        }
    }
}

/// A submitted capture and the texture it renders into.
#[derive(Debug)]
pub(crate) struct PendingCapture {
    pub(crate) completion: CaptureCompletion,
    pub(crate) destination: Arc<Texture>,
}
