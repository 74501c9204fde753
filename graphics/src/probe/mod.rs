//! Reflection probes.
//!
//! A [`ReflectionProbe`] owns an environment map captured from the scene at its
//! position, or references a custom one supplied by the application. Capture
//! is asynchronous:
//!
//! 1. [`ReflectionProbe::capture`] allocates a fresh destination texture and
//!    submits a [`CaptureJob`] to the device's backend.
//! 2. The backend renders the six cube faces, convolves the roughness chain
//!    and signals the capture fence.
//! 3. [`ReflectionProbe::update`] swaps the new map in once the fence has
//!    signaled successfully. Until then the previous map stays authoritative.
//!
//! Submitting a new capture while one is in flight supersedes it: the older
//! capture is cancelled and its result discarded.
//!
//! # Example
//!
//! ```ignore
//! let mut probe = ReflectionProbe::new();
//! probe.set_type(ReflectionProbeType::Sphere);
//! probe.set_radius(5.0)?;
//!
//! let ctx = CaptureContext::new(&device, Some(&scene), &config);
//! probe.capture_blocking(&ctx, config.timeout())?;
//! let map = probe.shading_texture();
//! ```

mod source;
mod status;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use glam::Vec3;
use radiance_core::math::Pose;
use radiance_core::scene::Scene;
use serde::{Deserialize, Serialize};

pub use source::{GeneratedMap, ProbeSource};
pub use status::{CaptureProgress, CaptureStatus, CaptureTicket};

use crate::capture::{CaptureCompletion, CaptureJob, CaptureOutcome};
use crate::config::CaptureConfig;
use crate::device::GraphicsDevice;
use crate::error::ProbeError;
use crate::influence::InfluenceVolume;
use crate::resources::Texture;
use crate::types::{TextureDescriptor, TextureUsage};
use source::PendingCapture;

static NEXT_PROBE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a reflection probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProbeId(u64);

impl ProbeId {
    /// Allocate a new unique id.
    pub fn next() -> Self {
        Self(NEXT_PROBE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProbeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "probe#{}", self.0)
    }
}

/// Shape of a probe's influence volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionProbeType {
    /// Influence within `radius` of the probe.
    Sphere,
    /// Influence within `extents` of the probe, in probe space.
    #[default]
    Box,
}

/// Everything a capture needs besides the probe itself.
#[derive(Debug, Clone, Copy)]
pub struct CaptureContext<'a> {
    pub device: &'a Arc<GraphicsDevice>,
    /// Scene to render; `None` when no scene renderer is available.
    pub scene: Option<&'a Arc<Scene>>,
    pub config: &'a CaptureConfig,
}

impl<'a> CaptureContext<'a> {
    pub fn new(
        device: &'a Arc<GraphicsDevice>,
        scene: Option<&'a Arc<Scene>>,
        config: &'a CaptureConfig,
    ) -> Self {
        Self {
            device,
            scene,
            config,
        }
    }
}

/// A scene-attached reflection probe.
#[derive(Debug)]
pub struct ReflectionProbe {
    id: ProbeId,
    probe_type: ReflectionProbeType,
    radius: f32,
    extents: Vec3,
    pose: Pose,
    source: ProbeSource,
    needs_capture: bool,
    capture_count: u64,
}

impl ReflectionProbe {
    /// Create a box probe at the origin with unit radius and extents.
    pub fn new() -> Self {
        Self {
            id: ProbeId::next(),
            probe_type: ReflectionProbeType::default(),
            radius: 1.0,
            extents: Vec3::ONE,
            pose: Pose::IDENTITY,
            source: ProbeSource::default(),
            needs_capture: true,
            capture_count: 0,
        }
    }

    pub fn id(&self) -> ProbeId {
        self.id
    }

    pub fn probe_type(&self) -> ReflectionProbeType {
        self.probe_type
    }

    pub fn set_type(&mut self, probe_type: ReflectionProbeType) {
        self.probe_type = probe_type;
    }

    /// Influence radius of a sphere probe.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Set the sphere radius.
    ///
    /// # Errors
    ///
    /// [`ProbeError::InvalidConfiguration`] if `radius` is not positive and
    /// finite. The previous radius is kept.
    pub fn set_radius(&mut self, radius: f32) -> Result<(), ProbeError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ProbeError::InvalidConfiguration(format!(
                "radius must be positive and finite, got {radius}"
            )));
        }
        self.radius = radius;
        Ok(())
    }

    /// Half-extents of a box probe, in probe space.
    pub fn extents(&self) -> Vec3 {
        self.extents
    }

    /// Set the box half-extents.
    ///
    /// # Errors
    ///
    /// [`ProbeError::InvalidConfiguration`] unless every component is positive
    /// and finite. The previous extents are kept.
    pub fn set_extents(&mut self, extents: Vec3) -> Result<(), ProbeError> {
        if !(extents.is_finite() && extents.cmpgt(Vec3::ZERO).all()) {
            return Err(ProbeError::InvalidConfiguration(format!(
                "extents must be positive and finite, got {extents}"
            )));
        }
        self.extents = extents;
        Ok(())
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Move the probe. A generated map is flagged for recapture when the
    /// position changes.
    pub fn set_pose(&mut self, pose: Pose) -> Result<(), ProbeError> {
        if !pose.is_finite() {
            return Err(ProbeError::InvalidConfiguration(
                "pose must be finite".to_string(),
            ));
        }
        if pose.position != self.pose.position && matches!(self.source, ProbeSource::Auto(_)) {
            self.needs_capture = true;
        }
        self.pose = pose;
        Ok(())
    }

    pub fn source(&self) -> &ProbeSource {
        &self.source
    }

    /// Externally supplied map, if set.
    pub fn custom_texture(&self) -> Option<&Arc<Texture>> {
        match &self.source {
            ProbeSource::Custom(texture) => Some(texture),
            ProbeSource::Auto(_) => None,
        }
    }

    /// Last successfully captured map. `None` in custom mode.
    pub fn generated_texture(&self) -> Option<&Arc<Texture>> {
        match &self.source {
            ProbeSource::Auto(generated) => generated.current(),
            ProbeSource::Custom(_) => None,
        }
    }

    /// Map used for shading: the custom texture if set, else the generated one.
    pub fn shading_texture(&self) -> Option<&Arc<Texture>> {
        match &self.source {
            ProbeSource::Custom(texture) => Some(texture),
            ProbeSource::Auto(generated) => generated.current(),
        }
    }

    /// Set or clear the custom texture.
    ///
    /// Setting one cancels any pending capture and releases the generated
    /// map. Clearing it returns the probe to auto mode with no map, flagged
    /// for capture.
    ///
    /// # Errors
    ///
    /// [`ProbeError::InvalidConfiguration`] if the texture is not a cube map.
    pub fn set_custom_texture(&mut self, texture: Option<Arc<Texture>>) -> Result<(), ProbeError> {
        match texture {
            Some(texture) => {
                if !texture.is_cube() {
                    return Err(ProbeError::InvalidConfiguration(
                        "custom texture must be a cube map".to_string(),
                    ));
                }
                if let ProbeSource::Auto(generated) = &mut self.source
                    && generated.cancel_pending()
                {
                    log::debug!("{}: custom texture set, pending capture cancelled", self.id);
                }
                self.source = ProbeSource::Custom(texture);
                self.needs_capture = false;
            }
            None => {
                if matches!(self.source, ProbeSource::Custom(_)) {
                    self.source = ProbeSource::default();
                    self.needs_capture = true;
                }
            }
        }
        Ok(())
    }

    /// Returns true if the probe is in auto mode and its map is missing or stale.
    pub fn needs_capture(&self) -> bool {
        self.needs_capture && matches!(self.source, ProbeSource::Auto(_))
    }

    /// Flag the generated map as stale, e.g. after the scene changed.
    pub fn invalidate(&mut self) {
        self.needs_capture = true;
    }

    /// Returns true while a capture is pending.
    pub fn is_capturing(&self) -> bool {
        match &self.source {
            ProbeSource::Auto(generated) => generated.is_capturing(),
            ProbeSource::Custom(_) => false,
        }
    }

    /// Number of captures that completed successfully.
    pub fn capture_count(&self) -> u64 {
        self.capture_count
    }

    /// Influence volume in world space.
    pub fn influence_volume(&self) -> InfluenceVolume {
        match self.probe_type {
            ReflectionProbeType::Sphere => InfluenceVolume::Sphere {
                center: self.pose.position,
                radius: self.radius,
            },
            ReflectionProbeType::Box => InfluenceVolume::Box {
                pose: self.pose,
                half_extents: self.extents,
            },
        }
    }

    /// Submit a capture from the probe's current position.
    ///
    /// Returns [`CaptureStatus::Skipped`] without side effects when a custom
    /// texture is set. A capture already in flight is superseded once the new
    /// one has been submitted.
    ///
    /// # Errors
    ///
    /// - [`ProbeError::CaptureFailed`] if there is no scene, the backend
    ///   refuses work, or the destination cannot be allocated.
    /// - [`ProbeError::DeviceLost`] while the device is lost.
    ///
    /// On error the probe's maps and pending capture are unchanged.
    pub fn capture(&mut self, ctx: &CaptureContext<'_>) -> Result<CaptureStatus, ProbeError> {
        let ProbeSource::Auto(generated) = &mut self.source else {
            log::trace!("{}: custom texture set, capture skipped", self.id);
            return Ok(CaptureStatus::Skipped);
        };
        let Some(scene) = ctx.scene else {
            return Err(ProbeError::capture_failed("scene renderer unavailable"));
        };
        if ctx.device.is_lost() {
            return Err(ProbeError::DeviceLost);
        }

        let config = ctx.config.validated();
        let descriptor = TextureDescriptor::new_cube(
            config.resolution,
            config.format,
            TextureUsage::TEXTURE_BINDING
                | TextureUsage::STORAGE_BINDING
                | TextureUsage::RENDER_ATTACHMENT,
        )
        .with_mip_levels(config.mip_levels)
        .with_label(format!("{} generated", self.id));
        let destination = ctx.device.create_texture(&descriptor)?;

        let completion = CaptureCompletion::new();
        ctx.device.track_capture(&completion);
        ctx.device.backend().submit_capture(CaptureJob {
            probe: self.id,
            origin: self.pose.position,
            scene: Arc::clone(scene),
            config,
            destination: Arc::clone(&destination),
            completion: completion.clone(),
        })?;

        let previous = generated.pending.replace(PendingCapture {
            completion: completion.clone(),
            destination,
        });
        if let Some(previous) = previous {
            previous.completion.cancel();
            log::debug!("{}: in-flight capture superseded", self.id);
        }
        log::debug!(
            "{}: capture submitted ({}px, {} mips)",
            self.id,
            config.resolution,
            config.mip_levels
        );
        Ok(CaptureStatus::Submitted(CaptureTicket::new(completion)))
    }

    /// Resolve the pending capture if its fence has signaled.
    ///
    /// On success the new map replaces the generated texture and the replaced
    /// one is returned in [`CaptureProgress::Completed`].
    pub fn update(&mut self) -> CaptureProgress {
        let ProbeSource::Auto(generated) = &mut self.source else {
            return CaptureProgress::Idle;
        };
        let Some(pending) = generated.pending.take_if(|p| p.completion.is_complete()) else {
            return if generated.is_capturing() {
                CaptureProgress::InFlight
            } else {
                CaptureProgress::Idle
            };
        };

        match pending.completion.outcome() {
            CaptureOutcome::Succeeded => {
                let retired = generated.current.replace(pending.destination);
                self.needs_capture = false;
                self.capture_count += 1;
                log::debug!("{}: generated map updated", self.id);
                CaptureProgress::Completed { retired }
            }
            CaptureOutcome::Failed(err) => {
                log::warn!("{}: {err}", self.id);
                CaptureProgress::Failed(err)
            }
            CaptureOutcome::Cancelled => CaptureProgress::Cancelled,
            CaptureOutcome::Pending => {
                // Signaled fences always carry a final outcome.
                generated.pending = Some(pending);
                CaptureProgress::InFlight
            }
        }
    }

    /// Capture and wait for the result.
    ///
    /// Returns the map that was replaced, if any.
    ///
    /// # Errors
    ///
    /// As [`capture`](Self::capture), plus [`ProbeError::CaptureFailed`] when the
    /// capture does not complete within `timeout` (it is cancelled) or is
    /// cancelled, and [`ProbeError::DeviceLost`] when the device is lost while
    /// waiting.
    pub fn capture_blocking(
        &mut self,
        ctx: &CaptureContext<'_>,
        timeout: Duration,
    ) -> Result<Option<Arc<Texture>>, ProbeError> {
        let ticket = match self.capture(ctx)? {
            CaptureStatus::Skipped => return Ok(None),
            CaptureStatus::Submitted(ticket) => ticket,
        };

        if !ticket.wait_timeout(timeout) {
            self.cancel_capture();
            log::warn!("{}: capture timed out after {timeout:?}", self.id);
            return Err(ProbeError::capture_failed(format!(
                "capture timed out after {timeout:?}"
            )));
        }

        match self.update() {
            CaptureProgress::Completed { retired } => Ok(retired),
            CaptureProgress::Failed(err) => Err(err),
            CaptureProgress::Cancelled => Err(ProbeError::capture_failed("capture cancelled")),
            CaptureProgress::Idle | CaptureProgress::InFlight => Err(ProbeError::capture_failed(
                "capture did not complete",
            )),
        }
    }

    /// Cancel the pending capture, if any. Returns true if one was pending.
    pub fn cancel_capture(&mut self) -> bool {
        match &mut self.source {
            ProbeSource::Auto(generated) => generated.cancel_pending(),
            ProbeSource::Custom(_) => false,
        }
    }
}

impl Default for ReflectionProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ReflectionProbe {
    fn drop(&mut self) {
        if self.cancel_capture() {
            log::trace!("{}: dropped with a pending capture", self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBackend;
    use crate::device::DeviceCapabilities;
    use crate::types::TextureFormat;
    use radiance_core::texture::CpuCubemap;

    fn config() -> CaptureConfig {
        CaptureConfig::default()
            .with_resolution(4)
            .with_mip_levels(2)
            .with_sample_count(4)
    }

    fn deferred_device() -> (Arc<GraphicsDevice>, Arc<DummyBackend>) {
        let backend = Arc::new(DummyBackend::deferred());
        let device = GraphicsDevice::new(
            "Deferred",
            Arc::clone(&backend) as Arc<dyn crate::backend::GpuBackend>,
            DeviceCapabilities::default(),
        );
        (device, backend)
    }

    fn custom_texture(device: &Arc<GraphicsDevice>) -> Arc<Texture> {
        device
            .create_cubemap_texture("custom", TextureFormat::Rgba16Float, CpuCubemap::new(4, 1))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let probe = ReflectionProbe::new();
        assert_eq!(probe.probe_type(), ReflectionProbeType::Box);
        assert_eq!(probe.radius(), 1.0);
        assert_eq!(probe.extents(), Vec3::ONE);
        assert!(probe.needs_capture());
        assert!(probe.generated_texture().is_none());
        assert!(probe.shading_texture().is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = ReflectionProbe::new();
        let b = ReflectionProbe::new();
        assert_ne!(a.id(), b.id());
        assert!(a.id().to_string().starts_with("probe#"));
    }

    #[test]
    fn test_invalid_radius_keeps_previous() {
        let mut probe = ReflectionProbe::new();
        probe.set_radius(3.0).unwrap();
        for bad in [-1.0, 0.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                probe.set_radius(bad),
                Err(ProbeError::InvalidConfiguration(_))
            ));
            assert_eq!(probe.radius(), 3.0);
        }
    }

    #[test]
    fn test_invalid_extents_keeps_previous() {
        let mut probe = ReflectionProbe::new();
        probe.set_extents(Vec3::new(2.0, 3.0, 4.0)).unwrap();
        assert!(matches!(
            probe.set_extents(Vec3::new(2.0, -3.0, 4.0)),
            Err(ProbeError::InvalidConfiguration(_))
        ));
        assert_eq!(probe.extents(), Vec3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn test_set_pose_flags_recapture() {
        let device = GraphicsDevice::dummy();
        let scene = Arc::new(Scene::new());
        let config = config();
        let ctx = CaptureContext::new(&device, Some(&scene), &config);

        let mut probe = ReflectionProbe::new();
        probe.capture_blocking(&ctx, Duration::from_secs(1)).unwrap();
        assert!(!probe.needs_capture());

        probe
            .set_pose(Pose::from_translation(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        assert!(probe.needs_capture());
        assert!(probe
            .set_pose(Pose::from_translation(Vec3::splat(f32::NAN)))
            .is_err());
        assert_eq!(probe.pose().position, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_capture_without_scene_fails() {
        let device = GraphicsDevice::dummy();
        let config = config();
        let mut probe = ReflectionProbe::new();
        let result = probe.capture(&CaptureContext::new(&device, None, &config));
        assert!(matches!(result, Err(ProbeError::CaptureFailed { .. })));
        assert!(!probe.is_capturing());
    }

    #[test]
    fn test_capture_on_lost_device() {
        let device = GraphicsDevice::dummy();
        let scene = Arc::new(Scene::new());
        let config = config();
        device.mark_lost();
        let mut probe = ReflectionProbe::new();
        let result = probe.capture(&CaptureContext::new(&device, Some(&scene), &config));
        assert_eq!(result.unwrap_err(), ProbeError::DeviceLost);
    }

    #[test]
    fn test_custom_texture_skips_capture() {
        let (device, backend) = deferred_device();
        let scene = Arc::new(Scene::new());
        let config = config();
        let custom = custom_texture(&device);

        let mut probe = ReflectionProbe::new();
        probe.set_custom_texture(Some(Arc::clone(&custom))).unwrap();
        let status = probe
            .capture(&CaptureContext::new(&device, Some(&scene), &config))
            .unwrap();

        assert!(matches!(status, CaptureStatus::Skipped));
        assert_eq!(backend.pending_count(), 0);
        assert!(!probe.needs_capture());
        assert_eq!(probe.shading_texture().map(|t| t.id()), Some(custom.id()));
        assert!(matches!(probe.update(), CaptureProgress::Idle));
    }

    #[test]
    fn test_custom_texture_must_be_cube() {
        let device = GraphicsDevice::dummy();
        let flat = device
            .create_texture(&TextureDescriptor::new_2d(
                4,
                4,
                TextureFormat::Rgba8Unorm,
                TextureUsage::TEXTURE_BINDING,
            ))
            .unwrap();
        let mut probe = ReflectionProbe::new();
        assert!(matches!(
            probe.set_custom_texture(Some(flat)),
            Err(ProbeError::InvalidConfiguration(_))
        ));
        assert!(probe.custom_texture().is_none());
    }

    #[test]
    fn test_custom_texture_cancels_pending_capture() {
        let (device, backend) = deferred_device();
        let scene = Arc::new(Scene::new());
        let config = config();
        let mut probe = ReflectionProbe::new();

        let status = probe
            .capture(&CaptureContext::new(&device, Some(&scene), &config))
            .unwrap();
        let ticket = status.ticket().unwrap().clone();
        probe.set_custom_texture(Some(custom_texture(&device))).unwrap();
        assert!(!probe.is_capturing());

        backend.flush();
        assert_eq!(ticket.outcome(), CaptureOutcome::Cancelled);
    }

    #[test]
    fn test_clearing_custom_texture_returns_to_auto() {
        let device = GraphicsDevice::dummy();
        let mut probe = ReflectionProbe::new();
        probe.set_custom_texture(Some(custom_texture(&device))).unwrap();
        assert!(!probe.needs_capture());

        probe.set_custom_texture(None).unwrap();
        assert!(matches!(probe.source(), ProbeSource::Auto(_)));
        assert!(probe.needs_capture());
        assert!(probe.shading_texture().is_none());
    }

    #[test]
    fn test_update_before_fence_keeps_previous() {
        let (device, backend) = deferred_device();
        let scene = Arc::new(Scene::new());
        let config = config();
        let ctx = CaptureContext::new(&device, Some(&scene), &config);
        let mut probe = ReflectionProbe::new();

        probe.capture(&ctx).unwrap();
        backend.flush();
        assert!(matches!(probe.update(), CaptureProgress::Completed { retired: None }));
        let first = probe.generated_texture().unwrap().id();

        probe.capture(&ctx).unwrap();
        assert!(matches!(probe.update(), CaptureProgress::InFlight));
        assert_eq!(probe.generated_texture().unwrap().id(), first);

        backend.flush();
        match probe.update() {
            CaptureProgress::Completed { retired } => {
                assert_eq!(retired.unwrap().id(), first);
            }
            other => panic!("unexpected progress {other:?}"),
        }
        assert_ne!(probe.generated_texture().unwrap().id(), first);
        assert_eq!(probe.capture_count(), 2);
    }

    #[test]
    fn test_new_capture_supersedes_pending() {
        let (device, backend) = deferred_device();
        let scene = Arc::new(Scene::new());
        let config = config();
        let ctx = CaptureContext::new(&device, Some(&scene), &config);
        let mut probe = ReflectionProbe::new();

        let first = probe.capture(&ctx).unwrap().ticket().unwrap().clone();
        let second = probe.capture(&ctx).unwrap().ticket().unwrap().clone();
        backend.flush();

        assert_eq!(first.outcome(), CaptureOutcome::Cancelled);
        assert_eq!(second.outcome(), CaptureOutcome::Succeeded);
        assert!(matches!(probe.update(), CaptureProgress::Completed { .. }));
        assert_eq!(probe.capture_count(), 1);
    }

    #[test]
    fn test_out_of_memory_keeps_previous_state() {
        let caps = DeviceCapabilities::default().with_memory_budget(1024);
        let device = GraphicsDevice::new("Tiny", Arc::new(DummyBackend::new()), caps);
        let scene = Arc::new(Scene::new());
        let config = config().with_resolution(64);
        let mut probe = ReflectionProbe::new();

        let result = probe.capture(&CaptureContext::new(&device, Some(&scene), &config));
        assert!(matches!(result, Err(ProbeError::CaptureFailed { .. })));
        assert!(!probe.is_capturing());
        assert!(probe.generated_texture().is_none());
        assert_eq!(device.allocated_bytes(), 0);
    }

    #[test]
    fn test_device_lost_fails_pending_capture() {
        let (device, _backend) = deferred_device();
        let scene = Arc::new(Scene::new());
        let config = config();
        let mut probe = ReflectionProbe::new();

        probe
            .capture(&CaptureContext::new(&device, Some(&scene), &config))
            .unwrap();
        device.mark_lost();

        match probe.update() {
            CaptureProgress::Failed(err) => assert_eq!(err, ProbeError::DeviceLost),
            other => panic!("unexpected progress {other:?}"),
        }
        assert!(probe.generated_texture().is_none());
        assert!(probe.needs_capture());
    }

    #[test]
    fn test_capture_blocking_times_out() {
        let (device, _backend) = deferred_device();
        let scene = Arc::new(Scene::new());
        let config = config();
        let mut probe = ReflectionProbe::new();

        let result = probe.capture_blocking(
            &CaptureContext::new(&device, Some(&scene), &config),
            Duration::from_millis(10),
        );
        assert!(matches!(result, Err(ProbeError::CaptureFailed { .. })));
        assert!(!probe.is_capturing());
        assert!(probe.generated_texture().is_none());
    }

    #[test]
    fn test_influence_volume_follows_type() {
        let mut probe = ReflectionProbe::new();
        probe
            .set_pose(Pose::from_translation(Vec3::new(0.0, 2.0, 0.0)))
            .unwrap();
        probe.set_radius(5.0).unwrap();
        probe.set_type(ReflectionProbeType::Sphere);
        assert_eq!(
            probe.influence_volume(),
            InfluenceVolume::Sphere {
                center: Vec3::new(0.0, 2.0, 0.0),
                radius: 5.0
            }
        );

        probe.set_type(ReflectionProbeType::Box);
        assert!(matches!(probe.influence_volume(), InfluenceVolume::Box { .. }));
    }
}
