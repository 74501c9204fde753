//! Graphics device.
//!
//! The [`GraphicsDevice`] is the main interface for creating GPU resources and
//! submitting work to its [`GpuBackend`]. It also owns the device-loss state:
//! once lost, every in-flight capture is failed and no new resources can be
//! created until [`GraphicsDevice::recover`] is called.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use parking_lot::Mutex;
use radiance_core::texture::CpuCubemap;

use crate::backend::{BackendConfig, DummyBackend, GpuBackend, SoftwareBackend, create_backend};
use crate::capture::{CaptureCompletion, CaptureOutcome};
use crate::error::{GraphicsError, ProbeError};
use crate::resources::Texture;
use crate::types::{TextureDescriptor, TextureFormat, TextureUsage};

/// Capabilities of a graphics device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceCapabilities {
    /// Maximum texture dimension.
    pub max_texture_dimension: u32,
    /// Device memory available for textures, in bytes.
    pub memory_budget: u64,
    /// Whether the backend can run several submissions at once.
    pub concurrent_submission: bool,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            max_texture_dimension: 16384,
            memory_budget: 1 << 30, // 1 GB
            concurrent_submission: false,
        }
    }
}

impl DeviceCapabilities {
    /// Returns a copy with the given memory budget.
    #[must_use]
    pub const fn with_memory_budget(mut self, bytes: u64) -> Self {
        self.memory_budget = bytes;
        self
    }
}

/// A graphics device for creating GPU resources.
///
/// # Thread Safety
///
/// `GraphicsDevice` is `Send + Sync` and can be safely shared across threads.
/// All resource creation methods use interior mutability where needed.
///
/// # Example
///
/// ```ignore
/// let device = GraphicsDevice::software(2)?;
///
/// let texture = device.create_texture(&TextureDescriptor::new_cube(
///     256,
///     TextureFormat::Rgba16Float,
///     TextureUsage::TEXTURE_BINDING,
/// ))?;
/// ```
pub struct GraphicsDevice {
    name: String,
    backend: Arc<dyn GpuBackend>,
    capabilities: DeviceCapabilities,
    allocated: AtomicU64,
    lost: AtomicBool,
    // Track allocated resources (weak references for cleanup/debugging)
    textures: RwLock<Vec<Weak<Texture>>>,
    in_flight: Mutex<Vec<CaptureCompletion>>,
}

impl GraphicsDevice {
    /// Create a device on top of a backend.
    pub fn new(
        name: impl Into<String>,
        backend: Arc<dyn GpuBackend>,
        capabilities: DeviceCapabilities,
    ) -> Arc<Self> {
        let capabilities = DeviceCapabilities {
            concurrent_submission: backend.supports_concurrent_submission(),
            ..capabilities
        };
        let device = Arc::new(Self {
            name: name.into(),
            backend,
            capabilities,
            allocated: AtomicU64::new(0),
            lost: AtomicBool::new(false),
            textures: RwLock::new(Vec::new()),
            in_flight: Mutex::new(Vec::new()),
        });
        log::info!(
            "GraphicsDevice '{}' created on {} (budget {} bytes)",
            device.name,
            device.backend.name(),
            device.capabilities.memory_budget
        );
        device
    }

    /// Create a device from backend configuration.
    pub fn from_config(
        config: &BackendConfig,
        capabilities: DeviceCapabilities,
    ) -> Result<Arc<Self>, GraphicsError> {
        let backend = create_backend(config)?;
        Ok(Self::new(backend.name(), backend, capabilities))
    }

    /// Device backed by a [`SoftwareBackend`] with `workers` capture threads.
    pub fn software(workers: usize) -> Result<Arc<Self>, GraphicsError> {
        let backend = Arc::new(SoftwareBackend::new(workers)?);
        Ok(Self::new("Software", backend, DeviceCapabilities::default()))
    }

    /// Device backed by an immediate [`DummyBackend`].
    pub fn dummy() -> Arc<Self> {
        Self::new(
            "Dummy",
            Arc::new(DummyBackend::new()),
            DeviceCapabilities::default(),
        )
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the device capabilities.
    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    /// Get the backend work is submitted to.
    pub fn backend(&self) -> &Arc<dyn GpuBackend> {
        &self.backend
    }

    /// Create a GPU texture.
    ///
    /// # Errors
    ///
    /// - [`GraphicsError::DeviceLost`] while the device is lost.
    /// - [`GraphicsError::InvalidParameter`] for empty or oversized dimensions.
    /// - [`GraphicsError::OutOfMemory`] when the memory budget is exhausted.
    pub fn create_texture(
        self: &Arc<Self>,
        descriptor: &TextureDescriptor,
    ) -> Result<Arc<Texture>, GraphicsError> {
        if self.is_lost() {
            return Err(GraphicsError::DeviceLost);
        }

        // Validate
        let max_dim = self.capabilities.max_texture_dimension;
        if descriptor.size.max_dimension() > max_dim {
            return Err(GraphicsError::InvalidParameter(format!(
                "texture dimension exceeds maximum {max_dim}"
            )));
        }

        if descriptor.size.is_empty() {
            return Err(GraphicsError::InvalidParameter(
                "texture dimensions cannot be zero".to_string(),
            ));
        }

        if descriptor.mip_level_count == 0 {
            return Err(GraphicsError::InvalidParameter(
                "texture needs at least one mip level".to_string(),
            ));
        }

        self.reserve_memory(descriptor.byte_size())?;

        // Create the texture
        let texture = Arc::new(Texture::new(Arc::clone(self), descriptor.clone()));

        // Track it, dropping entries for textures already released
        if let Ok(mut textures) = self.textures.write() {
            textures.retain(|w| w.strong_count() > 0);
            textures.push(Arc::downgrade(&texture));
        }

        log::trace!(
            "GraphicsDevice: created texture {:?}, size={}x{}x{}, mips={}",
            descriptor.label,
            descriptor.size.width,
            descriptor.size.height,
            descriptor.size.depth_or_array_layers,
            descriptor.mip_level_count
        );

        Ok(texture)
    }

    /// Create a sampled cube texture and upload `contents` into it.
    ///
    /// This is how externally supplied environment maps enter the renderer.
    pub fn create_cubemap_texture(
        self: &Arc<Self>,
        label: impl Into<String>,
        format: TextureFormat,
        contents: CpuCubemap,
    ) -> Result<Arc<Texture>, GraphicsError> {
        let descriptor = TextureDescriptor::new_cube(
            contents.size(),
            format,
            TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        )
        .with_mip_levels(contents.mip_count())
        .with_label(label);
        let texture = self.create_texture(&descriptor)?;
        texture.write_contents(contents)?;
        Ok(texture)
    }

    fn reserve_memory(&self, bytes: u64) -> Result<(), GraphicsError> {
        let budget = self.capabilities.memory_budget;
        self.allocated
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_add(bytes).filter(|&next| next <= budget)
            })
            .map(|_| ())
            .map_err(|current| {
                log::warn!(
                    "GraphicsDevice '{}': allocation of {bytes} bytes refused ({current}/{budget} in use)",
                    self.name
                );
                GraphicsError::OutOfMemory
            })
    }

    pub(crate) fn release_memory(&self, bytes: u64) {
        let _ = self
            .allocated
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_sub(bytes))
            });
    }

    /// Bytes currently allocated against the memory budget.
    pub fn allocated_bytes(&self) -> u64 {
        self.allocated.load(Ordering::Acquire)
    }

    /// Returns true while the device is lost.
    pub fn is_lost(&self) -> bool {
        self.lost.load(Ordering::Acquire)
    }

    /// Mark the device as lost.
    ///
    /// Every in-flight capture on this device completes immediately with
    /// [`ProbeError::DeviceLost`]; their results are never published.
    pub fn mark_lost(&self) {
        if self.lost.swap(true, Ordering::AcqRel) {
            return;
        }

        let failed: Vec<CaptureCompletion> = self.in_flight.lock().drain(..).collect();
        log::warn!(
            "GraphicsDevice '{}' lost, failing {} in-flight capture(s)",
            self.name,
            failed.len()
        );
        for completion in failed {
            completion.complete(CaptureOutcome::Failed(ProbeError::DeviceLost));
        }
    }

    /// Clear the lost state after the device has been re-established.
    ///
    /// Captures that failed while the device was lost are not resubmitted.
    pub fn recover(&self) {
        if self.lost.swap(false, Ordering::AcqRel) {
            log::info!("GraphicsDevice '{}' recovered", self.name);
        }
    }

    /// Register a submitted capture so device loss can fail it.
    pub(crate) fn track_capture(&self, completion: &CaptureCompletion) {
        let mut in_flight = self.in_flight.lock();
        in_flight.retain(|c| !c.is_complete());
        in_flight.push(completion.clone());
    }

    /// Number of captures submitted on this device that have not completed.
    pub fn in_flight_capture_count(&self) -> usize {
        self.in_flight
            .lock()
            .iter()
            .filter(|c| !c.is_complete())
            .count()
    }

    /// Get the number of live textures created by this device.
    pub fn texture_count(&self) -> usize {
        self.textures
            .read()
            .map(|t| t.iter().filter(|w| w.strong_count() > 0).count())
            .unwrap_or(0)
    }

    /// Clean up dead weak references to released resources.
    pub fn cleanup_dead_resources(&self) {
        if let Ok(mut textures) = self.textures.write() {
            textures.retain(|w| w.strong_count() > 0);
        }
        self.in_flight.lock().retain(|c| !c.is_complete());
    }
}

impl std::fmt::Debug for GraphicsDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsDevice")
            .field("name", &self.name)
            .field("backend", &self.backend.name())
            .field("capabilities", &self.capabilities)
            .field("lost", &self.is_lost())
            .finish()
    }
}

// Ensure GraphicsDevice is Send + Sync
static_assertions::assert_impl_all!(GraphicsDevice: Send, Sync);
