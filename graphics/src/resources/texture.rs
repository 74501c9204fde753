//! GPU texture resource.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;
use parking_lot::RwLock;
use radiance_core::texture::CpuCubemap;

use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::types::{Extent3d, TextureDescriptor, TextureDimension, TextureFormat};

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// A GPU texture resource.
///
/// Textures are created by [`GraphicsDevice::create_texture`] and are reference-counted.
/// They hold a strong reference to their parent device, keeping it alive, and
/// return their memory to the device budget when dropped.
///
/// Cube textures carry their texel data as a [`CpuCubemap`] once a backend
/// (or an upload) has written them. Contents are replaced as a whole, never
/// partially.
///
/// # Example
///
/// ```ignore
/// let texture = device.create_texture(&TextureDescriptor::new_cube(
///     256,
///     TextureFormat::Rgba16Float,
///     TextureUsage::TEXTURE_BINDING,
/// ))?;
/// println!("Cube face size: {}", texture.width());
/// ```
pub struct Texture {
    id: u64,
    device: Arc<GraphicsDevice>,
    descriptor: TextureDescriptor,
    byte_size: u64,
    contents: RwLock<Option<Arc<CpuCubemap>>>,
}

impl Texture {
    /// Create a new texture (called by GraphicsDevice).
    pub(crate) fn new(device: Arc<GraphicsDevice>, descriptor: TextureDescriptor) -> Self {
        let byte_size = descriptor.byte_size();
        Self {
            id: NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed),
            device,
            descriptor,
            byte_size,
            contents: RwLock::new(None),
        }
    }

    /// Unique identifier, stable for the texture's lifetime.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Get the parent device.
    pub fn device(&self) -> &Arc<GraphicsDevice> {
        &self.device
    }

    /// Get the texture descriptor.
    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.descriptor
    }

    /// Get the texture size.
    pub fn size(&self) -> Extent3d {
        self.descriptor.size
    }

    /// Get the texture width.
    pub fn width(&self) -> u32 {
        self.descriptor.size.width
    }

    /// Get the texture height.
    pub fn height(&self) -> u32 {
        self.descriptor.size.height
    }

    /// Get the texture format.
    pub fn format(&self) -> TextureFormat {
        self.descriptor.format
    }

    /// Get the mip level count.
    pub fn mip_level_count(&self) -> u32 {
        self.descriptor.mip_level_count
    }

    /// Get the texture label, if set.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }

    /// Returns true for six-layer cube maps.
    pub fn is_cube(&self) -> bool {
        self.descriptor.dimension == TextureDimension::Cube
    }

    /// Device memory this texture accounts for.
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Texel data, if the texture has been written.
    pub fn contents(&self) -> Option<Arc<CpuCubemap>> {
        self.contents.read().clone()
    }

    /// Returns true once texel data has been written.
    pub fn has_contents(&self) -> bool {
        self.contents.read().is_some()
    }

    /// Sample the cube map along `dir` at mip `lod`.
    ///
    /// Returns `None` for unwritten textures.
    pub fn sample(&self, dir: Vec3, lod: f32) -> Option<Vec3> {
        self.contents.read().as_ref().map(|map| map.sample(dir, lod))
    }

    /// Replace the texel data.
    ///
    /// The map must match the descriptor's face size and mip count.
    pub(crate) fn write_contents(&self, map: CpuCubemap) -> Result<(), GraphicsError> {
        if !self.is_cube() {
            return Err(GraphicsError::InvalidParameter(format!(
                "texture {:?} is not a cube map",
                self.label()
            )));
        }
        if map.size() != self.width() || map.mip_count() != self.mip_level_count() {
            return Err(GraphicsError::InvalidParameter(format!(
                "cube map {}px/{} mips does not match texture {}px/{} mips",
                map.size(),
                map.mip_count(),
                self.width(),
                self.mip_level_count()
            )));
        }

        *self.contents.write() = Some(Arc::new(map));
        log::trace!("Texture {}: contents written", self.id);
        Ok(())
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.device.release_memory(self.byte_size);
        log::trace!(
            "Texture {} ({:?}) released, {} bytes",
            self.id,
            self.descriptor.label,
            self.byte_size
        );
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("id", &self.id)
            .field("size", &self.descriptor.size)
            .field("format", &self.descriptor.format)
            .field("usage", &self.descriptor.usage)
            .field("label", &self.descriptor.label)
            .finish()
    }
}

// Ensure Texture is Send + Sync
static_assertions::assert_impl_all!(Texture: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TextureUsage;

    fn create_test_device() -> Arc<GraphicsDevice> {
        GraphicsDevice::dummy()
    }

    fn cube_descriptor(size: u32, mips: u32) -> TextureDescriptor {
        TextureDescriptor::new_cube(size, TextureFormat::Rgba16Float, TextureUsage::TEXTURE_BINDING)
            .with_mip_levels(mips)
            .with_label("test cube")
    }

    #[test]
    fn test_texture_debug() {
        let texture = Texture::new(create_test_device(), cube_descriptor(4, 1));
        let debug = format!("{:?}", texture);
        assert!(debug.contains("Texture"));
        assert!(debug.contains("test cube"));
    }

    #[test]
    fn test_write_and_sample() {
        let device = create_test_device();
        let texture = device
            .create_texture(&cube_descriptor(4, 1))
            .expect("texture creation should succeed");
        assert_eq!(texture.sample(Vec3::X, 0.0), None);

        texture
            .write_contents(CpuCubemap::from_fn(4, |_, _, _, _| Vec3::ONE))
            .expect("matching contents should be accepted");
        assert_eq!(texture.sample(Vec3::X, 0.0), Some(Vec3::ONE));
        assert!(texture.has_contents());
    }

    #[test]
    fn test_write_rejects_mismatched_shape() {
        let device = create_test_device();
        let texture = device
            .create_texture(&cube_descriptor(4, 2))
            .expect("texture creation should succeed");
        let result = texture.write_contents(CpuCubemap::new(4, 1));
        assert!(matches!(result, Err(GraphicsError::InvalidParameter(_))));
        assert!(!texture.has_contents());
    }

    #[test]
    fn test_ids_are_unique() {
        let device = create_test_device();
        let a = Texture::new(Arc::clone(&device), cube_descriptor(2, 1));
        let b = Texture::new(device, cube_descriptor(2, 1));
        assert_ne!(a.id(), b.id());
    }
}
