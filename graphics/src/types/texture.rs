//! Texture types and descriptors.

use super::Extent3d;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Texture format enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum TextureFormat {
    /// 8-bit RGBA channels, unsigned normalized.
    Rgba8Unorm,
    /// 8-bit RGBA channels, sRGB.
    Rgba8UnormSrgb,
    /// Packed 11/11/10-bit unsigned float RGB.
    Rg11b10Float,
    /// 16-bit RGBA channels, float.
    #[default]
    Rgba16Float,
    /// 32-bit RGBA channels, float.
    Rgba32Float,
    /// 32-bit depth, float.
    Depth32Float,
}

impl TextureFormat {
    /// Returns true if this is a depth format.
    pub fn is_depth(&self) -> bool {
        matches!(self, Self::Depth32Float)
    }

    /// Returns true if the format stores values above 1.0.
    pub fn is_hdr(&self) -> bool {
        matches!(
            self,
            Self::Rg11b10Float | Self::Rgba16Float | Self::Rgba32Float
        )
    }

    /// Returns the size in bytes per pixel.
    pub fn block_size(&self) -> u32 {
        match self {
            Self::Rgba8Unorm | Self::Rgba8UnormSrgb | Self::Rg11b10Float | Self::Depth32Float => {
                4
            }
            Self::Rgba16Float => 8,
            Self::Rgba32Float => 16,
        }
    }
}

/// Texture dimensionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureDimension {
    /// Single 2D image (or array).
    #[default]
    D2,
    /// Six-layer cube map.
    Cube,
}

bitflags! {
    /// Usage flags for textures.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Texture can be copied from.
        const COPY_SRC = 1 << 0;
        /// Texture can be copied to.
        const COPY_DST = 1 << 1;
        /// Texture can be sampled in a shader.
        const TEXTURE_BINDING = 1 << 2;
        /// Texture can be used as a storage texture.
        const STORAGE_BINDING = 1 << 3;
        /// Texture can be used as a render attachment.
        const RENDER_ATTACHMENT = 1 << 4;
    }
}

impl Default for TextureUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Descriptor for creating a texture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureDescriptor {
    /// Debug label for the texture.
    pub label: Option<String>,
    /// Size of the texture. Cube maps carry 6 array layers.
    pub size: Extent3d,
    /// Dimensionality.
    pub dimension: TextureDimension,
    /// Mip level count.
    pub mip_level_count: u32,
    /// Sample count for multisampling.
    pub sample_count: u32,
    /// Texture format.
    pub format: TextureFormat,
    /// Usage flags.
    pub usage: TextureUsage,
}

impl TextureDescriptor {
    /// Create a new 2D texture descriptor.
    pub fn new_2d(width: u32, height: u32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            label: None,
            size: Extent3d::new_2d(width, height),
            dimension: TextureDimension::D2,
            mip_level_count: 1,
            sample_count: 1,
            format,
            usage,
        }
    }

    /// Create a cube map descriptor with square faces of `size` texels.
    pub fn new_cube(size: u32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            label: None,
            size: Extent3d::new(size, size, 6),
            dimension: TextureDimension::Cube,
            mip_level_count: 1,
            sample_count: 1,
            format,
            usage,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the mip level count.
    pub fn with_mip_levels(mut self, count: u32) -> Self {
        self.mip_level_count = count;
        self
    }

    /// Set the sample count for multisampling.
    pub fn with_sample_count(mut self, count: u32) -> Self {
        self.sample_count = count;
        self
    }

    /// Bytes of device memory the full mip chain occupies.
    pub fn byte_size(&self) -> u64 {
        let block = u64::from(self.format.block_size());
        let layers = u64::from(self.size.depth_or_array_layers.max(1));
        let samples = u64::from(self.sample_count.max(1));
        (0..self.mip_level_count.max(1))
            .map(|level| {
                let w = u64::from((self.size.width >> level).max(1));
                let h = u64::from((self.size.height >> level).max(1));
                w * h * layers * block * samples
            })
            .sum()
    }
}

impl Default for TextureDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            size: Extent3d::default(),
            dimension: TextureDimension::D2,
            mip_level_count: 1,
            sample_count: 1,
            format: TextureFormat::default(),
            usage: TextureUsage::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_sizes() {
        assert_eq!(TextureFormat::Rgba8Unorm.block_size(), 4);
        assert_eq!(TextureFormat::Rgba16Float.block_size(), 8);
        assert_eq!(TextureFormat::Rgba32Float.block_size(), 16);
        assert!(TextureFormat::Rgba16Float.is_hdr());
        assert!(!TextureFormat::Rgba8Unorm.is_hdr());
        assert!(TextureFormat::Depth32Float.is_depth());
    }

    #[test]
    fn test_cube_descriptor_byte_size() {
        let desc = TextureDescriptor::new_cube(4, TextureFormat::Rgba16Float, TextureUsage::empty())
            .with_mip_levels(3);
        assert_eq!(desc.dimension, TextureDimension::Cube);
        assert_eq!(desc.size.depth_or_array_layers, 6);
        // (16 + 4 + 1) texels per face, 6 faces, 8 bytes each
        assert_eq!(desc.byte_size(), 21 * 6 * 8);
    }

    #[test]
    fn test_usage_flags() {
        let usage = TextureUsage::TEXTURE_BINDING | TextureUsage::RENDER_ATTACHMENT;
        assert!(usage.contains(TextureUsage::TEXTURE_BINDING));
        assert!(!usage.contains(TextureUsage::STORAGE_BINDING));
    }
}
