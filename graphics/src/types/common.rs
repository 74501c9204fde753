//! Common types shared across the graphics system.

/// 3D extent for textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent3d {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Depth in pixels, or array layer count (6 for cube maps).
    pub depth_or_array_layers: u32,
}

impl Extent3d {
    /// Create a new extent.
    pub fn new(width: u32, height: u32, depth_or_array_layers: u32) -> Self {
        Self {
            width,
            height,
            depth_or_array_layers,
        }
    }

    /// Create a new 2D extent.
    pub fn new_2d(width: u32, height: u32) -> Self {
        Self::new(width, height, 1)
    }

    /// Largest of width and height.
    pub fn max_dimension(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Returns true if any dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.depth_or_array_layers == 0
    }
}
