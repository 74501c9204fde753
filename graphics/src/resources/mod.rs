//! GPU resources.
//!
//! This module contains the GPU resource types that are created by [`GraphicsDevice`]:
//! - [`Texture`] - GPU texture/image, including probe cube maps
//!
//! Resources are reference-counted with [`Arc`] and can be shared across threads.
//! Each resource holds a strong reference to its parent device.
//!
//! [`GraphicsDevice`]: crate::GraphicsDevice
//! [`Arc`]: std::sync::Arc

mod texture;

pub use texture::Texture;
