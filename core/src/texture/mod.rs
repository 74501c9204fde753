//! CPU-side texture types.
//!
//! Provides [`CpuCubemap`] for holding linear HDR radiance in a six-face
//! cube map with a mip chain, plus the per-level [`CubemapMip`] storage.
//! Captured and pre-filtered environment maps live in this form until they
//! are uploaded or sampled.

mod cubemap;

pub use cubemap::{CpuCubemap, CubemapMip, max_mip_count};
