//! # Radiance Core
//!
//! Core crate for the Radiance probe renderer: math helpers, CPU cube-map
//! storage and the scene description that probe captures read.

pub mod compute;
pub mod math;
pub mod scene;
pub mod texture;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the core version once at startup.
pub fn init() {
    log::info!("Radiance Core v{} initialized", VERSION);
}
