//! Scene description consumed by probe captures.
//!
//! These types are backend-agnostic and can be built programmatically or
//! produced by any loader.
//!
//! - [`Scene`] - Surfaces, lights and sky
//! - [`Surface`] / [`Shape`] / [`Material`] - Analytic geometry with emission and albedo
//! - [`DirectionalLight`] - Infinitely distant light
//! - [`Ray`] / [`Hit`] - Tracing primitives

mod types;

pub use types::{DirectionalLight, Hit, Material, Ray, Scene, Shape, Surface};
