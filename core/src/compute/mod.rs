//! Cooperative cancellation for background work.
//!
//! - [`CancellationToken`] - Shared flag checked by long-running jobs
//! - [`Cancelled`] - Error produced when a checkpoint observes cancellation

mod cancellation;

pub use cancellation::{CancellationToken, Cancelled};
