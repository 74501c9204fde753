//! CPU-visible synchronization.
//!
//! A [`Fence`] is signaled by a backend once submitted work has completed.
//! Frame slots and probe captures both hand out fences; consumers either poll
//! them or wait with a timeout.

mod sync;

pub use sync::{Fence, FenceStatus};
