//! Probe influence selection.
//!
//! A point is influenced by every probe whose [`InfluenceVolume`] contains it.
//! Overlapping probes are blended with weights that sum to 1; when nothing
//! covers the point the sky probe is used instead. [`ProbeGrid`] keeps query
//! cost proportional to the number of probes near the point.

mod grid;
mod volume;

pub use grid::{DEFAULT_CELL_SIZE, MAX_CELLS_PER_PROBE, ProbeGrid};
pub use volume::{InfluenceVolume, ProbeInfluence, ProbeWeight};
