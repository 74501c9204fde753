//! Uniform-grid acceleration structure for probe influence queries.

use std::collections::HashMap;

use glam::{IVec3, Vec3};
use radiance_core::math::Aabb;

use crate::probe::ProbeId;

use super::{InfluenceVolume, ProbeInfluence};

/// Probes whose bounds cover more cells than this go to the oversized list.
pub const MAX_CELLS_PER_PROBE: i64 = 512;

/// Cell size used when the configured one is unusable.
pub const DEFAULT_CELL_SIZE: f32 = 8.0;

#[derive(Debug, Clone, Copy)]
struct GridEntry {
    probe: ProbeId,
    volume: InfluenceVolume,
}

/// Uniform grid over probe influence bounds.
///
/// Each probe is registered in every cell its bounds overlap, so a query only
/// tests the probes registered in the query point's cell. Probes spanning
/// more than [`MAX_CELLS_PER_PROBE`] cells (or with non-finite bounds) are kept
/// in a separate list tested on every query.
#[derive(Debug, Clone)]
pub struct ProbeGrid {
    cell_size: f32,
    entries: Vec<GridEntry>,
    cells: HashMap<IVec3, Vec<u32>>,
    oversized: Vec<u32>,
}

impl ProbeGrid {
    /// Create an empty grid with `cell_size` world units per cell.
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            log::warn!("Invalid probe grid cell size {cell_size}, using {DEFAULT_CELL_SIZE}");
            DEFAULT_CELL_SIZE
        };
        Self {
            cell_size,
            entries: Vec::new(),
            cells: HashMap::new(),
            oversized: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of registered probes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every probe.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cells.clear();
        self.oversized.clear();
    }

    /// Register a probe's influence volume.
    pub fn insert(&mut self, probe: ProbeId, volume: InfluenceVolume) {
        let index = self.entries.len() as u32;
        self.entries.push(GridEntry { probe, volume });

        let bounds = volume.bounds();
        let Some((min, max)) = self.cell_range(&bounds) else {
            self.oversized.push(index);
            return;
        };
        for z in min.z..=max.z {
            for y in min.y..=max.y {
                for x in min.x..=max.x {
                    self.cells.entry(IVec3::new(x, y, z)).or_default().push(index);
                }
            }
        }
    }

    /// Blend the probes influencing `point`, falling back to the sky.
    pub fn query(&self, point: Vec3) -> ProbeInfluence {
        ProbeInfluence::blend(
            point,
            self.candidates(point)
                .map(|entry| (entry.probe, &entry.volume)),
        )
    }

    /// Number of probes tested by a query at `point`.
    pub fn candidate_count(&self, point: Vec3) -> usize {
        self.candidates(point).count()
    }

    fn candidates(&self, point: Vec3) -> impl Iterator<Item = &GridEntry> {
        let cell = self
            .cell_of(point)
            .and_then(|cell| self.cells.get(&cell))
            .map_or(&[][..], Vec::as_slice);
        cell.iter()
            .chain(&self.oversized)
            .filter_map(|&index| self.entries.get(index as usize))
    }

    fn cell_of(&self, point: Vec3) -> Option<IVec3> {
        let cell = (point / self.cell_size).floor();
        let limit = i32::MAX as f32;
        (cell.is_finite() && cell.abs().max_element() < limit).then(|| cell.as_ivec3())
    }

    /// Inclusive cell range covered by `bounds`, or `None` if it is too large
    /// to register cell by cell.
    fn cell_range(&self, bounds: &Aabb) -> Option<(IVec3, IVec3)> {
        let min = self.cell_of(bounds.min)?;
        let max = self.cell_of(bounds.max)?;
        let span = |lo: i32, hi: i32| i64::from(hi) - i64::from(lo) + 1;
        let count = span(min.x, max.x)
            .checked_mul(span(min.y, max.y))?
            .checked_mul(span(min.z, max.z))?;
        (count <= MAX_CELLS_PER_PROBE).then_some((min, max))
    }
}

impl Default for ProbeGrid {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere(center: Vec3, radius: f32) -> InfluenceVolume {
        InfluenceVolume::Sphere { center, radius }
    }

    #[test]
    fn test_invalid_cell_size_falls_back() {
        assert_eq!(ProbeGrid::new(0.0).cell_size(), DEFAULT_CELL_SIZE);
        assert_eq!(ProbeGrid::new(f32::NAN).cell_size(), DEFAULT_CELL_SIZE);
        assert_eq!(ProbeGrid::new(2.0).cell_size(), 2.0);
    }

    #[test]
    fn test_query_only_tests_nearby_probes() {
        let mut grid = ProbeGrid::new(4.0);
        let near = ProbeId::next();
        grid.insert(near, sphere(Vec3::ZERO, 1.0));
        for i in 1..20 {
            grid.insert(ProbeId::next(), sphere(Vec3::new(i as f32 * 20.0, 0.0, 0.0), 1.0));
        }

        assert_eq!(grid.len(), 20);
        assert_eq!(grid.candidate_count(Vec3::new(0.5, 0.0, 0.0)), 1);
        assert_eq!(grid.query(Vec3::new(0.5, 0.0, 0.0)).weight_of(near), 1.0);
    }

    #[test]
    fn test_oversized_probe_seen_everywhere() {
        let mut grid = ProbeGrid::new(1.0);
        let huge = ProbeId::next();
        grid.insert(huge, sphere(Vec3::ZERO, 100.0));

        assert_eq!(grid.candidate_count(Vec3::new(90.0, 0.0, 0.0)), 1);
        assert_eq!(grid.candidate_count(Vec3::new(-500.0, 0.0, 0.0)), 1);
        assert!(grid.query(Vec3::new(-500.0, 0.0, 0.0)).is_sky());
        assert_eq!(grid.query(Vec3::new(50.0, 0.0, 0.0)).weight_of(huge), 1.0);
    }

    #[test]
    fn test_probe_spanning_cells() {
        let mut grid = ProbeGrid::new(1.0);
        let probe = ProbeId::next();
        grid.insert(probe, sphere(Vec3::ZERO, 2.0));

        for x in [-1.9, -0.5, 0.5, 1.9] {
            assert_eq!(grid.query(Vec3::new(x, 0.0, 0.0)).weight_of(probe), 1.0);
        }
        assert_eq!(grid.candidate_count(Vec3::new(3.5, 0.0, 0.0)), 0);
    }

    #[test]
    fn test_empty_grid_is_sky() {
        let grid = ProbeGrid::default();
        assert!(grid.is_empty());
        assert!(grid.query(Vec3::ZERO).is_sky());
    }

    #[test]
    fn test_clear() {
        let mut grid = ProbeGrid::new(1.0);
        grid.insert(ProbeId::next(), sphere(Vec3::ZERO, 1.0));
        grid.insert(ProbeId::next(), sphere(Vec3::ZERO, 1000.0));
        grid.clear();
        assert!(grid.is_empty());
        assert_eq!(grid.candidate_count(Vec3::ZERO), 0);
    }
}
