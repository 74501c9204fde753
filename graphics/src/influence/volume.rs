use glam::Vec3;
use radiance_core::math::{Aabb, Pose};

use crate::probe::ProbeId;

/// Region of space a probe's map is used in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InfluenceVolume {
    /// Points within `radius` of `center`.
    Sphere { center: Vec3, radius: f32 },
    /// Points inside a box of `half_extents`, oriented by `pose`.
    Box { pose: Pose, half_extents: Vec3 },
}

impl InfluenceVolume {
    /// How deep `point` lies inside the volume: 1 at the center, 0 on the
    /// boundary, `None` outside.
    ///
    /// Box depth is measured in the probe's local space along the axis the
    /// point is closest to leaving through.
    pub fn normalized_depth(&self, point: Vec3) -> Option<f32> {
        let edge = match *self {
            Self::Sphere { center, radius } => {
                if radius <= 0.0 {
                    return None;
                }
                point.distance(center) / radius
            }
            Self::Box { pose, half_extents } => {
                if half_extents.cmple(Vec3::ZERO).any() {
                    return None;
                }
                let local = pose.inverse_transform_point(point);
                (local.abs() / half_extents).max_element()
            }
        };
        // NaN fails this comparison and counts as outside.
        (edge <= 1.0).then(|| 1.0 - edge)
    }

    /// Returns true if `point` is inside the volume or on its boundary.
    pub fn contains(&self, point: Vec3) -> bool {
        self.normalized_depth(point).is_some()
    }

    /// World-space bounds.
    pub fn bounds(&self) -> Aabb {
        match *self {
            Self::Sphere { center, radius } => {
                Aabb::from_center_half_extents(center, Vec3::splat(radius))
            }
            Self::Box { pose, half_extents } => Aabb::from_oriented_box(&pose, half_extents),
        }
    }
}

/// Blend weight of one probe at a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeWeight {
    pub probe: ProbeId,
    pub weight: f32,
}

/// Probes influencing a point.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ProbeInfluence {
    /// One or more local probes; weights sum to 1, heaviest first.
    Probes(Vec<ProbeWeight>),
    /// No local probe covers the point; use the sky probe.
    #[default]
    Sky,
}

impl ProbeInfluence {
    /// Blend the probes among `candidates` that contain `point`.
    ///
    /// Each containing probe is weighted by its normalized depth, then the
    /// weights are normalized to sum to 1. When every containing probe has
    /// the point on its boundary they share the weight equally.
    pub fn blend<'a>(
        point: Vec3,
        candidates: impl IntoIterator<Item = (ProbeId, &'a InfluenceVolume)>,
    ) -> Self {
        let mut weights: Vec<ProbeWeight> = candidates
            .into_iter()
            .filter_map(|(probe, volume)| {
                volume
                    .normalized_depth(point)
                    .map(|weight| ProbeWeight { probe, weight })
            })
            .collect();
        if weights.is_empty() {
            return Self::Sky;
        }

        let total: f32 = weights.iter().map(|w| w.weight).sum();
        if total > 0.0 {
            for w in &mut weights {
                w.weight /= total;
            }
        } else {
            let equal = 1.0 / weights.len() as f32;
            for w in &mut weights {
                w.weight = equal;
            }
        }

        weights.sort_by(|a, b| {
            b.weight
                .total_cmp(&a.weight)
                .then_with(|| a.probe.cmp(&b.probe))
        });
        Self::Probes(weights)
    }

    /// Per-probe weights; empty for the sky fallback.
    pub fn weights(&self) -> &[ProbeWeight] {
        match self {
            Self::Probes(weights) => weights,
            Self::Sky => &[],
        }
    }

    /// Weight of `probe`, 0 if it does not influence the point.
    pub fn weight_of(&self, probe: ProbeId) -> f32 {
        self.weights()
            .iter()
            .find(|w| w.probe == probe)
            .map_or(0.0, |w| w.weight)
    }

    pub fn is_sky(&self) -> bool {
        matches!(self, Self::Sky)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn sphere(x: f32, radius: f32) -> InfluenceVolume {
        InfluenceVolume::Sphere {
            center: Vec3::new(x, 0.0, 0.0),
            radius,
        }
    }

    #[test]
    fn test_sphere_depth() {
        let volume = sphere(0.0, 2.0);
        assert_eq!(volume.normalized_depth(Vec3::ZERO), Some(1.0));
        assert_eq!(volume.normalized_depth(Vec3::X), Some(0.5));
        assert_eq!(volume.normalized_depth(Vec3::new(2.0, 0.0, 0.0)), Some(0.0));
        assert_eq!(volume.normalized_depth(Vec3::new(2.1, 0.0, 0.0)), None);
        assert!(!volume.contains(Vec3::splat(f32::NAN)));
    }

    #[test]
    fn test_box_is_evaluated_in_local_space() {
        // Rotated 90° about Y: local X (long axis) maps to world -Z.
        let volume = InfluenceVolume::Box {
            pose: Pose::from_translation(Vec3::new(10.0, 0.0, 0.0))
                .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
            half_extents: Vec3::new(4.0, 1.0, 1.0),
        };
        assert!(volume.contains(Vec3::new(10.0, 0.0, 3.0)));
        assert!(!volume.contains(Vec3::new(13.0, 0.0, 0.0)));

        let bounds = volume.bounds();
        assert!(bounds.contains(Vec3::new(10.0, 0.0, 3.9)));
        assert!((bounds.size() - Vec3::new(2.0, 2.0, 8.0)).abs().max_element() < 1e-4);
    }

    #[test]
    fn test_blend_no_candidates_is_sky() {
        let influence = ProbeInfluence::blend(Vec3::ZERO, std::iter::empty());
        assert!(influence.is_sky());
        assert!(influence.weights().is_empty());
    }

    #[test]
    fn test_blend_skips_probes_not_containing_point() {
        let a = ProbeId::next();
        let b = ProbeId::next();
        let near = sphere(0.0, 1.0);
        let far = sphere(50.0, 1.0);
        let influence = ProbeInfluence::blend(Vec3::ZERO, [(a, &near), (b, &far)]);
        assert_eq!(influence.weight_of(a), 1.0);
        assert_eq!(influence.weight_of(b), 0.0);
    }

    #[test]
    fn test_blend_on_shared_boundary_is_equal() {
        let a = ProbeId::next();
        let b = ProbeId::next();
        let left = sphere(-1.0, 1.0);
        let right = sphere(1.0, 1.0);
        let influence = ProbeInfluence::blend(Vec3::ZERO, [(a, &left), (b, &right)]);
        assert_eq!(influence.weight_of(a), 0.5);
        assert_eq!(influence.weight_of(b), 0.5);
    }

    #[test]
    fn test_blend_heaviest_first() {
        let a = ProbeId::next();
        let b = ProbeId::next();
        let left = sphere(0.0, 2.0);
        let right = sphere(2.0, 2.0);
        let influence =
            ProbeInfluence::blend(Vec3::new(1.5, 0.0, 0.0), [(a, &left), (b, &right)]);
        assert_eq!(influence.weights()[0].probe, b);
    }
}
