//! Specular pre-filtering of captured radiance.
//!
//! Level `m` of the output chain is the source radiance convolved with a GGX
//! lobe of roughness `m / (mips - 1)`, importance sampled with a Hammersley
//! sequence. Lookups into the source use a box-filtered chain and pick the
//! level whose texel footprint matches each sample's solid angle, which keeps
//! low sample counts free of fireflies. The sequence is fixed, so filtering the
//! same source twice gives identical results.

use std::f32::consts::PI;

use glam::{Vec2, Vec3};
use radiance_core::compute::{CancellationToken, Cancelled};
use radiance_core::math::{CubeFace, texel_solid_angle};
use radiance_core::texture::CpuCubemap;

/// Roughness represented by mip `level` of a chain with `mip_count` levels.
pub fn roughness_for_mip(level: u32, mip_count: u32) -> f32 {
    if mip_count <= 1 {
        0.0
    } else {
        (level as f32 / (mip_count - 1) as f32).min(1.0)
    }
}

/// Fractional mip level to sample for a surface of `roughness`.
pub fn mip_for_roughness(roughness: f32, mip_count: u32) -> f32 {
    let roughness = if roughness.is_nan() {
        0.0
    } else {
        roughness.clamp(0.0, 1.0)
    };
    roughness * mip_count.saturating_sub(1) as f32
}

/// Build a `mip_count`-level pre-filtered environment map from level 0 of `source`.
pub fn prefilter_environment(
    source: &CpuCubemap,
    mip_count: u32,
    sample_count: u32,
    token: &CancellationToken,
) -> Result<CpuCubemap, Cancelled> {
    let lookup = source.clone().with_box_filtered_mips();
    let mut output = CpuCubemap::new(source.size(), mip_count);
    let mip_count = output.mip_count();
    let sample_count = sample_count.max(1);

    if let (Some(dst), Some(src)) = (output.mip_mut(0), source.mip(0)) {
        for face in CubeFace::ALL {
            dst.face_mut(face).copy_from_slice(src.face(face));
        }
    }

    for level in 1..mip_count {
        let roughness = roughness_for_mip(level, mip_count);
        let Some(dst) = output.mip_mut(level) else {
            break;
        };
        let size = dst.size();
        for face in CubeFace::ALL {
            token.checkpoint()?;
            for y in 0..size {
                for x in 0..size {
                    let n = face.texel_direction(x, y, size);
                    dst.set_texel(face, x, y, prefilter_texel(&lookup, n, roughness, sample_count));
                }
            }
        }
        log::trace!("Pre-filtered level {level} (roughness {roughness:.3}, {size}px)");
    }

    Ok(output)
}

/// Convolve the radiance around `n` with a GGX lobe, assuming `v = n`.
fn prefilter_texel(lookup: &CpuCubemap, n: Vec3, roughness: f32, sample_count: u32) -> Vec3 {
    let texel_sa = texel_solid_angle(lookup.size());
    let max_lod = (lookup.mip_count() - 1) as f32;
    let (tangent, bitangent) = tangent_frame(n);

    let mut total = Vec3::ZERO;
    let mut total_weight = 0.0;
    for i in 0..sample_count {
        let xi = hammersley(i, sample_count);
        let h_local = importance_sample_ggx(xi, roughness);
        let h = (tangent * h_local.x + bitangent * h_local.y + n * h_local.z).normalize();
        let l = (2.0 * n.dot(h) * h - n).normalize();
        let n_dot_l = n.dot(l);
        if n_dot_l <= 0.0 {
            continue;
        }

        // With v = n, pdf(l) = D * (n.h) / (4 * v.h) = D / 4.
        let n_dot_h = n.dot(h).max(0.0);
        let pdf = distribution_ggx(n_dot_h, roughness) * 0.25 + 1e-4;
        let sample_sa = 1.0 / (sample_count as f32 * pdf);
        let lod = (0.5 * (sample_sa / texel_sa).log2() + 1.0).clamp(0.0, max_lod);

        total += lookup.sample(l, lod) * n_dot_l;
        total_weight += n_dot_l;
    }

    if total_weight > 0.0 {
        total / total_weight
    } else {
        lookup.sample(n, 0.0)
    }
}

/// Point `i` of an `n`-point Hammersley set in `[0, 1)^2`.
fn hammersley(i: u32, n: u32) -> Vec2 {
    let radical_inverse = i.reverse_bits() as f32 * 2.328_306_4e-10;
    Vec2::new(i as f32 / n as f32, radical_inverse)
}

/// Half vector in tangent space (z is the normal) distributed by GGX.
fn importance_sample_ggx(xi: Vec2, roughness: f32) -> Vec3 {
    let a = roughness * roughness;
    let phi = 2.0 * PI * xi.x;
    let cos_theta = ((1.0 - xi.y) / (1.0 + (a * a - 1.0) * xi.y)).max(0.0).sqrt();
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

/// GGX / Trowbridge-Reitz normal distribution.
fn distribution_ggx(n_dot_h: f32, roughness: f32) -> f32 {
    let a = roughness * roughness;
    let a2 = a * a;
    let d = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    a2 / (PI * d * d).max(f32::MIN_POSITIVE)
}

fn tangent_frame(n: Vec3) -> (Vec3, Vec3) {
    let up = if n.z.abs() < 0.999 { Vec3::Z } else { Vec3::X };
    let tangent = up.cross(n).normalize();
    let bitangent = n.cross(tangent);
    (tangent, bitangent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> CancellationToken {
        CancellationToken::new()
    }

    #[test]
    fn test_roughness_mapping() {
        assert_eq!(roughness_for_mip(0, 5), 0.0);
        assert_eq!(roughness_for_mip(2, 5), 0.5);
        assert_eq!(roughness_for_mip(4, 5), 1.0);
        assert_eq!(roughness_for_mip(0, 1), 0.0);
        assert_eq!(mip_for_roughness(0.5, 5), 2.0);
        assert_eq!(mip_for_roughness(7.0, 5), 4.0);
        assert_eq!(mip_for_roughness(f32::NAN, 5), 0.0);
    }

    #[test]
    fn test_uniform_environment_stays_uniform() {
        let source = CpuCubemap::from_fn(8, |_, _, _, _| Vec3::splat(0.5));
        let filtered = prefilter_environment(&source, 4, 16, &token()).unwrap();
        assert_eq!(filtered.mip_count(), 4);
        for level in filtered.mips() {
            for face in CubeFace::ALL {
                for texel in level.face(face) {
                    assert!(texel.abs_diff_eq(Vec3::splat(0.5), 1e-4), "{texel:?}");
                }
            }
        }
    }

    #[test]
    fn test_level_zero_is_source() {
        let source = CpuCubemap::from_fn(4, |face, x, y, _| {
            Vec3::new(face.index() as f32, x as f32, y as f32)
        });
        let filtered = prefilter_environment(&source, 3, 8, &token()).unwrap();
        assert_eq!(filtered.mip(0), source.mip(0));
    }

    #[test]
    fn test_rougher_levels_spread_energy() {
        // Bright +Y face, black elsewhere. Looking sideways, a rough lobe
        // picks up more of the bright face than a sharp one.
        let source = CpuCubemap::from_fn(16, |face, _, _, _| {
            if face == CubeFace::PositiveY { Vec3::ONE } else { Vec3::ZERO }
        });
        let filtered = prefilter_environment(&source, 5, 64, &token()).unwrap();
        let dir = Vec3::new(1.0, 0.2, 0.0).normalize();
        let sharp = filtered.sample(dir, 1.0).x;
        let rough = filtered.sample(dir, 4.0).x;
        assert!(rough > sharp, "rough {rough} should exceed sharp {sharp}");
    }

    #[test]
    fn test_deterministic() {
        let source = CpuCubemap::from_fn(8, |_, x, y, dir| dir.abs() * (x + y) as f32);
        let a = prefilter_environment(&source, 4, 16, &token()).unwrap();
        let b = prefilter_environment(&source, 4, 16, &token()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_cancellation() {
        let source = CpuCubemap::new(8, 1);
        let cancelled = token();
        cancelled.cancel();
        assert_eq!(
            prefilter_environment(&source, 4, 4, &cancelled),
            Err(Cancelled)
        );
    }

    #[test]
    fn test_hammersley_in_unit_square() {
        for i in 0..32 {
            let p = hammersley(i, 32);
            assert!((0.0..1.0).contains(&p.x));
            assert!((0.0..1.0).contains(&p.y));
        }
    }
}
