//! CPU reference of the output color path.
//!
//! These mirror what the post-processing passes do per pixel, in linear
//! Rec.709 / sRGB primaries.

use glam::{Mat3, Vec2, Vec3};

use crate::settings::{ColorGradingSettings, TonemappingSettings, WhiteBalanceSettings};

const LUMA: Vec3 = Vec3::new(0.2126, 0.7152, 0.0722);
const MID_GREY: f32 = 0.18;
const D65_WHITE: Vec2 = Vec2::new(0.3127, 0.3290);

fn per_channel(v: Vec3, f: impl Fn(f32) -> f32) -> Vec3 {
    Vec3::new(f(v.x), f(v.y), f(v.z))
}

/// Unnormalized filmic (Hable) curve.
fn hable(x: f32, t: &TonemappingSettings) -> f32 {
    let a = t.filmic_curve_shoulder_strength;
    let b = t.filmic_curve_linear_strength;
    let c = t.filmic_curve_linear_angle;
    let d = t.filmic_curve_toe_strength;
    let e = t.filmic_curve_toe_numerator;
    let f = t.filmic_curve_toe_denominator;
    ((x * (a * x + c * b) + d * e) / (x * (a * x + b) + d * f)) - e / f
}

/// Map linear HDR color to [0, 1] with the filmic curve, white point at 1.
pub fn tonemap_filmic(color: Vec3, settings: &TonemappingSettings) -> Vec3 {
    let white = hable(settings.filmic_curve_linear_white_point, settings);
    if !(white.is_finite() && white > 0.0) {
        return color.clamp(Vec3::ZERO, Vec3::ONE);
    }
    per_channel(color.max(Vec3::ZERO), |v| {
        (hable(v, settings) / white).clamp(0.0, 1.0)
    })
}

/// Apply `1 / gamma` to color clamped to [0, 1].
pub fn encode_gamma(color: Vec3, gamma: f32) -> Vec3 {
    color.clamp(Vec3::ZERO, Vec3::ONE).powf(1.0 / gamma)
}

/// Encode linear color with the sRGB transfer function.
pub fn linear_to_srgb(color: Vec3) -> Vec3 {
    per_channel(color.clamp(Vec3::ZERO, Vec3::ONE), |c| {
        if c <= 0.003_130_8 {
            c * 12.92
        } else {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        }
    })
}

/// Saturation, contrast, gain and offset, per channel.
pub fn color_grade(color: Vec3, settings: &ColorGradingSettings) -> Vec3 {
    let luma = color.dot(LUMA);
    let saturated = Vec3::splat(luma) + (color - luma) * settings.saturation;
    let normalized = saturated.max(Vec3::ZERO) / MID_GREY;
    let contrasted = Vec3::new(
        normalized.x.powf(settings.contrast.x),
        normalized.y.powf(settings.contrast.y),
        normalized.z.powf(settings.contrast.z),
    ) * MID_GREY;
    (contrasted * settings.gain + settings.offset).max(Vec3::ZERO)
}

/// CIE xy chromaticity of daylight at `temperature` Kelvin, shifted
/// perpendicular to the daylight locus by `tint`.
fn illuminant_chromaticity(temperature: f32, tint: f32) -> Vec2 {
    let t = temperature.clamp(1000.0, 40000.0);
    let (t2, t3) = (t * t, t * t * t);
    let x = if t <= 7000.0 {
        -4.6070e9 / t3 + 2.9678e6 / t2 + 0.09911e3 / t + 0.244063
    } else {
        -2.0064e9 / t3 + 1.9018e6 / t2 + 0.24748e3 / t + 0.237040
    };
    let y = -3.0 * x * x + 2.87 * x - 0.275;

    let slope = -6.0 * x + 2.87;
    let normal = Vec2::new(-slope, 1.0).normalize();
    let tint = if tint.is_finite() { tint.clamp(-1.0, 1.0) } else { 0.0 };
    Vec2::new(x, y) + normal * tint * 0.05
}

fn xy_to_xyz(xy: Vec2) -> Vec3 {
    Vec3::new(xy.x / xy.y, 1.0, (1.0 - xy.x - xy.y) / xy.y)
}

fn rows(r: [[f32; 3]; 3]) -> Mat3 {
    Mat3::from_cols_array_2d(&r).transpose()
}

/// Linear RGB matrix adapting a scene lit by the given illuminant to D65
/// (Bradford transform).
pub fn white_balance_matrix(temperature: f32, tint: f32) -> Mat3 {
    let rgb_to_xyz = rows([
        [0.412_456_4, 0.357_576_1, 0.180_437_5],
        [0.212_672_9, 0.715_152_2, 0.072_175_0],
        [0.019_333_9, 0.119_192_0, 0.950_304_1],
    ]);
    let bradford = rows([
        [0.8951, 0.2664, -0.1614],
        [-0.7502, 1.7135, 0.0367],
        [0.0389, -0.0685, 1.0296],
    ]);

    let temperature = if temperature.is_finite() { temperature } else { 6500.0 };
    let src = bradford * xy_to_xyz(illuminant_chromaticity(temperature, tint));
    let dst = bradford * xy_to_xyz(D65_WHITE);
    let adapt = bradford.inverse() * Mat3::from_diagonal(dst / src) * bradford;
    rgb_to_xyz.inverse() * adapt * rgb_to_xyz
}

pub fn white_balance(color: Vec3, settings: &WhiteBalanceSettings) -> Vec3 {
    white_balance_matrix(settings.temperature, settings.tint) * color
}
