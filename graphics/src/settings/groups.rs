//! Parameter groups aggregated by [`RenderSettings`](super::RenderSettings).
//!
//! Each group is a plain value type. Values are never rejected; the renderer
//! clamps what it needs when it builds a frame.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Eye adaptation driven by a luminance histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoExposureSettings {
    /// Log2 of the smallest luminance the histogram records.
    pub histogram_log2_min: f32,
    /// Log2 of the largest luminance the histogram records.
    pub histogram_log2_max: f32,
    /// Fraction of darkest pixels excluded from the average.
    pub histogram_pct_low: f32,
    /// Fraction of pixels, from the dark end, above which pixels are excluded.
    pub histogram_pct_high: f32,
    pub min_eye_adaptation: f32,
    pub max_eye_adaptation: f32,
    /// Adaptation speed towards brighter scenes.
    pub eye_adaptation_speed_up: f32,
    /// Adaptation speed towards darker scenes.
    pub eye_adaptation_speed_down: f32,
}

impl Default for AutoExposureSettings {
    fn default() -> Self {
        Self {
            histogram_log2_min: -8.0,
            histogram_log2_max: 4.0,
            histogram_pct_low: 0.8,
            histogram_pct_high: 0.985,
            min_eye_adaptation: 0.003,
            max_eye_adaptation: 2.0,
            eye_adaptation_speed_up: 3.0,
            eye_adaptation_speed_down: 3.0,
        }
    }
}

/// Shape of the filmic tonemapping curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TonemappingSettings {
    pub filmic_curve_shoulder_strength: f32,
    pub filmic_curve_linear_strength: f32,
    pub filmic_curve_linear_angle: f32,
    pub filmic_curve_toe_strength: f32,
    pub filmic_curve_toe_numerator: f32,
    pub filmic_curve_toe_denominator: f32,
    /// Linear input value mapped to white.
    pub filmic_curve_linear_white_point: f32,
}

impl Default for TonemappingSettings {
    fn default() -> Self {
        Self {
            filmic_curve_shoulder_strength: 0.15,
            filmic_curve_linear_strength: 0.5,
            filmic_curve_linear_angle: 0.1,
            filmic_curve_toe_strength: 0.2,
            filmic_curve_toe_numerator: 0.02,
            filmic_curve_toe_denominator: 0.3,
            filmic_curve_linear_white_point: 11.2,
        }
    }
}

/// Chromatic adaptation from a scene illuminant to D65.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiteBalanceSettings {
    pub enabled: bool,
    /// Scene illuminant temperature in Kelvin. 6500 is neutral.
    pub temperature: f32,
    /// Shift along the green/magenta axis. 0 is neutral.
    pub tint: f32,
}

impl Default for WhiteBalanceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            temperature: 6500.0,
            tint: 0.0,
        }
    }
}

/// Per-channel color grading applied before tonemapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorGradingSettings {
    pub enabled: bool,
    pub saturation: Vec3,
    pub contrast: Vec3,
    pub gain: Vec3,
    pub offset: Vec3,
}

impl Default for ColorGradingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            saturation: Vec3::ONE,
            contrast: Vec3::ONE,
            gain: Vec3::ONE,
            offset: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthOfFieldSettings {
    pub enabled: bool,
    /// Distance from the camera that is in perfect focus.
    pub focal_distance: f32,
    /// Range around the focal distance that is in focus.
    pub focal_range: f32,
    pub near_transition_range: f32,
    pub far_transition_range: f32,
    pub near_blur_amount: f32,
    pub far_blur_amount: f32,
}

impl Default for DepthOfFieldSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            focal_distance: 0.75,
            focal_range: 0.75,
            near_transition_range: 0.25,
            far_transition_range: 0.25,
            near_blur_amount: 0.15,
            far_blur_amount: 0.15,
        }
    }
}

/// Screen-space ambient occlusion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientOcclusionSettings {
    pub enabled: bool,
    /// World-space sampling radius.
    pub radius: f32,
    /// Depth bias against self-occlusion.
    pub bias: f32,
    /// Distance beyond which occlusion fades out.
    pub fade_distance: f32,
    pub fade_range: f32,
    pub intensity: f32,
    pub power: f32,
    /// 0 (fastest) to 4 (best).
    pub quality: u32,
}

impl Default for AmbientOcclusionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: 1.5,
            bias: 1.0,
            fade_distance: 500.0,
            fade_range: 50.0,
            intensity: 1.0,
            power: 4.0,
            quality: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenSpaceReflectionsSettings {
    pub enabled: bool,
    /// 0 (fastest) to 4 (best).
    pub quality: u32,
    pub intensity: f32,
    /// Surfaces rougher than this fall back to probe reflections only.
    pub max_roughness: f32,
}

impl Default for ScreenSpaceReflectionsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            quality: 2,
            intensity: 1.0,
            max_roughness: 0.8,
        }
    }
}

/// Cascaded directional shadows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    /// Distance from the camera covered by directional shadows.
    pub directional_shadow_distance: f32,
    pub num_cascades: u32,
    /// Higher values pack cascades closer to the camera.
    pub cascade_distribution_exponent: f32,
    /// 1 (fastest) to 4 (best).
    pub shadow_filtering_quality: u32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            directional_shadow_distance: 250.0,
            num_cascades: 4,
            cascade_distribution_exponent: 3.0,
            shadow_filtering_quality: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_group_uses_defaults() {
        let ao: AmbientOcclusionSettings = toml::from_str("radius = 3.0").unwrap();
        assert_eq!(ao.radius, 3.0);
        assert_eq!(ao.quality, 3);
        assert!(ao.enabled);
    }

    #[test]
    fn test_depth_of_field_off_by_default() {
        assert!(!DepthOfFieldSettings::default().enabled);
    }
}
