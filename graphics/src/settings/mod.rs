//! Per-camera render settings.
//!
//! [`RenderSettings`] is a flat bundle of toggles and parameter groups. It is
//! shared between a camera's controller and the renderer through
//! [`SharedRenderSettings`], which hands the renderer an immutable snapshot at
//! the start of each frame.
//!
//! Settings are never validated into errors. Dependencies between toggles
//! (tonemapping gating white balance, overlay-only gating depth-based stages)
//! are resolved when the frame's stage list is built, see
//! [`FramePlan`](crate::stages::FramePlan), so the order toggles are changed in
//! never matters.

mod groups;
mod shared;

use serde::{Deserialize, Serialize};

pub use groups::{
    AmbientOcclusionSettings, AutoExposureSettings, ColorGradingSettings, DepthOfFieldSettings,
    ScreenSpaceReflectionsSettings, ShadowSettings, TonemappingSettings, WhiteBalanceSettings,
};
pub use shared::{SettingsSnapshot, SharedRenderSettings};

use crate::config::ConfigError;

/// Lowest exposure scale the renderer applies (log2).
pub const MIN_EXPOSURE_SCALE: f32 = -8.0;
/// Highest exposure scale the renderer applies (log2).
pub const MAX_EXPOSURE_SCALE: f32 = 8.0;

pub const DEFAULT_GAMMA: f32 = 2.2;
pub const MIN_GAMMA: f32 = 0.1;
pub const MAX_GAMMA: f32 = 10.0;

/// Settings that control rendering for one camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Adapt exposure to the average scene brightness. HDR only.
    pub enable_auto_exposure: bool,
    pub auto_exposure: AutoExposureSettings,
    /// Map HDR color through the filmic curve. White balance and color
    /// grading only run while this is on. HDR only.
    pub enable_tonemapping: bool,
    pub tonemapping: TonemappingSettings,
    pub white_balance: WhiteBalanceSettings,
    pub color_grading: ColorGradingSettings,
    pub depth_of_field: DepthOfFieldSettings,
    pub ambient_occlusion: AmbientOcclusionSettings,
    pub screen_space_reflections: ScreenSpaceReflectionsSettings,
    pub enable_fxaa: bool,
    /// Log2 exposure adjustment applied on top of eye adaptation. The renderer
    /// clamps it to [`MIN_EXPOSURE_SCALE`, `MAX_EXPOSURE_SCALE`].
    pub exposure_scale: f32,
    /// With tonemapping this tweaks the display curve; without it this is the
    /// exact gamma applied to the output.
    pub gamma: f32,
    pub enable_hdr: bool,
    /// Without lighting, surfaces show their albedo.
    pub enable_lighting: bool,
    /// Only relevant while lighting is on.
    pub enable_shadows: bool,
    pub shadow_settings: ShadowSettings,
    /// Light from reflection probes and the sky.
    pub enable_indirect_lighting: bool,
    /// Render only overlays. No scene objects, no depth buffer.
    pub overlay_only: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            enable_auto_exposure: true,
            auto_exposure: AutoExposureSettings::default(),
            enable_tonemapping: true,
            tonemapping: TonemappingSettings::default(),
            white_balance: WhiteBalanceSettings::default(),
            color_grading: ColorGradingSettings::default(),
            depth_of_field: DepthOfFieldSettings::default(),
            ambient_occlusion: AmbientOcclusionSettings::default(),
            screen_space_reflections: ScreenSpaceReflectionsSettings::default(),
            enable_fxaa: true,
            exposure_scale: 0.0,
            gamma: DEFAULT_GAMMA,
            enable_hdr: true,
            enable_lighting: true,
            enable_shadows: true,
            shadow_settings: ShadowSettings::default(),
            enable_indirect_lighting: true,
            overlay_only: false,
        }
    }
}

impl RenderSettings {
    /// Parse settings from TOML. Missing fields keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Exposure scale clamped to the supported range. NaN counts as 0.
    pub fn clamped_exposure_scale(&self) -> f32 {
        if self.exposure_scale.is_nan() {
            0.0
        } else {
            self.exposure_scale
                .clamp(MIN_EXPOSURE_SCALE, MAX_EXPOSURE_SCALE)
        }
    }

    /// Linear exposure multiplier, `2^clamped_exposure_scale`.
    pub fn exposure_multiplier(&self) -> f32 {
        self.clamped_exposure_scale().exp2()
    }

    /// Gamma clamped to [`MIN_GAMMA`, `MAX_GAMMA`]; non-finite values fall back
    /// to [`DEFAULT_GAMMA`].
    pub fn effective_gamma(&self) -> f32 {
        if self.gamma.is_finite() {
            self.gamma.clamp(MIN_GAMMA, MAX_GAMMA)
        } else {
            DEFAULT_GAMMA
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = RenderSettings::default();
        assert!(settings.enable_hdr);
        assert!(settings.enable_tonemapping);
        assert!(!settings.overlay_only);
        assert_eq!(settings.gamma, 2.2);
        assert_eq!(settings.exposure_scale, 0.0);
        assert_eq!(settings.shadow_settings.num_cascades, 4);
    }

    #[test]
    fn test_exposure_scale_clamped() {
        let mut settings = RenderSettings::default();
        settings.exposure_scale = 12.0;
        assert_eq!(settings.clamped_exposure_scale(), 8.0);
        settings.exposure_scale = -100.0;
        assert_eq!(settings.clamped_exposure_scale(), -8.0);
        settings.exposure_scale = f32::NAN;
        assert_eq!(settings.clamped_exposure_scale(), 0.0);
        settings.exposure_scale = 1.0;
        assert_eq!(settings.exposure_multiplier(), 2.0);
        // Out-of-range values are stored as given.
        settings.exposure_scale = 40.0;
        assert_eq!(settings.exposure_scale, 40.0);
    }

    #[test]
    fn test_effective_gamma() {
        let mut settings = RenderSettings::default();
        settings.gamma = 0.0;
        assert_eq!(settings.effective_gamma(), MIN_GAMMA);
        settings.gamma = f32::INFINITY;
        assert_eq!(settings.effective_gamma(), DEFAULT_GAMMA);
        settings.gamma = 1.8;
        assert_eq!(settings.effective_gamma(), 1.8);
    }

    #[test]
    fn test_from_toml() {
        let settings = RenderSettings::from_toml_str(
            r#"
            enable_hdr = false
            gamma = 2.4

            [white_balance]
            temperature = 4000.0
            "#,
        )
        .unwrap();
        assert!(!settings.enable_hdr);
        assert_eq!(settings.gamma, 2.4);
        assert_eq!(settings.white_balance.temperature, 4000.0);
        assert!(settings.white_balance.enabled);
        assert!(settings.enable_fxaa);
    }
}
