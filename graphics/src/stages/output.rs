use glam::Vec3;

use crate::settings::{
    ColorGradingSettings, DEFAULT_GAMMA, RenderSettings, TonemappingSettings,
    WhiteBalanceSettings,
};

use super::color;

/// Curve that maps scene color to display values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputCurve {
    /// Filmic tonemapping followed by the sRGB display curve. `gamma` tweaks
    /// the display curve; 2.2 leaves it untouched.
    Filmic {
        tonemapping: TonemappingSettings,
        gamma: f32,
    },
    /// Plain gamma: `clamp(color)^(1 / gamma)`.
    Gamma(f32),
}

/// Per-pixel color transform at the end of a camera's frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputTransform {
    /// Linear exposure multiplier. 1 for LDR output.
    pub exposure: f32,
    pub white_balance: Option<WhiteBalanceSettings>,
    pub color_grading: Option<ColorGradingSettings>,
    pub curve: OutputCurve,
}

impl OutputTransform {
    /// Resolve the transform a frame with `settings` uses.
    ///
    /// White balance and grading only apply when the curve is filmic, which
    /// requires both HDR and tonemapping. Without tonemapping the settings'
    /// gamma is the exact output curve.
    pub fn from_settings(settings: &RenderSettings) -> Self {
        let hdr = settings.enable_hdr;
        let tonemapped = hdr && settings.enable_tonemapping;
        let gamma = settings.effective_gamma();

        Self {
            exposure: if hdr {
                settings.exposure_multiplier()
            } else {
                1.0
            },
            white_balance: (tonemapped && settings.white_balance.enabled)
                .then_some(settings.white_balance),
            color_grading: (tonemapped && settings.color_grading.enabled)
                .then_some(settings.color_grading),
            curve: if tonemapped {
                OutputCurve::Filmic {
                    tonemapping: settings.tonemapping,
                    gamma,
                }
            } else {
                OutputCurve::Gamma(gamma)
            },
        }
    }

    /// Transform a linear scene color into a display value in [0, 1].
    pub fn apply(&self, color: Vec3) -> Vec3 {
        let mut color = color.max(Vec3::ZERO) * self.exposure;
        if let Some(white_balance) = &self.white_balance {
            color = color::white_balance(color, white_balance);
        }
        if let Some(grading) = &self.color_grading {
            color = color::color_grade(color, grading);
        }
        match &self.curve {
            OutputCurve::Filmic { tonemapping, gamma } => {
                let mapped = color::tonemap_filmic(color, tonemapping);
                color::linear_to_srgb(mapped.powf(DEFAULT_GAMMA / gamma))
            }
            OutputCurve::Gamma(gamma) => color::encode_gamma(color, *gamma),
        }
    }
}

impl Default for OutputTransform {
    fn default() -> Self {
        Self::from_settings(&RenderSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ldr_applies_gamma_directly() {
        let mut settings = RenderSettings::default();
        settings.enable_hdr = false;
        settings.gamma = 2.0;
        settings.exposure_scale = 3.0;

        let transform = OutputTransform::from_settings(&settings);
        assert_eq!(transform.curve, OutputCurve::Gamma(2.0));
        assert_eq!(transform.exposure, 1.0);
        assert!(transform.white_balance.is_none());
        assert!(transform.color_grading.is_none());

        let out = transform.apply(Vec3::new(0.25, 0.04, 4.0));
        assert!((out - Vec3::new(0.5, 0.2, 1.0)).abs().max_element() < 1e-6);
    }

    #[test]
    fn test_tonemapping_off_skips_grading() {
        let mut settings = RenderSettings::default();
        settings.enable_tonemapping = false;
        settings.white_balance.enabled = true;
        settings.color_grading.enabled = true;

        let transform = OutputTransform::from_settings(&settings);
        assert!(transform.white_balance.is_none());
        assert!(transform.color_grading.is_none());
        assert_eq!(transform.curve, OutputCurve::Gamma(2.2));
    }

    #[test]
    fn test_exposure_clamped() {
        let mut settings = RenderSettings::default();
        settings.exposure_scale = 100.0;
        assert_eq!(OutputTransform::from_settings(&settings).exposure, 256.0);
    }

    #[test]
    fn test_filmic_output_in_display_range() {
        let transform = OutputTransform::default();
        for v in [0.0, 0.01, 0.5, 1.0, 10.0, 1e6] {
            let out = transform.apply(Vec3::splat(v));
            assert!(out.cmpge(Vec3::ZERO).all() && out.cmple(Vec3::ONE).all(), "{out:?}");
        }
    }
}
