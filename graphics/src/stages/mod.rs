//! Per-frame stage selection.
//!
//! [`FramePlan::build`] turns a settings snapshot into the list of stages a
//! camera runs this frame. All dependency rules between settings are applied
//! here:
//!
//! - Overlay-only views run nothing but the overlay: no shadows, ambient
//!   occlusion, depth of field or screen-space reflections (nor any other
//!   scene stage).
//! - Shadows, ambient occlusion, indirect lighting and screen-space
//!   reflections need lighting.
//! - Auto exposure, tonemapping, white balance and color grading need HDR;
//!   white balance and color grading also need tonemapping.
//! - Without tonemapping, gamma correction runs with the exact settings gamma.
//!
//! The selected stages are compiled into a [`RenderGraph`] so the pass order
//! follows the data each stage reads.

mod color;
mod output;

use std::fmt;

pub use color::{color_grade, encode_gamma, linear_to_srgb, tonemap_filmic, white_balance};
pub use output::{OutputCurve, OutputTransform};

use crate::graph::{CompiledGraph, GraphError, Pass, PassHandle, RenderGraph};
use crate::settings::{RenderSettings, SettingsSnapshot};

/// A stage of a camera's frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderStage {
    Shadows,
    Geometry,
    AmbientOcclusion,
    Lighting,
    IndirectLighting,
    ScreenSpaceReflections,
    DepthOfField,
    AutoExposure,
    WhiteBalance,
    ColorGrading,
    Tonemapping,
    GammaCorrection,
    Fxaa,
    Overlay,
}

impl RenderStage {
    /// Every stage, in execution order.
    pub const ALL: [RenderStage; 14] = [
        RenderStage::Shadows,
        RenderStage::Geometry,
        RenderStage::AmbientOcclusion,
        RenderStage::Lighting,
        RenderStage::IndirectLighting,
        RenderStage::ScreenSpaceReflections,
        RenderStage::DepthOfField,
        RenderStage::AutoExposure,
        RenderStage::WhiteBalance,
        RenderStage::ColorGrading,
        RenderStage::Tonemapping,
        RenderStage::GammaCorrection,
        RenderStage::Fxaa,
        RenderStage::Overlay,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Shadows => "Shadows",
            Self::Geometry => "Geometry",
            Self::AmbientOcclusion => "AmbientOcclusion",
            Self::Lighting => "Lighting",
            Self::IndirectLighting => "IndirectLighting",
            Self::ScreenSpaceReflections => "ScreenSpaceReflections",
            Self::DepthOfField => "DepthOfField",
            Self::AutoExposure => "AutoExposure",
            Self::WhiteBalance => "WhiteBalance",
            Self::ColorGrading => "ColorGrading",
            Self::Tonemapping => "Tonemapping",
            Self::GammaCorrection => "GammaCorrection",
            Self::Fxaa => "FXAA",
            Self::Overlay => "Overlay",
        }
    }

    /// Whether the stage runs as a compute pass.
    pub fn is_compute(self) -> bool {
        matches!(
            self,
            Self::AmbientOcclusion | Self::ScreenSpaceReflections | Self::AutoExposure
        )
    }

    /// Whether the stage needs the scene depth buffer.
    pub fn needs_depth(self) -> bool {
        matches!(
            self,
            Self::Shadows
                | Self::Geometry
                | Self::AmbientOcclusion
                | Self::ScreenSpaceReflections
                | Self::DepthOfField
        )
    }

    /// Whether the stage writes the camera's color target.
    fn writes_color(self) -> bool {
        !matches!(
            self,
            Self::Shadows | Self::AmbientOcclusion | Self::AutoExposure
        )
    }

    /// Whether the stage reads the color written by earlier stages.
    fn reads_color(self) -> bool {
        !matches!(
            self,
            Self::Shadows | Self::Geometry | Self::AmbientOcclusion
        )
    }

    /// Non-color outputs of other stages this stage reads.
    fn extra_inputs(self) -> &'static [RenderStage] {
        match self {
            Self::AmbientOcclusion => &[Self::Geometry],
            Self::Lighting => &[Self::Shadows, Self::AmbientOcclusion],
            Self::IndirectLighting => &[Self::AmbientOcclusion],
            Self::Tonemapping | Self::GammaCorrection => &[Self::AutoExposure],
            _ => &[],
        }
    }

    /// Whether `settings` enable this stage, with every dependency rule applied.
    pub fn is_enabled(self, settings: &RenderSettings) -> bool {
        if settings.overlay_only {
            return self == Self::Overlay;
        }
        let lit = settings.enable_lighting;
        let hdr = settings.enable_hdr;
        let tonemapped = hdr && settings.enable_tonemapping;
        match self {
            Self::Shadows => lit && settings.enable_shadows,
            Self::Geometry => true,
            Self::AmbientOcclusion => lit && settings.ambient_occlusion.enabled,
            Self::Lighting => lit,
            Self::IndirectLighting => lit && settings.enable_indirect_lighting,
            Self::ScreenSpaceReflections => lit && settings.screen_space_reflections.enabled,
            Self::DepthOfField => settings.depth_of_field.enabled,
            Self::AutoExposure => hdr && settings.enable_auto_exposure,
            Self::WhiteBalance => tonemapped && settings.white_balance.enabled,
            Self::ColorGrading => tonemapped && settings.color_grading.enabled,
            Self::Tonemapping => tonemapped,
            Self::GammaCorrection => !tonemapped,
            Self::Fxaa => settings.enable_fxaa,
            Self::Overlay => true,
        }
    }
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What one camera renders this frame.
#[derive(Debug, Clone)]
pub struct FramePlan {
    settings: SettingsSnapshot,
    stages: Vec<RenderStage>,
    graph: RenderGraph,
    compiled: CompiledGraph,
    output: OutputTransform,
}

impl FramePlan {
    /// Select and order the stages for `settings`.
    pub fn build(settings: &SettingsSnapshot) -> Result<Self, GraphError> {
        let mut graph = RenderGraph::new();
        let mut added: Vec<(RenderStage, PassHandle)> = Vec::new();
        let mut last_color: Option<PassHandle> = None;

        for stage in RenderStage::ALL {
            if !stage.is_enabled(settings) {
                continue;
            }
            let handle = graph.add_pass(Pass::for_stage(stage));
            if stage.reads_color()
                && let Some(color) = last_color
            {
                graph.add_dependency(handle, color);
            }
            for input in stage.extra_inputs() {
                if let Some(&(_, dependency)) = added.iter().find(|(s, _)| s == input) {
                    graph.add_dependency(handle, dependency);
                }
            }
            if stage.writes_color() {
                last_color = Some(handle);
            }
            added.push((stage, handle));
        }

        let compiled = graph.compile()?;
        let stages: Vec<RenderStage> = compiled
            .pass_order()
            .iter()
            .filter_map(|&handle| graph.pass(handle).map(Pass::stage))
            .collect();

        log::trace!(
            "Frame plan for settings v{}: {:?}",
            settings.version(),
            stages
        );
        Ok(Self {
            settings: settings.clone(),
            stages,
            graph,
            compiled,
            output: OutputTransform::from_settings(settings),
        })
    }

    /// Stages in execution order.
    pub fn stages(&self) -> &[RenderStage] {
        &self.stages
    }

    pub fn contains(&self, stage: RenderStage) -> bool {
        self.stages.contains(&stage)
    }

    /// Whether any selected stage needs a depth buffer.
    pub fn needs_depth(&self) -> bool {
        self.stages.iter().any(|s| s.needs_depth())
    }

    pub fn graph(&self) -> &RenderGraph {
        &self.graph
    }

    pub fn compiled(&self) -> &CompiledGraph {
        &self.compiled
    }

    pub fn output(&self) -> &OutputTransform {
        &self.output
    }

    /// Settings snapshot the plan was built from.
    pub fn settings(&self) -> &SettingsSnapshot {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SharedRenderSettings;

    fn plan(edit: impl FnOnce(&mut RenderSettings)) -> FramePlan {
        let shared = SharedRenderSettings::default();
        shared.update(edit);
        FramePlan::build(&shared.snapshot()).unwrap()
    }

    #[test]
    fn test_default_plan() {
        let plan = plan(|_| {});
        assert_eq!(
            plan.stages(),
            [
                RenderStage::Shadows,
                RenderStage::Geometry,
                RenderStage::AmbientOcclusion,
                RenderStage::Lighting,
                RenderStage::IndirectLighting,
                RenderStage::ScreenSpaceReflections,
                RenderStage::AutoExposure,
                RenderStage::WhiteBalance,
                RenderStage::ColorGrading,
                RenderStage::Tonemapping,
                RenderStage::Fxaa,
                RenderStage::Overlay,
            ]
        );
        assert!(plan.needs_depth());
        assert_eq!(plan.graph().pass_count(), plan.stages().len());
    }

    #[test]
    fn test_tonemapping_off_skips_white_balance_and_grading() {
        let plan = plan(|s| {
            s.enable_tonemapping = false;
            s.white_balance.enabled = true;
            s.color_grading.enabled = true;
        });
        assert!(!plan.contains(RenderStage::WhiteBalance));
        assert!(!plan.contains(RenderStage::ColorGrading));
        assert!(!plan.contains(RenderStage::Tonemapping));
        assert!(plan.contains(RenderStage::GammaCorrection));
    }

    #[test]
    fn test_overlay_only() {
        let plan = plan(|s| {
            s.overlay_only = true;
            s.depth_of_field.enabled = true;
        });
        assert_eq!(plan.stages(), [RenderStage::Overlay]);
        assert!(!plan.needs_depth());
    }

    #[test]
    fn test_lighting_off_skips_lighting_stages() {
        let plan = plan(|s| s.enable_lighting = false);
        for stage in [
            RenderStage::Shadows,
            RenderStage::AmbientOcclusion,
            RenderStage::Lighting,
            RenderStage::IndirectLighting,
            RenderStage::ScreenSpaceReflections,
        ] {
            assert!(!plan.contains(stage), "{stage} should be skipped");
        }
        assert!(plan.contains(RenderStage::Geometry));
    }

    #[test]
    fn test_ldr_uses_gamma_correction() {
        let plan = plan(|s| s.enable_hdr = false);
        assert!(!plan.contains(RenderStage::AutoExposure));
        assert!(!plan.contains(RenderStage::Tonemapping));
        assert!(plan.contains(RenderStage::GammaCorrection));
        assert_eq!(plan.output().curve, OutputCurve::Gamma(2.2));
    }

    #[test]
    fn test_gamma_correction_follows_auto_exposure() {
        let plan = plan(|s| {
            s.enable_tonemapping = false;
            s.depth_of_field.enabled = true;
        });
        let position = |stage| plan.stages().iter().position(|&s| s == stage).unwrap();
        assert!(position(RenderStage::AutoExposure) < position(RenderStage::GammaCorrection));
        assert!(position(RenderStage::DepthOfField) < position(RenderStage::AutoExposure));
    }

    #[test]
    fn test_plan_keeps_snapshot_version() {
        let shared = SharedRenderSettings::default();
        let snapshot = shared.snapshot();
        shared.update(|s| s.overlay_only = true);

        let plan = FramePlan::build(&snapshot).unwrap();
        assert_eq!(plan.settings().version(), 0);
        assert!(plan.contains(RenderStage::Geometry));
    }
}
