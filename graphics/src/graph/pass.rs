//! Render pass types.

use crate::stages::RenderStage;

/// A pass in the render graph.
///
/// Each variant has its own configuration specific to that pass type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pass {
    /// Graphics pass (rasterization into the camera's targets).
    Graphics(GraphicsPass),
    /// Compute pass (full-screen compute work).
    Compute(ComputePass),
}

impl Pass {
    /// Create the pass that runs `stage`, with the pass type the stage needs.
    pub fn for_stage(stage: RenderStage) -> Self {
        let name = stage.name().to_string();
        if stage.is_compute() {
            Pass::Compute(ComputePass::new(name, stage))
        } else {
            Pass::Graphics(GraphicsPass::new(name, stage))
        }
    }

    /// Get the pass name.
    pub fn name(&self) -> &str {
        match self {
            Pass::Graphics(p) => p.name(),
            Pass::Compute(p) => p.name(),
        }
    }

    /// Stage this pass executes.
    pub fn stage(&self) -> RenderStage {
        match self {
            Pass::Graphics(p) => p.stage(),
            Pass::Compute(p) => p.stage(),
        }
    }

    /// Get this pass as a graphics pass, if it is one.
    pub fn as_graphics(&self) -> Option<&GraphicsPass> {
        if let Pass::Graphics(p) = self {
            Some(p)
        } else {
            None
        }
    }

    /// Get this pass as a compute pass, if it is one.
    pub fn as_compute(&self) -> Option<&ComputePass> {
        if let Pass::Compute(p) = self {
            Some(p)
        } else {
            None
        }
    }

    /// Check if this is a graphics pass.
    pub fn is_graphics(&self) -> bool {
        matches!(self, Pass::Graphics(_))
    }

    /// Check if this is a compute pass.
    pub fn is_compute(&self) -> bool {
        matches!(self, Pass::Compute(_))
    }
}

/// A rasterization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicsPass {
    name: String,
    stage: RenderStage,
}

impl GraphicsPass {
    pub fn new(name: String, stage: RenderStage) -> Self {
        Self { name, stage }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage(&self) -> RenderStage {
        self.stage
    }
}

/// A compute pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputePass {
    name: String,
    stage: RenderStage,
}

impl ComputePass {
    pub fn new(name: String, stage: RenderStage) -> Self {
        Self { name, stage }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage(&self) -> RenderStage {
        self.stage
    }
}
