//! Render graph infrastructure.
//!
//! The render graph describes a camera's frame as passes plus dependencies.
//! Compiling it orders the passes so every pass runs after the passes it
//! depends on; among passes that are ready at the same time, the one added
//! first runs first, which keeps the order stable across frames.
//!
//! # Example
//!
//! ```ignore
//! let mut graph = RenderGraph::new();
//! let geometry = graph.add_pass(Pass::for_stage(RenderStage::Geometry));
//! let lighting = graph.add_pass(Pass::for_stage(RenderStage::Lighting));
//! graph.add_dependency(lighting, geometry);
//!
//! let compiled = graph.compile()?;
//! ```

mod pass;

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use thiserror::Error;

pub use pass::{ComputePass, GraphicsPass, Pass};

/// Handle to a pass in the render graph.
///
/// `PassHandle` is `Copy` and cheap to pass around. It is only valid within
/// the `RenderGraph` that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassHandle(u32);

impl PassHandle {
    fn new(index: u32) -> Self {
        Self(index)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The render graph describes a frame's rendering operations.
#[derive(Debug, Default, Clone)]
pub struct RenderGraph {
    passes: Vec<Pass>,
    /// Dependency edges stored as (dependent, dependency) pairs.
    edges: Vec<(PassHandle, PassHandle)>,
}

impl RenderGraph {
    /// Create a new empty render graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pass to the graph.
    pub fn add_pass(&mut self, pass: Pass) -> PassHandle {
        let index = self.passes.len() as u32;
        self.passes.push(pass);
        PassHandle::new(index)
    }

    /// Add a dependency between passes.
    ///
    /// The `dependent` pass will execute after the `dependency` pass.
    pub fn add_dependency(&mut self, dependent: PassHandle, dependency: PassHandle) {
        assert!(
            dependent.index() < self.passes.len(),
            "Invalid dependent handle"
        );
        assert!(
            dependency.index() < self.passes.len(),
            "Invalid dependency handle"
        );
        assert!(dependent != dependency, "Pass cannot depend on itself");

        // Check for duplicates
        let exists = self
            .edges
            .iter()
            .any(|&(d, dep)| d == dependent && dep == dependency);
        if !exists {
            self.edges.push((dependent, dependency));
        }
    }

    /// Get dependencies of a pass.
    pub fn dependencies(&self, handle: PassHandle) -> impl Iterator<Item = PassHandle> + '_ {
        self.edges
            .iter()
            .filter(move |&&(dependent, _)| dependent == handle)
            .map(|&(_, dependency)| dependency)
    }

    /// Get the number of dependencies for a pass.
    pub fn dependency_count(&self, handle: PassHandle) -> usize {
        self.edges
            .iter()
            .filter(|&&(dependent, _)| dependent == handle)
            .count()
    }

    /// Get a pass by handle.
    pub fn pass(&self, handle: PassHandle) -> Option<&Pass> {
        self.passes.get(handle.index())
    }

    /// Get all passes in the graph.
    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    /// Get the number of passes in the graph.
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Compile the graph for execution (topological sort).
    ///
    /// # Errors
    ///
    /// [`GraphError::CyclicDependency`] if the dependencies form a cycle.
    pub fn compile(&self) -> Result<CompiledGraph, GraphError> {
        let count = self.passes.len();
        let mut in_degree = vec![0usize; count];
        let mut dependents: Vec<Vec<u32>> = vec![Vec::new(); count];
        for &(dependent, dependency) in &self.edges {
            in_degree[dependent.index()] += 1;
            dependents[dependency.index()].push(dependent.0);
        }

        let mut ready: BinaryHeap<Reverse<u32>> = (0..count as u32)
            .filter(|&i| in_degree[i as usize] == 0)
            .map(Reverse)
            .collect();
        let mut pass_order = Vec::with_capacity(count);
        while let Some(Reverse(index)) = ready.pop() {
            pass_order.push(PassHandle::new(index));
            for &next in &dependents[index as usize] {
                let degree = &mut in_degree[next as usize];
                *degree -= 1;
                if *degree == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if pass_order.len() != count {
            return Err(GraphError::CyclicDependency);
        }
        Ok(CompiledGraph { pass_order })
    }

    /// Clear all passes from the graph.
    pub fn clear(&mut self) {
        self.passes.clear();
        self.edges.clear();
    }
}

/// A compiled render graph ready for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledGraph {
    /// Pass execution order as handles.
    pass_order: Vec<PassHandle>,
}

impl CompiledGraph {
    /// Get the pass execution order as handles.
    pub fn pass_order(&self) -> &[PassHandle] {
        &self.pass_order
    }
}

/// Errors that can occur during graph construction or compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The graph contains a cycle.
    #[error("render graph contains cyclic dependency")]
    CyclicDependency,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::RenderStage;

    fn names(graph: &RenderGraph, compiled: &CompiledGraph) -> Vec<String> {
        compiled
            .pass_order()
            .iter()
            .map(|&h| graph.pass(h).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_add_pass() {
        let mut graph = RenderGraph::new();
        let handle = graph.add_pass(Pass::for_stage(RenderStage::Geometry));
        assert_eq!(graph.pass_count(), 1);
        assert_eq!(graph.pass(handle).unwrap().stage(), RenderStage::Geometry);
        assert!(graph.passes()[0].is_graphics());
    }

    #[test]
    fn test_compute_stage_gets_compute_pass() {
        let pass = Pass::for_stage(RenderStage::AmbientOcclusion);
        assert!(pass.is_compute());
        assert!(pass.as_graphics().is_none());
        assert_eq!(pass.as_compute().unwrap().stage(), RenderStage::AmbientOcclusion);
    }

    #[test]
    fn test_clear() {
        let mut graph = RenderGraph::new();
        graph.add_pass(Pass::for_stage(RenderStage::Geometry));
        graph.clear();
        assert_eq!(graph.pass_count(), 0);
    }

    #[test]
    fn test_add_dependency() {
        let mut graph = RenderGraph::new();
        let pass1 = graph.add_pass(Pass::for_stage(RenderStage::Geometry));
        let pass2 = graph.add_pass(Pass::for_stage(RenderStage::Lighting));

        graph.add_dependency(pass2, pass1);
        graph.add_dependency(pass2, pass1);

        assert_eq!(graph.dependency_count(pass2), 1);
        assert_eq!(graph.dependencies(pass2).next(), Some(pass1));
    }

    #[test]
    #[should_panic(expected = "Pass cannot depend on itself")]
    fn test_self_dependency_panics() {
        let mut graph = RenderGraph::new();
        let pass = graph.add_pass(Pass::for_stage(RenderStage::Geometry));
        graph.add_dependency(pass, pass);
    }

    #[test]
    fn test_compile_orders_dependencies_first() {
        let mut graph = RenderGraph::new();
        let overlay = graph.add_pass(Pass::for_stage(RenderStage::Overlay));
        let lighting = graph.add_pass(Pass::for_stage(RenderStage::Lighting));
        let geometry = graph.add_pass(Pass::for_stage(RenderStage::Geometry));
        graph.add_dependency(overlay, lighting);
        graph.add_dependency(lighting, geometry);

        let compiled = graph.compile().unwrap();
        assert_eq!(names(&graph, &compiled), ["Geometry", "Lighting", "Overlay"]);
    }

    #[test]
    fn test_compile_independent_passes_keep_insertion_order() {
        let mut graph = RenderGraph::new();
        graph.add_pass(Pass::for_stage(RenderStage::Shadows));
        graph.add_pass(Pass::for_stage(RenderStage::Geometry));
        graph.add_pass(Pass::for_stage(RenderStage::Fxaa));

        let compiled = graph.compile().unwrap();
        assert_eq!(names(&graph, &compiled), ["Shadows", "Geometry", "FXAA"]);
    }

    #[test]
    fn test_compile_detects_cycle() {
        let mut graph = RenderGraph::new();
        let a = graph.add_pass(Pass::for_stage(RenderStage::Geometry));
        let b = graph.add_pass(Pass::for_stage(RenderStage::Lighting));
        let c = graph.add_pass(Pass::for_stage(RenderStage::Overlay));
        graph.add_dependency(b, a);
        graph.add_dependency(c, b);
        graph.add_dependency(a, c);

        assert_eq!(graph.compile(), Err(GraphError::CyclicDependency));
    }
}
