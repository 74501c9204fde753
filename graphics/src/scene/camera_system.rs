//! Camera system for managing per-camera render settings and frame plans.
//!
//! Each [`Camera`] owns one [`SharedRenderSettings`] bundle that its
//! controller may edit at any time. When a frame begins the system takes a
//! snapshot of every bundle and builds the camera's [`FramePlan`] from it, so
//! edits made while the frame is in progress only show up in the next one.
//!
//! # Priority Ordering
//!
//! Cameras are rendered in priority order (lower first):
//! 1. Texture-target cameras (negative priorities recommended)
//! 2. Surface-target cameras (zero/positive priorities)
//!
//! This ensures render-to-texture cameras complete before surface cameras
//! that might sample from those textures.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use glam::Vec3;

use crate::graph::GraphError;
use crate::settings::{RenderSettings, SharedRenderSettings};
use crate::stages::FramePlan;

/// Identifier of a camera within its [`CameraSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CameraId(u64);

impl CameraId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "camera#{}", self.0)
    }
}

/// A view into the scene with its own render settings.
#[derive(Debug)]
pub struct Camera {
    id: CameraId,
    /// World position, used for probe influence at the eye.
    pub position: Vec3,
    /// Rendering priority (lower = renders first).
    pub priority: i32,
    /// Whether this renders to a texture (vs surface).
    pub is_texture_target: bool,
    settings: Arc<SharedRenderSettings>,
}

impl Camera {
    pub fn id(&self) -> CameraId {
        self.id
    }

    /// The camera's settings bundle. Clone the `Arc` to hand it to a
    /// controller on another thread.
    pub fn settings(&self) -> &Arc<SharedRenderSettings> {
        &self.settings
    }
}

/// Camera data captured when a frame begins.
#[derive(Debug, Clone)]
pub struct ExtractedCamera {
    pub id: CameraId,
    pub position: Vec3,
    pub priority: i32,
    pub is_texture_target: bool,
    /// Stages and output transform built from the settings snapshot.
    pub plan: FramePlan,
}

/// CameraSystem owns the cameras and turns them into per-frame plans.
///
/// # Lifecycle
///
/// ```ignore
/// let id = cameras.add_camera(RenderSettings::default());
/// let settings = Arc::clone(cameras.get(id).unwrap().settings());
///
/// // Any thread:
/// settings.update(|s| s.enable_fxaa = false);
///
/// // Render thread, once per frame:
/// let extracted = cameras.extract()?;
/// ```
#[derive(Debug, Default)]
pub struct CameraSystem {
    cameras: Vec<Camera>,
    next_id: u64,
    frame_count: u64,
}

impl CameraSystem {
    /// Creates a new camera system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera with `settings`. Returns its id.
    pub fn add_camera(&mut self, settings: RenderSettings) -> CameraId {
        self.next_id += 1;
        let id = CameraId(self.next_id);
        self.cameras.push(Camera {
            id,
            position: Vec3::ZERO,
            priority: 0,
            is_texture_target: false,
            settings: Arc::new(SharedRenderSettings::new(settings)),
        });
        log::trace!("Added {}", id);
        id
    }

    /// Destroy a camera and its settings bundle. Returns false if unknown.
    pub fn remove_camera(&mut self, id: CameraId) -> bool {
        let before = self.cameras.len();
        self.cameras.retain(|c| c.id != id);
        before != self.cameras.len()
    }

    pub fn get(&self, id: CameraId) -> Option<&Camera> {
        self.cameras.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: CameraId) -> Option<&mut Camera> {
        self.cameras.iter_mut().find(|c| c.id == id)
    }

    /// Returns the number of cameras.
    #[inline]
    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    /// Returns true if there are no cameras.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// Cameras in creation order.
    pub fn cameras(&self) -> impl Iterator<Item = &Camera> {
        self.cameras.iter()
    }

    /// Snapshot every camera's settings and build its frame plan.
    ///
    /// The result is in render order: texture targets first, then by
    /// priority. Cameras with equal keys keep creation order.
    pub fn extract(&mut self) -> Result<Vec<ExtractedCamera>, GraphError> {
        let mut extracted = self
            .cameras
            .iter()
            .map(|camera| {
                let snapshot = camera.settings.snapshot();
                let plan = FramePlan::build(&snapshot).inspect_err(|e| {
                    log::error!("Failed to build {} frame plan: {}", camera.id, e);
                })?;
                Ok(ExtractedCamera {
                    id: camera.id,
                    position: camera.position,
                    priority: camera.priority,
                    is_texture_target: camera.is_texture_target,
                    plan,
                })
            })
            .collect::<Result<Vec<_>, GraphError>>()?;

        extracted.sort_by(|a, b| {
            match (a.is_texture_target, b.is_texture_target) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => a.priority.cmp(&b.priority),
            }
        });

        self.frame_count = self.frame_count.wrapping_add(1);
        log::trace!(
            "Extracted {} cameras with {} total passes",
            extracted.len(),
            extracted
                .iter()
                .map(|c| c.plan.stages().len())
                .sum::<usize>()
        );
        Ok(extracted)
    }

    /// Number of frames extracted so far.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
