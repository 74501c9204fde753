//! Math type aliases and helper functions.
//!
//! Rendering math is always `f32` and backed by [`glam`]. On top of the
//! re-exported vector types this module provides cube-map face geometry,
//! rigid [`Pose`]s and axis-aligned bounds.

pub use glam;

/// 2D vector (f32).
pub type Vec2 = glam::Vec2;

/// 3D vector (f32).
pub type Vec3 = glam::Vec3;

/// Integer 3D vector, used for grid cell coordinates.
pub type IVec3 = glam::IVec3;

/// Quaternion (f32).
pub type Quat = glam::Quat;

/// 4x4 matrix (f32).
pub type Mat4 = glam::Mat4;

/// One face of a cube map.
///
/// Faces follow the usual `+X, -X, +Y, -Y, +Z, -Z` layer order. Texel
/// coordinates on a face map to directions with the same convention GPU
/// samplers use, so a map filled here can be uploaded as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    /// All six faces in layer order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Layer index of this face.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            CubeFace::PositiveX => 0,
            CubeFace::NegativeX => 1,
            CubeFace::PositiveY => 2,
            CubeFace::NegativeY => 3,
            CubeFace::PositiveZ => 4,
            CubeFace::NegativeZ => 5,
        }
    }

    /// Face for a layer index, if in range.
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < 6 {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Direction the face looks along.
    pub fn forward(self) -> Vec3 {
        self.direction(0.0, 0.0)
    }

    /// World direction through a point on the face.
    ///
    /// `s` and `t` are face coordinates in `[-1, 1]`; the result is normalized.
    pub fn direction(self, s: f32, t: f32) -> Vec3 {
        let dir = match self {
            CubeFace::PositiveX => Vec3::new(1.0, -t, -s),
            CubeFace::NegativeX => Vec3::new(-1.0, -t, s),
            CubeFace::PositiveY => Vec3::new(s, 1.0, t),
            CubeFace::NegativeY => Vec3::new(s, -1.0, -t),
            CubeFace::PositiveZ => Vec3::new(s, -t, 1.0),
            CubeFace::NegativeZ => Vec3::new(-s, -t, -1.0),
        };
        dir.normalize()
    }

    /// Direction through the center of texel `(x, y)` on a face of `size` texels.
    pub fn texel_direction(self, x: u32, y: u32, size: u32) -> Vec3 {
        let inv = 1.0 / size as f32;
        let s = 2.0 * (x as f32 + 0.5) * inv - 1.0;
        let t = 2.0 * (y as f32 + 0.5) * inv - 1.0;
        self.direction(s, t)
    }
}

/// Project a direction onto the cube.
///
/// Returns the face the direction hits and normalized `(u, v)` coordinates in
/// `[0, 1]` on that face. A zero vector maps to the center of `+X`.
pub fn direction_to_face_uv(dir: Vec3) -> (CubeFace, Vec2) {
    let abs = dir.abs();
    let (face, major, sc, tc) = if abs.x >= abs.y && abs.x >= abs.z {
        if dir.x >= 0.0 {
            (CubeFace::PositiveX, abs.x, -dir.z, -dir.y)
        } else {
            (CubeFace::NegativeX, abs.x, dir.z, -dir.y)
        }
    } else if abs.y >= abs.z {
        if dir.y >= 0.0 {
            (CubeFace::PositiveY, abs.y, dir.x, dir.z)
        } else {
            (CubeFace::NegativeY, abs.y, dir.x, -dir.z)
        }
    } else if dir.z >= 0.0 {
        (CubeFace::PositiveZ, abs.z, dir.x, -dir.y)
    } else {
        (CubeFace::NegativeZ, abs.z, -dir.x, -dir.y)
    };

    if major <= f32::EPSILON {
        return (CubeFace::PositiveX, Vec2::splat(0.5));
    }

    let uv = Vec2::new(sc / major, tc / major) * 0.5 + Vec2::splat(0.5);
    (face, uv)
}

/// Solid angle covered by one texel of a cube face of `size` texels,
/// averaged over the face.
pub fn texel_solid_angle(size: u32) -> f32 {
    4.0 * std::f32::consts::PI / (6.0 * (size as f32) * (size as f32))
}

/// Rigid world transform (translation + rotation) of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Pose at `position` with no rotation.
    pub const fn from_translation(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Returns a copy with the given rotation.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Transform a point from local space into world space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.rotation * local + self.position
    }

    /// Transform a world-space point into this pose's local space.
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }

    /// Returns `true` if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box centered on `center` with the given half-extents.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// World bounds of a local-space box with `half_extents` placed at `pose`.
    pub fn from_oriented_box(pose: &Pose, half_extents: Vec3) -> Self {
        let rot = Mat4::from_quat(pose.rotation);
        let axis_x = rot.x_axis.truncate().abs() * half_extents.x;
        let axis_y = rot.y_axis.truncate().abs() * half_extents.y;
        let axis_z = rot.z_axis.truncate().abs() * half_extents.z;
        Self::from_center_half_extents(pose.position, axis_x + axis_y + axis_z)
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}
