//! Scene description data types.
//!
//! A [`Scene`] is a flat list of analytic [`Surface`]s, directional lights and
//! a uniform sky. It is the read-only state a probe capture sees.

use crate::math::Vec3;

/// Offset applied along the normal before tracing shadow rays.
const SHADOW_BIAS: f32 = 1e-3;

/// Surface response to light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Diffuse reflectance (linear RGB).
    pub albedo: Vec3,
    /// Emitted radiance (linear RGB, unbounded).
    pub emissive: Vec3,
}

impl Material {
    /// Light-grey diffuse material, no emission.
    pub const DEFAULT: Self = Self {
        albedo: Vec3::splat(0.8),
        emissive: Vec3::ZERO,
    };

    /// Pure emitter: no diffuse response.
    pub const fn emissive(radiance: Vec3) -> Self {
        Self {
            albedo: Vec3::ZERO,
            emissive: radiance,
        }
    }

    /// Pure diffuse surface.
    pub const fn diffuse(albedo: Vec3) -> Self {
        Self {
            albedo,
            emissive: Vec3::ZERO,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Analytic shape of a surface, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere { center: Vec3, radius: f32 },
    /// Axis-aligned box.
    Box { center: Vec3, half_extents: Vec3 },
    /// Infinite plane through `point`.
    Plane { point: Vec3, normal: Vec3 },
}

impl Shape {
    /// Distance along `ray` to the nearest intersection inside `[t_min, t_max]`.
    pub fn intersect(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<f32> {
        let t = match *self {
            Shape::Sphere { center, radius } => {
                let oc = ray.origin - center;
                let b = oc.dot(ray.direction);
                let c = oc.length_squared() - radius * radius;
                let disc = b * b - c;
                if disc < 0.0 {
                    return None;
                }
                let sq = disc.sqrt();
                let near = -b - sq;
                if near >= t_min { near } else { -b + sq }
            }
            Shape::Box {
                center,
                half_extents,
            } => {
                let inv = ray.direction.recip();
                let t0 = (center - half_extents - ray.origin) * inv;
                let t1 = (center + half_extents - ray.origin) * inv;
                let near = t0.min(t1).max_element();
                let far = t0.max(t1).min_element();
                if near > far {
                    return None;
                }
                if near >= t_min { near } else { far }
            }
            Shape::Plane { point, normal } => {
                let denom = normal.dot(ray.direction);
                if denom.abs() < 1e-6 {
                    return None;
                }
                (point - ray.origin).dot(normal) / denom
            }
        };
        (t.is_finite() && t >= t_min && t <= t_max).then_some(t)
    }

    /// Outward normal at a point on the surface.
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        match *self {
            Shape::Sphere { center, .. } => (point - center).normalize_or_zero(),
            Shape::Box {
                center,
                half_extents,
            } => {
                let local = (point - center) / half_extents.max(Vec3::splat(f32::EPSILON));
                let abs = local.abs();
                if abs.x >= abs.y && abs.x >= abs.z {
                    Vec3::new(local.x.signum(), 0.0, 0.0)
                } else if abs.y >= abs.z {
                    Vec3::new(0.0, local.y.signum(), 0.0)
                } else {
                    Vec3::new(0.0, 0.0, local.z.signum())
                }
            }
            Shape::Plane { normal, .. } => normal.normalize_or_zero(),
        }
    }
}

/// A shape with a material.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    /// Surface name, if any.
    pub name: Option<String>,
    pub shape: Shape,
    pub material: Material,
}

impl Surface {
    pub fn new(shape: Shape, material: Material) -> Self {
        Self {
            name: None,
            shape,
            material,
        }
    }

    /// Set the surface name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Light arriving from infinitely far away along `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels (from the light toward the scene).
    pub direction: Vec3,
    /// Irradiance on a surface facing the light.
    pub color: Vec3,
}

/// Half-line used for tracing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Nearest intersection found by [`Scene::trace`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub distance: f32,
    pub position: Vec3,
    /// Normal facing against the incoming ray.
    pub normal: Vec3,
    /// Index into [`Scene::surfaces`].
    pub surface: usize,
}

/// Renderable scene state.
///
/// Surfaces are shaded with a single bounce: emission plus diffuse response
/// to the sky (as ambient) and to unshadowed directional lights. Rays that
/// escape return the sky radiance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    /// All surfaces in the scene.
    pub surfaces: Vec<Surface>,
    /// Directional lights.
    pub lights: Vec<DirectionalLight>,
    /// Uniform radiance of the environment seen by escaping rays.
    pub sky: Vec3,
}

impl Scene {
    /// Creates an empty scene with a black sky.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sky radiance.
    #[must_use]
    pub fn with_sky(mut self, sky: Vec3) -> Self {
        self.sky = sky;
        self
    }

    /// Add a surface.
    #[must_use]
    pub fn with_surface(mut self, surface: Surface) -> Self {
        self.surfaces.push(surface);
        self
    }

    /// Add a directional light.
    #[must_use]
    pub fn with_light(mut self, light: DirectionalLight) -> Self {
        self.lights.push(light);
        self
    }

    /// Find the nearest surface hit along `ray` within `[t_min, t_max]`.
    pub fn trace(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<Hit> {
        let mut closest: Option<(usize, f32)> = None;
        for (index, surface) in self.surfaces.iter().enumerate() {
            let limit = closest.map_or(t_max, |(_, t)| t);
            if let Some(t) = surface.shape.intersect(ray, t_min, limit) {
                closest = Some((index, t));
            }
        }

        closest.map(|(surface, distance)| {
            let position = ray.at(distance);
            let mut normal = self.surfaces[surface].shape.normal_at(position);
            if normal.dot(ray.direction) > 0.0 {
                normal = -normal;
            }
            Hit {
                distance,
                position,
                normal,
                surface,
            }
        })
    }

    /// Radiance arriving at `ray.origin` from direction `ray.direction`.
    pub fn radiance(&self, ray: &Ray, t_min: f32, t_max: f32) -> Vec3 {
        let Some(hit) = self.trace(ray, t_min, t_max) else {
            return self.sky;
        };

        let material = self.surfaces[hit.surface].material;
        if material.albedo == Vec3::ZERO {
            return material.emissive;
        }

        let mut irradiance = self.sky;
        let shadow_origin = hit.position + hit.normal * SHADOW_BIAS;
        for light in &self.lights {
            let to_light = -light.direction.normalize_or_zero();
            let n_dot_l = hit.normal.dot(to_light);
            if n_dot_l <= 0.0 {
                continue;
            }
            let shadow_ray = Ray::new(shadow_origin, to_light);
            if self.trace(&shadow_ray, 0.0, f32::INFINITY).is_none() {
                irradiance += light.color * n_dot_l;
            }
        }

        material.emissive + material.albedo * irradiance
    }
}
