//! Collision primitives used by picking and the collider collaborator
//!
//! Colliders are axis-aligned volumes derived from a renderable's bounds.
//! Rotation is not applied to collider volumes.

use crate::foundation::math::Vec3;
use serde::{Deserialize, Serialize};

slotmap::new_key_type! {
    /// Handle to a collider owned by a [`ColliderBackend`](super::ColliderBackend)
    pub struct ColliderHandle;
}

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Unit cube centered on the origin
    pub fn unit() -> Self {
        Self::from_center_extents(Vec3::zeros(), Vec3::new(0.5, 0.5, 0.5))
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Full size along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Scale around the local origin, keeping min <= max for negative scale
    pub fn scaled(&self, scale: &Vec3) -> Self {
        let a = self.min.component_mul(scale);
        let b = self.max.component_mul(scale);
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Move by `offset`
    pub fn translated(&self, offset: &Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Test ray intersection with this AABB using the slab method.
    ///
    /// Returns the distance to the entry point, or 0 when the origin is inside.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vec3::new(
            if ray.direction.x != 0.0 { 1.0 / ray.direction.x } else { f32::INFINITY },
            if ray.direction.y != 0.0 { 1.0 / ray.direction.y } else { f32::INFINITY },
            if ray.direction.z != 0.0 { 1.0 / ray.direction.z } else { f32::INFINITY },
        );

        let t1 = (self.min.x - ray.origin.x) * inv_dir.x;
        let t2 = (self.max.x - ray.origin.x) * inv_dir.x;
        let t3 = (self.min.y - ray.origin.y) * inv_dir.y;
        let t4 = (self.max.y - ray.origin.y) * inv_dir.y;
        let t5 = (self.min.z - ray.origin.z) * inv_dir.z;
        let t6 = (self.max.z - ray.origin.z) * inv_dir.z;

        // NaN from 0 * inf (origin on a slab plane, direction parallel) is
        // discarded by f32::min/max, which return the non-NaN operand.
        let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
        let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

        if tmax >= tmin && tmax >= 0.0 {
            Some(tmin.max(0.0))
        } else {
            None
        }
    }
}

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a ray cast against a set of colliders
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The collider that was hit
    pub collider: ColliderHandle,
    /// The distance from the ray origin to the hit point
    pub distance: f32,
    /// The point of intersection in world space
    pub point: Vec3,
}

/// Shape of a collider volume built from a renderable's bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColliderKind {
    /// The bounding box itself
    Box,
    /// Sphere around the box center with radius of the largest half extent
    Sphere,
}

/// Which collider an entity operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColliderChannel {
    /// Used while playing (game logic, physics)
    Play,
    /// Used only by editor picking while in edit mode
    Edit,
}

impl ColliderChannel {
    /// Channel that is live in the given mode
    pub fn for_mode(edit_mode: bool) -> Self {
        if edit_mode {
            Self::Edit
        } else {
            Self::Play
        }
    }
}

/// Ray intersection against a sphere
///
/// Returns the closest non-negative distance, or `None` if the ray misses.
pub fn intersect_sphere(center: Vec3, radius: f32, ray: &Ray) -> Option<f32> {
    let oc = ray.origin - center;

    let a = ray.direction.dot(&ray.direction);
    let b = 2.0 * oc.dot(&ray.direction);
    let c = oc.dot(&oc) - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_discriminant = discriminant.sqrt();
    let t1 = (-b - sqrt_discriminant) / (2.0 * a);
    let t2 = (-b + sqrt_discriminant) / (2.0 * a);

    if t1 >= 0.0 {
        Some(t1)
    } else if t2 >= 0.0 {
        // Origin is inside the sphere
        Some(0.0)
    } else {
        None
    }
}
