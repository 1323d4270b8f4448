//! Collider collaborator
//!
//! The scene core never owns collision geometry itself; it drives a
//! [`ColliderBackend`] through narrow calls. [`SimpleColliderBackend`] is the
//! in-process implementation used by headless editing and tests.

pub mod collision;

pub use collision::{Aabb, ColliderChannel, ColliderHandle, ColliderKind, Ray, RayHit};

use slotmap::SlotMap;

/// Collider collaborator consumed by the scene core
pub trait ColliderBackend {
    /// Create a collider of `kind` covering the world-space `bounds`
    fn create_collider(&mut self, kind: ColliderKind, bounds: Aabb) -> ColliderHandle;

    /// Move or resize an existing collider after a transform change
    fn update_bounds(&mut self, handle: ColliderHandle, bounds: Aabb);

    /// Make the collider eligible for ray casts
    fn enable(&mut self, handle: ColliderHandle);

    /// Exclude the collider from ray casts without freeing it
    fn disable(&mut self, handle: ColliderHandle);

    /// Free the collider
    fn destroy_collider(&mut self, handle: ColliderHandle);

    /// Nearest enabled hit among `candidates`.
    ///
    /// Ties on distance resolve to the candidate that appears first in the slice.
    fn raycast(&self, ray: &Ray, candidates: &[ColliderHandle]) -> Option<RayHit>;
}

#[derive(Debug, Clone)]
struct SimpleCollider {
    kind: ColliderKind,
    bounds: Aabb,
    enabled: bool,
}

impl SimpleCollider {
    fn intersect(&self, ray: &Ray) -> Option<f32> {
        match self.kind {
            ColliderKind::Box => self.bounds.intersect_ray(ray),
            ColliderKind::Sphere => {
                let extents = self.bounds.extents();
                let radius = extents.x.max(extents.y).max(extents.z);
                collision::intersect_sphere(self.bounds.center(), radius, ray)
            }
        }
    }
}

/// Linear-scan collider store (no spatial optimization)
///
/// Sufficient for editor scenes; a broad-phase structure can replace it
/// without changing the trait.
#[derive(Debug, Default)]
pub struct SimpleColliderBackend {
    colliders: SlotMap<ColliderHandle, SimpleCollider>,
}

impl SimpleColliderBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live colliders
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// Whether no colliders are alive
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Whether the collider exists and is enabled
    pub fn is_enabled(&self, handle: ColliderHandle) -> bool {
        self.colliders.get(handle).is_some_and(|c| c.enabled)
    }

    /// Current bounds of a live collider
    pub fn bounds(&self, handle: ColliderHandle) -> Option<Aabb> {
        self.colliders.get(handle).map(|c| c.bounds)
    }
}

impl ColliderBackend for SimpleColliderBackend {
    fn create_collider(&mut self, kind: ColliderKind, bounds: Aabb) -> ColliderHandle {
        self.colliders.insert(SimpleCollider {
            kind,
            bounds,
            enabled: true,
        })
    }

    fn update_bounds(&mut self, handle: ColliderHandle, bounds: Aabb) {
        if let Some(collider) = self.colliders.get_mut(handle) {
            collider.bounds = bounds;
        }
    }

    fn enable(&mut self, handle: ColliderHandle) {
        if let Some(collider) = self.colliders.get_mut(handle) {
            collider.enabled = true;
        }
    }

    fn disable(&mut self, handle: ColliderHandle) {
        if let Some(collider) = self.colliders.get_mut(handle) {
            collider.enabled = false;
        }
    }

    fn destroy_collider(&mut self, handle: ColliderHandle) {
        self.colliders.remove(handle);
    }

    fn raycast(&self, ray: &Ray, candidates: &[ColliderHandle]) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        for &handle in candidates {
            let Some(collider) = self.colliders.get(handle) else {
                continue;
            };
            if !collider.enabled {
                continue;
            }
            let Some(distance) = collider.intersect(ray) else {
                continue;
            };
            // Strict comparison keeps the earliest candidate on ties
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(RayHit {
                    collider: handle,
                    distance,
                    point: ray.point_at(distance),
                });
            }
        }
        best
    }
}
