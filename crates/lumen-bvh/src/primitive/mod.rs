//! The primitive contract the hierarchy is built over.
//!
//! Primitives are owned by the scene; the hierarchy only keeps shared
//! [`PrimitiveRef`] handles to them.

mod cuboid;
mod sphere;

pub use cuboid::Cuboid;
pub use sphere::Sphere;

use std::fmt::Debug;
use std::sync::Arc;

use lumen_math::{Aabb, Ray, Vec3};

/// Shared handle to a primitive.
pub type PrimitiveRef = Arc<dyn Primitive>;

/// Result of a closest-hit query.
///
/// `distance` holds the best distance found so far. Queries only ever
/// decrease it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionRecord {
    /// Distance along the ray to the closest hit.
    pub distance: f64,
    /// Surface normal at the closest hit.
    pub normal: Vec3,
}

impl IntersectionRecord {
    /// A fresh record with no distance limit.
    pub fn new() -> Self {
        Self::with_distance(f64::INFINITY)
    }

    /// A record that only accepts hits closer than `distance`.
    pub fn with_distance(distance: f64) -> Self {
        Self {
            distance,
            normal: Vec3::zeros(),
        }
    }
}

impl Default for IntersectionRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// A piece of geometry that can be bounded and hit by a ray.
///
/// Implementations must be safe to query from many threads at once.
pub trait Primitive: Send + Sync + Debug {
    /// Bounding box of the primitive.
    fn bounds(&self) -> Aabb;

    /// Test the ray against this primitive.
    ///
    /// Returns `true` and updates `record` only when the hit is strictly
    /// closer than `record.distance`.
    fn closest_intersection(&self, ray: &Ray, record: &mut IntersectionRecord) -> bool;
}

/// Scene entity that can be flattened into primitives.
pub trait HasPrimitives {
    /// Primitives of this entity, translated by `world_offset` into the
    /// hierarchy's coordinate frame.
    fn primitives(&self, world_offset: &Vec3) -> Vec<PrimitiveRef>;
}

impl<T: HasPrimitives + ?Sized> HasPrimitives for Arc<T> {
    fn primitives(&self, world_offset: &Vec3) -> Vec<PrimitiveRef> {
        (**self).primitives(world_offset)
    }
}

impl<T: HasPrimitives + ?Sized> HasPrimitives for Box<T> {
    fn primitives(&self, world_offset: &Vec3) -> Vec<PrimitiveRef> {
        (**self).primitives(world_offset)
    }
}
