//! The query interface shared by every hierarchy.

use std::fmt::Debug;

use lumen_math::Ray;

use crate::primitive::IntersectionRecord;

/// An immutable ray-query structure over a set of primitives.
///
/// Instances are never mutated after construction; scene changes build a
/// new one. Any number of threads may query the same instance.
pub trait Bvh: Send + Sync + Debug {
    /// Find the closest primitive hit by `ray`.
    ///
    /// `record.distance` is the caller's current best distance and is only
    /// ever decreased. Returns `true` if a closer hit was found.
    fn closest_intersection(&self, ray: &Ray, record: &mut IntersectionRecord) -> bool;

    /// Test whether any primitive is hit closer than `max_distance`.
    ///
    /// Stops at the first hit found, which makes it the cheaper query for
    /// shadow and occlusion rays.
    fn any_intersection(&self, ray: &Ray, max_distance: f64) -> bool;
}

/// The hierarchy of an empty scene. Nothing is ever hit.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyBvh;

impl Bvh for EmptyBvh {
    fn closest_intersection(&self, _ray: &Ray, _record: &mut IntersectionRecord) -> bool {
        false
    }

    fn any_intersection(&self, _ray: &Ray, _max_distance: f64) -> bool {
        false
    }
}
