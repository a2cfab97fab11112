#![warn(missing_docs)]

//! Math types for the lumen ray tracer.
//!
//! Thin wrappers around nalgebra providing the handful of types the
//! acceleration structures need: points, vectors, directions, axis-aligned
//! boxes and rays.

mod aabb;
mod ray;

pub use aabb::{Aabb, Axis};
pub use ray::{slab_interval, Ray};

use nalgebra::{Unit, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// Slack added to the far slab distance when testing bounding boxes, so rays
/// grazing a box edge are not rejected because of rounding.
pub const OFFSET: f64 = 0.0001;

/// Small distance used by primitive intersection tests.
pub const EPSILON: f64 = 0.000005;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir3_is_normalized() {
        let d = Dir3::new_normalize(Vec3::new(3.0, 0.0, 4.0));
        assert!((d.norm() - 1.0).abs() < 1e-12);
        assert!((d.x - 0.6).abs() < 1e-12);
    }
}
