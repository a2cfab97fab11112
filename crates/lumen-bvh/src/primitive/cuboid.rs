//! Solid axis-aligned box primitive.

use lumen_math::{Aabb, Axis, Ray, Vec3, EPSILON};

use super::{IntersectionRecord, Primitive};

/// A solid axis-aligned box.
///
/// Rays starting inside the box do not hit it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cuboid {
    bounds: Aabb,
}

impl Cuboid {
    /// Create a box primitive occupying `bounds`.
    pub fn new(bounds: Aabb) -> Self {
        Self { bounds }
    }
}

impl Primitive for Cuboid {
    fn bounds(&self) -> Aabb {
        self.bounds
    }

    fn closest_intersection(&self, ray: &Ray, record: &mut IntersectionRecord) -> bool {
        let inv = ray.inv_direction();
        let mut t_near = f64::NEG_INFINITY;
        let mut t_far = f64::INFINITY;
        let mut normal = Vec3::zeros();

        for axis in Axis::ALL {
            let i = axis.index();
            let o = ray.origin[i];
            let d = ray.direction[i];
            let (min, max) = (self.bounds.min_on(axis), self.bounds.max_on(axis));

            if d == 0.0 {
                // Parallel to this slab: either always inside it or never.
                if o < min || o > max {
                    return false;
                }
                continue;
            }

            let mut t1 = (min - o) * inv[i];
            let mut t2 = (max - o) * inv[i];
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }

            if t1 > t_near {
                t_near = t1;
                normal = Vec3::zeros();
                normal[i] = -d.signum();
            }
            t_far = t_far.min(t2);
        }

        if t_near < t_far + EPSILON && t_near >= 0.0 && t_near < record.distance {
            record.distance = t_near;
            record.normal = normal;
            true
        } else {
            false
        }
    }
}
