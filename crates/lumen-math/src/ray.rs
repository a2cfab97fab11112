//! Ray representation and the ray-box slab test.

use crate::{Aabb, Dir3, Point3, Vec3};

/// A ray in 3D space defined by origin and direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Unit direction of the ray.
    pub direction: Dir3,
}

impl Ray {
    /// Create a new ray from origin and direction.
    ///
    /// The direction will be normalized.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: Dir3::new_normalize(direction),
        }
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction.as_ref()
    }

    /// Component-wise reciprocal of the direction.
    ///
    /// Zero components produce signed infinities, which the slab tests rely
    /// on for axis-parallel rays.
    #[inline]
    pub fn inv_direction(&self) -> Vec3 {
        Vec3::new(
            1.0 / self.direction.x,
            1.0 / self.direction.y,
            1.0 / self.direction.z,
        )
    }

    /// Test ray-AABB intersection using the slab method.
    ///
    /// Returns `Some((t_min, t_max))` if the ray intersects the box,
    /// where `t_min` and `t_max` are the entry and exit parameters.
    /// `t_min` is clamped to zero when the origin is inside the box.
    #[inline]
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<(f64, f64)> {
        let inv = self.inv_direction();
        let o = &self.origin;

        let (tx1, tx2) = slab_interval(aabb.xmin, aabb.xmax, o.x, inv.x);
        let (ty1, ty2) = slab_interval(aabb.ymin, aabb.ymax, o.y, inv.y);
        let (tz1, tz2) = slab_interval(aabb.zmin, aabb.zmax, o.z, inv.z);

        let t_min = tx1.max(ty1).max(tz1);
        let t_max = tx2.min(ty2).min(tz2);

        if t_max >= t_min && t_max >= 0.0 {
            Some((t_min.max(0.0), t_max))
        } else {
            None
        }
    }
}

/// Entry and exit parameters of a ray against the slab `[min, max]` on one
/// axis, ordered so that the first is not greater than the second.
///
/// `inv` is the reciprocal direction component. A ray parallel to the slab
/// (infinite `inv`) is inside it for every `t` when `min <= origin <= max`,
/// including an origin exactly on a bounding plane, and never otherwise.
#[inline]
pub fn slab_interval(min: f64, max: f64, origin: f64, inv: f64) -> (f64, f64) {
    if inv.is_infinite() {
        return if origin >= min && origin <= max {
            (f64::NEG_INFINITY, f64::INFINITY)
        } else {
            (f64::INFINITY, f64::NEG_INFINITY)
        };
    }
    let t1 = (min - origin) * inv;
    let t2 = (max - origin) * inv;
    if t1 <= t2 {
        (t1, t2)
    } else {
        (t2, t1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit() -> Aabb {
        Aabb::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0)
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        let p = ray.at(5.0);
        assert_relative_eq!(p.x, 5.0);
        assert!(p.y.abs() < 1e-12);
        assert!(p.z.abs() < 1e-12);
    }

    #[test]
    fn test_inv_direction_axis_aligned() {
        let ray = Ray::new(Point3::origin(), Vec3::new(0.0, -1.0, 0.0));
        let inv = ray.inv_direction();
        assert_eq!(inv.x, f64::INFINITY);
        assert_eq!(inv.y, -1.0);
        assert_eq!(inv.z, f64::INFINITY);
    }

    #[test]
    fn test_ray_aabb_hit() {
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let (t_min, t_max) = ray.intersect_aabb(&unit()).expect("ray should hit");
        assert_relative_eq!(t_min, 5.0, epsilon = 1e-10);
        assert_relative_eq!(t_max, 6.0, epsilon = 1e-10);
    }

    #[test]
    fn test_ray_aabb_miss() {
        let ray = Ray::new(Point3::new(-5.0, 5.0, 5.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(ray.intersect_aabb(&unit()).is_none());
    }

    #[test]
    fn test_ray_inside_aabb() {
        let ray = Ray::new(Point3::new(0.5, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let (t_min, t_max) = ray.intersect_aabb(&unit()).expect("ray starts inside");
        assert_eq!(t_min, 0.0);
        assert_relative_eq!(t_max, 0.5, epsilon = 1e-10);
    }

    #[test]
    fn test_ray_aabb_behind() {
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vec3::new(-1.0, 0.0, 0.0));
        assert!(ray.intersect_aabb(&unit()).is_none());
    }

    #[test]
    fn test_ray_aabb_diagonal() {
        let ray = Ray::new(Point3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let (t_min, _) = ray.intersect_aabb(&unit()).expect("diagonal ray should hit");
        assert_relative_eq!(t_min, 3f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn test_ray_in_face_plane_hits() {
        // travels inside the y = 0 face plane of the box
        let ray = Ray::new(Point3::new(-1.0, 0.0, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let (t_min, t_max) = ray.intersect_aabb(&unit()).expect("ray in face plane");
        assert_relative_eq!(t_min, 1.0, epsilon = 1e-12);
        assert_relative_eq!(t_max, 2.0, epsilon = 1e-12);

        let ray = Ray::new(Point3::new(-1.0, 1.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(ray.intersect_aabb(&unit()).is_some());
    }

    #[test]
    fn test_slab_interval_parallel() {
        assert_eq!(
            slab_interval(0.0, 1.0, 0.0, f64::INFINITY),
            (f64::NEG_INFINITY, f64::INFINITY)
        );
        assert_eq!(
            slab_interval(0.0, 1.0, 1.0, f64::NEG_INFINITY),
            (f64::NEG_INFINITY, f64::INFINITY)
        );
        let (t1, t2) = slab_interval(0.0, 1.0, 1.5, f64::INFINITY);
        assert!(t1 > t2);
        assert_eq!(slab_interval(0.0, 1.0, 2.0, -1.0), (1.0, 2.0));
    }
}
