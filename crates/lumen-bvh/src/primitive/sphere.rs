//! Ray-sphere intersection (quadratic equation).

use lumen_math::{Aabb, Point3, Ray, Vec3, EPSILON};

use super::{IntersectionRecord, Primitive};

/// A solid sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Point3,
    radius: f64,
}

impl Sphere {
    /// Create a sphere from its center and radius.
    pub fn new(center: Point3, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl Primitive for Sphere {
    fn bounds(&self) -> Aabb {
        let r = self.radius;
        Aabb::new(
            self.center.x - r,
            self.center.x + r,
            self.center.y - r,
            self.center.y + r,
            self.center.z - r,
            self.center.z + r,
        )
    }

    fn closest_intersection(&self, ray: &Ray, record: &mut IntersectionRecord) -> bool {
        let oc = ray.origin - self.center;
        let d = ray.direction.as_ref();

        // Quadratic: |oc + t*d|^2 = r^2, with |d| = 1
        let b = oc.dot(d);
        let c = oc.dot(&oc) - self.radius * self.radius;

        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return false;
        }

        let sqrt_disc = discriminant.sqrt();
        let t = [-b - sqrt_disc, -b + sqrt_disc]
            .into_iter()
            .find(|&t| t > EPSILON);

        match t {
            Some(t) if t < record.distance => {
                let normal: Vec3 = (ray.at(t) - self.center) / self.radius;
                record.distance = t;
                record.normal = normal;
                true
            }
            _ => false,
        }
    }
}
