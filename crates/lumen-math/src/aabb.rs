//! Axis-aligned bounding boxes.

use serde::{Deserialize, Serialize};

use crate::{Point3, Vec3};

/// One of the three coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// All axes in scan order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of this axis (0, 1 or 2).
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Axis-aligned bounding box in 3D.
///
/// An empty box has `+inf` minimums and `-inf` maximums, which makes it the
/// identity element of [`Aabb::expand`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum X.
    pub xmin: f64,
    /// Maximum X.
    pub xmax: f64,
    /// Minimum Y.
    pub ymin: f64,
    /// Maximum Y.
    pub ymax: f64,
    /// Minimum Z.
    pub zmin: f64,
    /// Maximum Z.
    pub zmax: f64,
}

impl Aabb {
    /// Create a box from its six bounds.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64, zmin: f64, zmax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
            zmin,
            zmax,
        }
    }

    /// Create an empty (inverted) box suitable for expansion.
    pub fn empty() -> Self {
        Self {
            xmin: f64::INFINITY,
            xmax: f64::NEG_INFINITY,
            ymin: f64::INFINITY,
            ymax: f64::NEG_INFINITY,
            zmin: f64::INFINITY,
            zmax: f64::NEG_INFINITY,
        }
    }

    /// Smallest box enclosing all given points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.include_point(p);
        }
        aabb
    }

    /// True if the box encloses nothing.
    pub fn is_empty(&self) -> bool {
        self.xmin > self.xmax || self.ymin > self.ymax || self.zmin > self.zmax
    }

    /// Union of this box and `other`.
    #[must_use]
    pub fn expand(&self, other: &Aabb) -> Aabb {
        let mut out = *self;
        out.expand_mut(other);
        out
    }

    /// Grow this box in place to enclose `other`.
    pub fn expand_mut(&mut self, other: &Aabb) {
        self.xmin = self.xmin.min(other.xmin);
        self.xmax = self.xmax.max(other.xmax);
        self.ymin = self.ymin.min(other.ymin);
        self.ymax = self.ymax.max(other.ymax);
        self.zmin = self.zmin.min(other.zmin);
        self.zmax = self.zmax.max(other.zmax);
    }

    /// Grow this box in place to enclose a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.xmin = self.xmin.min(p.x);
        self.xmax = self.xmax.max(p.x);
        self.ymin = self.ymin.min(p.y);
        self.ymax = self.ymax.max(p.y);
        self.zmin = self.zmin.min(p.z);
        self.zmax = self.zmax.max(p.z);
    }

    /// Edge lengths along x, y and z.
    pub fn extent(&self) -> Vec3 {
        Vec3::new(
            self.xmax - self.xmin,
            self.ymax - self.ymin,
            self.zmax - self.zmin,
        )
    }

    /// Surface area, `2 * (dx*dy + dy*dz + dz*dx)`. Zero for an empty box.
    pub fn surface_area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.extent();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// Lower bound along an axis.
    pub fn min_on(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.xmin,
            Axis::Y => self.ymin,
            Axis::Z => self.zmin,
        }
    }

    /// Upper bound along an axis.
    pub fn max_on(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.xmax,
            Axis::Y => self.ymax,
            Axis::Z => self.zmax,
        }
    }

    /// Center of the box projected on an axis.
    pub fn centroid_on(&self, axis: Axis) -> f64 {
        let min = self.min_on(axis);
        min + (self.max_on(axis) - min) / 2.0
    }

    /// The axis with the greatest extent. Ties prefer X, then Y.
    pub fn major_axis(&self) -> Axis {
        let d = self.extent();
        if d.x >= d.y && d.x >= d.z {
            Axis::X
        } else if d.y >= d.x && d.y >= d.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// This box moved by `offset`.
    #[must_use]
    pub fn translate(&self, offset: &Vec3) -> Aabb {
        Aabb::new(
            self.xmin + offset.x,
            self.xmax + offset.x,
            self.ymin + offset.y,
            self.ymax + offset.y,
            self.zmin + offset.z,
            self.zmax + offset.z,
        )
    }

    /// Test if a point lies inside or on the boundary of the box.
    pub fn contains(&self, p: &Point3) -> bool {
        p.x >= self.xmin
            && p.x <= self.xmax
            && p.y >= self.ymin
            && p.y <= self.ymax
            && p.z >= self.zmin
            && p.z <= self.zmax
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}
