//! Axis-aligned bounding boxes.

use jointbox_math::{Point3, Tolerance, Vec3};

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest AABB containing all `points`.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.include_point(p);
        }
        aabb
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Size along each axis.
    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }

    /// Center point.
    pub fn center(&self) -> Point3 {
        jointbox_math::midpoint(&self.min, &self.max)
    }

    /// Enclosed volume.
    pub fn volume(&self) -> f64 {
        let e = self.extents();
        e.x * e.y * e.z
    }

    /// Test if `p` lies inside or on the boundary, with `tol` slack.
    pub fn contains(&self, p: &Point3, tol: &Tolerance) -> bool {
        p.x >= self.min.x - tol.linear
            && p.x <= self.max.x + tol.linear
            && p.y >= self.min.y - tol.linear
            && p.y <= self.max.y + tol.linear
            && p.z >= self.min.z - tol.linear
            && p.z <= self.max.z + tol.linear
    }

    /// Test if both corners match `other` within `tol`.
    pub fn approx_eq(&self, other: &Aabb3, tol: &Tolerance) -> bool {
        tol.points_equal(&self.min, &other.min) && tol.points_equal(&self.max, &other.max)
    }
}
