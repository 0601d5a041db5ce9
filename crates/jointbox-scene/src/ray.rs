//! Ray representation and ray-face tests.

use jointbox_math::{Dir3, Point3, Tolerance, Vec3};
use jointbox_primitives::{Aabb3, BoxFace};

/// A ray in 3D space defined by origin and direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Unit direction of the ray.
    pub direction: Dir3,
    /// Precomputed reciprocal of direction components for fast AABB tests.
    inv_direction: Vec3,
    /// Sign of direction components (0 if positive, 1 if negative).
    sign: [usize; 3],
}

/// Where a ray crosses a face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FaceCrossing {
    /// Parameter along the ray.
    pub t: f64,
    /// True when the ray arrives on the side the normal points to.
    pub front: bool,
}

impl Ray {
    /// Create a new ray from origin and direction.
    ///
    /// Returns `None` if the direction has zero length.
    pub fn new(origin: Point3, direction: Vec3) -> Option<Self> {
        let dir = Dir3::try_new(direction, 1e-12)?;
        let inv = Vec3::new(1.0 / dir.x, 1.0 / dir.y, 1.0 / dir.z);
        let sign = [
            if inv.x < 0.0 { 1 } else { 0 },
            if inv.y < 0.0 { 1 } else { 0 },
            if inv.z < 0.0 { 1 } else { 0 },
        ];
        Some(Self {
            origin,
            direction: dir,
            inv_direction: inv,
            sign,
        })
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction.as_ref()
    }

    /// Test ray-AABB intersection using the slab method.
    ///
    /// Returns `Some((t_min, t_max))` if the ray intersects the box,
    /// where `t_min` and `t_max` are the entry and exit parameters.
    /// Handles infinite values correctly for axis-aligned rays.
    #[inline]
    pub fn intersect_aabb(&self, aabb: &Aabb3) -> Option<(f64, f64)> {
        let bounds = [aabb.min, aabb.max];

        let tx1 = (bounds[self.sign[0]].x - self.origin.x) * self.inv_direction.x;
        let tx2 = (bounds[1 - self.sign[0]].x - self.origin.x) * self.inv_direction.x;

        let mut t_min = tx1;
        let mut t_max = tx2;

        let ty1 = (bounds[self.sign[1]].y - self.origin.y) * self.inv_direction.y;
        let ty2 = (bounds[1 - self.sign[1]].y - self.origin.y) * self.inv_direction.y;

        t_min = max_ignoring_nan(t_min, ty1);
        t_max = min_ignoring_nan(t_max, ty2);

        let tz1 = (bounds[self.sign[2]].z - self.origin.z) * self.inv_direction.z;
        let tz2 = (bounds[1 - self.sign[2]].z - self.origin.z) * self.inv_direction.z;

        t_min = max_ignoring_nan(t_min, tz1);
        t_max = min_ignoring_nan(t_max, tz2);

        if t_max >= t_min && t_max >= 0.0 {
            Some((t_min.max(0.0), t_max))
        } else {
            None
        }
    }

    /// Intersect the ray with a rectangular face.
    ///
    /// Hits at or behind the origin (within tolerance) are ignored, as are
    /// faces parallel to the ray.
    pub(crate) fn intersect_face(&self, face: &BoxFace, tol: &Tolerance) -> Option<FaceCrossing> {
        let denom = self.direction.as_ref().dot(&face.normal);
        if denom.abs() < 1e-12 {
            return None;
        }

        let t = (face.corners[0] - self.origin).dot(&face.normal) / denom;
        if t <= tol.linear {
            return None;
        }

        if !face.bounds().contains(&self.at(t), tol) {
            return None;
        }

        Some(FaceCrossing {
            t,
            front: denom < 0.0,
        })
    }
}

// A slab parallel to the ray on its boundary yields 0 * inf = NaN; such a
// slab does not constrain the interval.
fn max_ignoring_nan(a: f64, b: f64) -> f64 {
    if b.is_nan() {
        a
    } else {
        a.max(b)
    }
}

fn min_ignoring_nan(a: f64, b: f64) -> f64 {
    if b.is_nan() {
        a
    } else {
        a.min(b)
    }
}
