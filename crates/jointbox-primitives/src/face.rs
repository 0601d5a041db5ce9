//! Face loops and the six canonical face directions.

use std::fmt;
use std::str::FromStr;

use jointbox_math::{Point3, Tolerance, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Aabb3;

/// One of the six axis directions a box face can point along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FaceDirection {
    /// +X
    #[serde(rename = "+X")]
    PosX,
    /// -X
    #[serde(rename = "-X")]
    NegX,
    /// +Y
    #[serde(rename = "+Y")]
    PosY,
    /// -Y
    #[serde(rename = "-Y")]
    NegY,
    /// +Z
    #[serde(rename = "+Z")]
    PosZ,
    /// -Z
    #[serde(rename = "-Z")]
    NegZ,
}

impl FaceDirection {
    /// All six directions in canonical probe order.
    pub const ALL: [FaceDirection; 6] = [
        FaceDirection::PosX,
        FaceDirection::NegX,
        FaceDirection::PosY,
        FaceDirection::NegY,
        FaceDirection::PosZ,
        FaceDirection::NegZ,
    ];

    /// Position of this direction in [`FaceDirection::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Unit axis vector.
    pub fn vector(self) -> Vec3 {
        match self {
            FaceDirection::PosX => Vec3::new(1.0, 0.0, 0.0),
            FaceDirection::NegX => Vec3::new(-1.0, 0.0, 0.0),
            FaceDirection::PosY => Vec3::new(0.0, 1.0, 0.0),
            FaceDirection::NegY => Vec3::new(0.0, -1.0, 0.0),
            FaceDirection::PosZ => Vec3::new(0.0, 0.0, 1.0),
            FaceDirection::NegZ => Vec3::new(0.0, 0.0, -1.0),
        }
    }

    /// The direction pointing the other way.
    pub fn opposite(self) -> Self {
        match self {
            FaceDirection::PosX => FaceDirection::NegX,
            FaceDirection::NegX => FaceDirection::PosX,
            FaceDirection::PosY => FaceDirection::NegY,
            FaceDirection::NegY => FaceDirection::PosY,
            FaceDirection::PosZ => FaceDirection::NegZ,
            FaceDirection::NegZ => FaceDirection::PosZ,
        }
    }

    /// Axis index (0 = X, 1 = Y, 2 = Z).
    pub fn axis(self) -> usize {
        self.index() / 2
    }

    /// Classify a normal as one of the six directions.
    ///
    /// Only the direction of `normal` matters, so area vectors of tiny faces
    /// classify like unit normals. Returns `None` for a zero or non-finite
    /// vector, or one not parallel to a coordinate axis.
    pub fn from_normal(normal: &Vec3, tol: &Tolerance) -> Option<Self> {
        let len = normal.norm();
        if len == 0.0 || !len.is_finite() {
            return None;
        }
        let n = normal / len;
        FaceDirection::ALL
            .into_iter()
            .find(|d| tol.is_zero((n - d.vector()).norm()))
    }

    fn label(self) -> &'static str {
        match self {
            FaceDirection::PosX => "+X",
            FaceDirection::NegX => "-X",
            FaceDirection::PosY => "+Y",
            FaceDirection::NegY => "-Y",
            FaceDirection::PosZ => "+Z",
            FaceDirection::NegZ => "-Z",
        }
    }
}

impl fmt::Display for FaceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error parsing a [`FaceDirection`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown face direction '{0}' (expected one of +X, -X, +Y, -Y, +Z, -Z)")]
pub struct ParseDirectionError(pub String);

impl FromStr for FaceDirection {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        FaceDirection::ALL
            .into_iter()
            .find(|d| d.label() == upper)
            .ok_or_else(|| ParseDirectionError(s.to_string()))
    }
}

/// Area vector of a planar polygon (Newell's method).
///
/// The length is the polygon area; the direction is the normal given by the
/// right-hand rule over the vertex order.
pub fn polygon_area_vector(points: &[Point3]) -> Vec3 {
    let mut n = Vec3::zeros();
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        n.x += (p.y - q.y) * (p.z + q.z);
        n.y += (p.z - q.z) * (p.x + q.x);
        n.z += (p.x - q.x) * (p.y + q.y);
    }
    n / 2.0
}

/// The planar quadrilateral a box is extruded from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseFace {
    /// Corners in winding order: `pt1, pt_a, pt_b, pt_c`.
    pub corners: [Point3; 4],
}

impl BaseFace {
    /// Create a base face from its four corners in winding order.
    pub fn new(corners: [Point3; 4]) -> Self {
        Self { corners }
    }

    /// Unit normal given by the winding order.
    pub fn normal(&self) -> Vec3 {
        polygon_area_vector(&self.corners).normalize()
    }

    /// Face area.
    pub fn area(&self) -> f64 {
        polygon_area_vector(&self.corners).norm()
    }
}

/// One face of a built box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxFace {
    /// The direction the face points along.
    pub direction: FaceDirection,
    /// Corners, counter-clockwise when viewed from outside the box.
    pub corners: [Point3; 4],
    /// Unit outward normal.
    pub normal: Vec3,
}

impl BoxFace {
    /// Create a face from corners wound counter-clockwise seen from outside.
    ///
    /// Returns `None` if the winding normal is not axis-aligned.
    pub fn from_corners(corners: [Point3; 4], tol: &Tolerance) -> Option<Self> {
        let area = polygon_area_vector(&corners);
        let direction = FaceDirection::from_normal(&area, tol)?;
        Some(Self::with_direction(direction, corners))
    }

    /// Create a face whose direction is already known.
    ///
    /// The corners must be wound counter-clockwise seen from `direction`.
    pub fn with_direction(direction: FaceDirection, corners: [Point3; 4]) -> Self {
        Self {
            direction,
            corners,
            normal: direction.vector(),
        }
    }

    /// Face area.
    pub fn area(&self) -> f64 {
        polygon_area_vector(&self.corners).norm()
    }

    /// Centroid of the face rectangle.
    pub fn center(&self) -> Point3 {
        self.bounds().center()
    }

    /// Bounds of the face (flat along its normal axis).
    pub fn bounds(&self) -> Aabb3 {
        Aabb3::from_points(&self.corners)
    }

    /// Offset of the face plane along its normal axis.
    pub fn plane_offset(&self) -> f64 {
        self.corners[0][self.direction.axis()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_vectors_are_opposed() {
        for d in FaceDirection::ALL {
            let sum = d.vector() + d.opposite().vector();
            assert!(sum.norm() < 1e-12);
            assert_eq!(d.axis(), d.opposite().axis());
        }
    }

    #[test]
    fn test_direction_index_matches_order() {
        for (i, d) in FaceDirection::ALL.iter().enumerate() {
            assert_eq!(d.index(), i);
        }
    }

    #[test]
    fn test_direction_parse_and_display() {
        assert_eq!("+x".parse::<FaceDirection>().unwrap(), FaceDirection::PosX);
        assert_eq!(" -Z ".parse::<FaceDirection>().unwrap(), FaceDirection::NegZ);
        assert!("up".parse::<FaceDirection>().is_err());
        assert_eq!(FaceDirection::NegY.to_string(), "-Y");
    }

    #[test]
    fn test_direction_from_normal() {
        let tol = Tolerance::DEFAULT;
        assert_eq!(
            FaceDirection::from_normal(&Vec3::new(0.0, 0.0, -3.0), &tol),
            Some(FaceDirection::NegZ)
        );
        assert_eq!(FaceDirection::from_normal(&Vec3::new(1.0, 1.0, 0.0), &tol), None);
        assert_eq!(FaceDirection::from_normal(&Vec3::zeros(), &tol), None);
        assert_eq!(
            FaceDirection::from_normal(&Vec3::new(f64::NAN, 0.0, 1.0), &tol),
            None
        );
    }

    #[test]
    fn test_small_area_vector_keeps_its_direction() {
        let tol = Tolerance::DEFAULT;
        assert_eq!(
            FaceDirection::from_normal(&Vec3::new(0.0, 2.5e-7, 0.0), &tol),
            Some(FaceDirection::PosY)
        );

        let corners = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(5e-4, 0.0, 0.0),
            Point3::new(5e-4, 5e-4, 0.0),
            Point3::new(0.0, 5e-4, 0.0),
        ];
        let face = BoxFace::from_corners(corners, &tol).unwrap();
        assert_eq!(face.direction, FaceDirection::PosZ);
    }

    #[test]
    fn test_newell_area_vector_ccw_square() {
        let pts = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 3.0, 0.0),
            Point3::new(0.0, 3.0, 0.0),
        ];
        let a = polygon_area_vector(&pts);
        assert!((a.z - 6.0).abs() < 1e-12);
        assert!(a.x.abs() < 1e-12 && a.y.abs() < 1e-12);
    }

    #[test]
    fn test_base_face_normal_follows_winding() {
        let base = BaseFace::new([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(-4.0, 0.0, 0.0),
            Point3::new(-4.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ]);
        // dx < 0, dy > 0: clockwise seen from +Z
        assert!((base.normal().z + 1.0).abs() < 1e-12);
        assert!((base.area() - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_box_face_direction_from_winding() {
        let tol = Tolerance::DEFAULT;
        let mut corners = [
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let face = BoxFace::from_corners(corners, &tol).unwrap();
        assert_eq!(face.direction, FaceDirection::PosZ);
        assert!((face.plane_offset() - 1.0).abs() < 1e-12);

        corners.reverse();
        let flipped = BoxFace::from_corners(corners, &tol).unwrap();
        assert_eq!(flipped.direction, FaceDirection::NegZ);
        assert_eq!(flipped.normal, Vec3::new(0.0, 0.0, -1.0));

        // A tilted quad has no box direction.
        corners[0].z = 2.0;
        assert!(BoxFace::from_corners(corners, &tol).is_none());
    }
}
