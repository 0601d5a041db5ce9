#![warn(missing_docs)]

//! Math types for the jointbox kernel.
//!
//! Thin wrappers around nalgebra providing the point, vector, and tolerance
//! types used by box construction and ray probing. Coordinates are in the
//! host document unit (inches).

use nalgebra::{Unit, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A displacement vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Linear distance tolerance in document units.
    pub linear: f64,
}

impl Tolerance {
    /// Default tolerance (1e-6 linear).
    pub const DEFAULT: Self = Self { linear: 1e-6 };

    /// Create a tolerance with the given linear epsilon.
    pub fn new(linear: f64) -> Self {
        Self { linear }
    }

    /// Check if a scalar is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// Check if two scalars are effectively equal.
    pub fn almost_equal(&self, a: f64, b: f64) -> bool {
        self.is_zero(a - b)
    }

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if at least one component of `v` is effectively zero.
    ///
    /// A diagonal with such a component spans no volume.
    pub fn has_zero_component(&self, v: &Vec3) -> bool {
        self.is_zero(v.x) || self.is_zero(v.y) || self.is_zero(v.z)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Midpoint of two points.
pub fn midpoint(a: &Point3, b: &Point3) -> Point3 {
    Point3::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0, (a.z + b.z) / 2.0)
}
