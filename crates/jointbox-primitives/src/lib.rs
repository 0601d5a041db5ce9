#![warn(missing_docs)]

//! Axis-aligned box construction for the jointbox kernel.
//!
//! A box is built from two diagonal corner points: a planar base face at the
//! first corner's z-level, extruded to the second corner's z-level. Every face
//! of the result carries an outward normal and a [`FaceDirection`], whatever
//! the order or octant of the two corners.
//!
//! # Example
//!
//! ```
//! use jointbox_math::Point3;
//! use jointbox_primitives::{build_box, FaceDirection};
//!
//! let solid = build_box(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 10.0, -5.0)).unwrap();
//! assert!((solid.volume() - 500.0).abs() < 1e-9);
//! assert_eq!(solid.face(FaceDirection::NegZ).normal.z, -1.0);
//! ```

pub mod bbox;
mod builder;
mod extrude;
mod face;

pub use bbox::Aabb3;
pub use builder::{build_box, build_box_with_tolerance, BoxSolid};
pub use extrude::{extrude_rectangle, extrude_rectangle_with_tolerance};
pub use face::{polygon_area_vector, BaseFace, BoxFace, FaceDirection, ParseDirectionError};

use thiserror::Error;

/// Errors from box construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoxError {
    /// The diagonal has a (near-)zero extent along at least one axis.
    #[error("cannot create a zero-volume region: extents ({dx:.6}, {dy:.6}, {dz:.6})")]
    DegenerateVolume {
        /// Extent along X.
        dx: f64,
        /// Extent along Y.
        dy: f64,
        /// Extent along Z.
        dz: f64,
    },

    /// The face to extrude is not an axis-aligned rectangle.
    #[error("face is not an axis-aligned rectangle")]
    NotAxisAligned,
}
