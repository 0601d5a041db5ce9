//! Extrude operation: sweep an axis-aligned rectangle along its normal.

use jointbox_math::{Point3, Tolerance};

use crate::face::polygon_area_vector;
use crate::{build_box_with_tolerance, Aabb3, BoxError, BoxSolid, FaceDirection};

/// Extrude a rectangular face along its normal using the default tolerance.
///
/// See [`extrude_rectangle_with_tolerance`].
pub fn extrude_rectangle(
    corners: [Point3; 4],
    distance: f64,
    flip: bool,
) -> Result<BoxSolid, BoxError> {
    extrude_rectangle_with_tolerance(corners, distance, flip, &Tolerance::DEFAULT)
}

/// Extrude a rectangular face along its normal.
///
/// # Arguments
///
/// * `corners` - The face loop; its winding gives the normal
/// * `distance` - Push distance along the normal (negative pushes inward)
/// * `flip` - Reverse the face before pushing
///
/// # Errors
///
/// [`BoxError::NotAxisAligned`] if the loop is not a rectangle lying in an
/// axis plane, and [`BoxError::DegenerateVolume`] if the push distance or a
/// side of the rectangle is zero.
pub fn extrude_rectangle_with_tolerance(
    corners: [Point3; 4],
    distance: f64,
    flip: bool,
    tol: &Tolerance,
) -> Result<BoxSolid, BoxError> {
    let area = polygon_area_vector(&corners);
    let mut direction =
        FaceDirection::from_normal(&area, tol).ok_or(BoxError::NotAxisAligned)?;
    if flip {
        direction = direction.opposite();
    }

    let bounds = Aabb3::from_points(&corners);
    let is_corner = |p: &Point3| {
        (0..3).all(|axis| {
            tol.almost_equal(p[axis], bounds.min[axis])
                || tol.almost_equal(p[axis], bounds.max[axis])
        })
    };
    if !corners.iter().all(is_corner) || !tol.is_zero(bounds.extents()[direction.axis()]) {
        return Err(BoxError::NotAxisAligned);
    }

    let far = bounds.max + direction.vector() * distance;
    build_box_with_tolerance(bounds.min, far, tol)
}
