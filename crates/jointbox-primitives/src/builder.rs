//! Box construction from two diagonal corner points.

use jointbox_math::{Point3, Tolerance, Vec3};

use crate::face::polygon_area_vector;
use crate::{Aabb3, BaseFace, BoxError, BoxFace, FaceDirection};

/// An axis-aligned box built from a diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSolid {
    base: BaseFace,
    height: f64,
    bounds: Aabb3,
    faces: [BoxFace; 6],
}

impl BoxSolid {
    /// The base face the box was extruded from.
    pub fn base(&self) -> &BaseFace {
        &self.base
    }

    /// Signed extrusion distance along the base normal.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Extrusion vector (`base normal * height`).
    pub fn extrusion(&self) -> Vec3 {
        self.base.normal() * self.height
    }

    /// Bounds (min/max corners).
    pub fn bounds(&self) -> &Aabb3 {
        &self.bounds
    }

    /// Centroid of the box.
    pub fn center(&self) -> Point3 {
        self.bounds.center()
    }

    /// Width along X, height along Y, depth along Z.
    pub fn extents(&self) -> Vec3 {
        self.bounds.extents()
    }

    /// Enclosed volume.
    pub fn volume(&self) -> f64 {
        self.bounds.volume()
    }

    /// Volume by the divergence theorem over the face loops.
    ///
    /// Positive iff every face normal points outward.
    pub fn signed_volume(&self) -> f64 {
        self.faces
            .iter()
            .map(|f| f.corners[0].coords.dot(&polygon_area_vector(&f.corners)))
            .sum::<f64>()
            / 3.0
    }

    /// The face pointing along `direction`.
    pub fn face(&self, direction: FaceDirection) -> &BoxFace {
        &self.faces[direction.index()]
    }

    /// All six faces in [`FaceDirection::ALL`] order.
    pub fn faces(&self) -> &[BoxFace; 6] {
        &self.faces
    }
}

/// Build a box from two diagonal corners using the default tolerance.
///
/// The corners may be given in either order and in any relative octant.
pub fn build_box(pt1: Point3, pt2: Point3) -> Result<BoxSolid, BoxError> {
    build_box_with_tolerance(pt1, pt2, &Tolerance::DEFAULT)
}

/// Build a box from two diagonal corners.
///
/// The base face is the rectangle `pt1, pt_a, pt_b, pt_c` at `pt1.z`, where
/// `pt_b` is `pt2` dropped to that level. It is pushed along its normal by
/// `pt2.z - pt1.z`, with the sign flipped when the normal points down, so the
/// box always ends up spanning both corners.
///
/// # Errors
///
/// [`BoxError::DegenerateVolume`] if any axis extent is within tolerance of zero.
pub fn build_box_with_tolerance(
    pt1: Point3,
    pt2: Point3,
    tol: &Tolerance,
) -> Result<BoxSolid, BoxError> {
    let diagonal = pt2 - pt1;
    if tol.has_zero_component(&diagonal) {
        return Err(BoxError::DegenerateVolume {
            dx: diagonal.x.abs(),
            dy: diagonal.y.abs(),
            dz: diagonal.z.abs(),
        });
    }

    // Base corners: pt_b opposite pt1, pt_a and pt_c between them.
    let mut pt_b = pt2;
    pt_b.z = pt1.z;
    let to_b = pt_b - pt1;
    let pt_a = pt1 + Vec3::new(to_b.x, 0.0, 0.0);
    let pt_c = pt1 + Vec3::new(0.0, to_b.y, 0.0);
    let base = BaseFace::new([pt1, pt_a, pt_b, pt_c]);

    let mut height = diagonal.z;
    if base.normal().z < 0.0 {
        height = -height;
    }
    let extrusion = base.normal() * height;

    let faces = extrude_loop(&base.corners, &extrusion, tol)?;
    let bounds = Aabb3::from_points(faces.iter().flat_map(|f| f.corners.iter()));

    Ok(BoxSolid {
        base,
        height,
        bounds,
        faces,
    })
}

/// Sweep a rectangular loop along `extrusion` into six outward faces.
///
/// Face directions follow from the sweep itself: the caps point along and
/// against the extrusion, and each side along `edge x extrusion`.
fn extrude_loop(
    corners: &[Point3; 4],
    extrusion: &Vec3,
    tol: &Tolerance,
) -> Result<[BoxFace; 6], BoxError> {
    // Orient the loop counter-clockwise around the extrusion direction.
    let mut ring = *corners;
    if polygon_area_vector(&ring).dot(extrusion) < 0.0 {
        ring.reverse();
    }
    let top = ring.map(|p| p + *extrusion);

    let mut bottom = ring;
    bottom.reverse();

    let up = FaceDirection::from_normal(extrusion, tol).ok_or(BoxError::NotAxisAligned)?;
    let mut loops = vec![(up.opposite(), bottom), (up, top)];
    for i in 0..4 {
        let j = (i + 1) % 4;
        let outward = (ring[j] - ring[i]).cross(extrusion);
        let side = FaceDirection::from_normal(&outward, tol).ok_or(BoxError::NotAxisAligned)?;
        loops.push((side, [ring[i], ring[j], top[j], top[i]]));
    }

    let mut slots: [Option<BoxFace>; 6] = [None; 6];
    for (direction, corners) in loops {
        slots[direction.index()] = Some(BoxFace::with_direction(direction, corners));
    }

    let mut faces = Vec::with_capacity(6);
    for slot in slots {
        faces.push(slot.ok_or(BoxError::NotAxisAligned)?);
    }
    faces.try_into().map_err(|_| BoxError::NotAxisAligned)
}
