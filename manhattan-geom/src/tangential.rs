use crate::{convex_hull, intersect_ray_plane, polygon_area};
use manhattan_core::{
    nalgebra::{Point2, Point3, UnitVector3, Vector3},
    Plane3,
};

#[cfg(test)]
use manhattan_core::nalgebra::Unit;

/// A local 2D basis on the plane touching the unit sphere at a direction.
///
/// The frame is used to measure how much of the view sphere a set of directions covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentialFrame {
    pub plane: Plane3,
    pub x: UnitVector3<f64>,
    pub y: UnitVector3<f64>,
}

impl TangentialFrame {
    /// Erects the frame at the unit sphere point along `z`.
    pub fn new(z: UnitVector3<f64>) -> Self {
        let (x, y) = propose_xy_directions(&z);
        Self {
            plane: Plane3::new(Point3::from(z.into_inner()), z),
            x,
            y,
        }
    }

    /// Erects the frame at the mean of the directions.
    ///
    /// Returns `None` when the directions cancel out or there are none.
    pub fn from_directions(directions: impl IntoIterator<Item = Vector3<f64>>) -> Option<Self> {
        let sum: Vector3<f64> = directions.into_iter().map(|d| d.normalize()).sum();
        UnitVector3::try_new(sum, 1e-12).map(Self::new)
    }

    /// Projects a direction onto the frame.
    ///
    /// The whole line through the origin is intersected, so a point behind the origin projects
    /// like its mirror image. Directions parallel to the tangential plane do not project.
    pub fn project(&self, direction: &Vector3<f64>) -> Option<Point2<f64>> {
        let p = intersect_ray_plane(direction, &self.plane)?;
        Some(Point2::new(p.coords.dot(&self.x), p.coords.dot(&self.y)))
    }

    /// The visual area of a set of directions, measured on the tangential plane.
    ///
    /// When `convexify` is set, the area of the convex hull of the projected directions is
    /// returned, otherwise the directions are treated as an ordered contour.
    /// Fewer than three directions have no area.
    pub fn visual_area<'a>(
        &self,
        directions: impl IntoIterator<Item = &'a Vector3<f64>>,
        convexify: bool,
    ) -> f64 {
        let points: Vec<Point2<f64>> = directions
            .into_iter()
            .filter_map(|d| self.project(d))
            .collect();
        if points.len() <= 2 {
            return 0.0;
        }
        if convexify {
            polygon_area(&convex_hull(&points))
        } else {
            polygon_area(&points)
        }
    }
}

/// Proposes an orthonormal `x` and `y` which complete `z` into a right handed basis.
pub fn propose_xy_directions(z: &UnitVector3<f64>) -> (UnitVector3<f64>, UnitVector3<f64>) {
    // Start from the world axis least aligned with z.
    let axis = [Vector3::x(), Vector3::y(), Vector3::z()]
        .into_iter()
        .min_by_key(|a| float_ord::FloatOrd(a.dot(z).abs()))
        .unwrap_or_else(Vector3::x);
    let x = UnitVector3::new_normalize(axis - z.into_inner() * axis.dot(z));
    let y = UnitVector3::new_normalize(z.cross(&x));
    (x, y)
}
