use manhattan_core::{nalgebra::Point3, Line3};

/// Radius of the sphere that encloses the axis-aligned bounding box of the points.
///
/// Returns `None` if there are no points or the radius is zero or not finite.
pub fn outer_sphere_radius(points: impl IntoIterator<Item = Point3<f64>>) -> Option<f64> {
    let mut points = points.into_iter();
    let first = points.next()?;
    let (min, max) = points.fold((first, first), |(min, max), p| {
        (min.inf(&p), max.sup(&p))
    });
    let radius = (max - min).norm() / 2.0;
    (radius.is_finite() && radius > 0.0).then(|| radius)
}

/// The scale of a scene measured from the unit-scale lines reconstructed in it.
pub fn lines_scale<'a>(lines: impl IntoIterator<Item = &'a Line3>) -> Option<f64> {
    outer_sphere_radius(
        lines
            .into_iter()
            .flat_map(|line| [line.first, line.second]),
    )
}
