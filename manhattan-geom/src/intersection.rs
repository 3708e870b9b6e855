use manhattan_core::{
    nalgebra::{Point3, Vector3},
    InfiniteLine3, Plane3,
};

/// Intersects an infinite line with a plane.
///
/// Returns `None` when the line is parallel to the plane or the intersection is not finite.
pub fn intersect_line_plane(line: &InfiniteLine3, plane: &Plane3) -> Option<Point3<f64>> {
    let denominator = line.direction.dot(&plane.normal);
    let t = (plane.anchor - line.anchor).dot(&plane.normal) / denominator;
    Some(line.at(t)).filter(|p| p.coords.iter().all(|n| n.is_finite()))
}

/// Intersects the ray through the origin along `direction` with a plane.
///
/// The result may lie behind the origin if the plane does.
pub fn intersect_ray_plane(direction: &Vector3<f64>, plane: &Plane3) -> Option<Point3<f64>> {
    intersect_line_plane(&InfiniteLine3::ray(*direction), plane)
}

/// Distance from the origin to the intersection of the ray along `direction` with a plane.
pub fn depth_on_plane(direction: &Vector3<f64>, plane: &Plane3) -> Option<f64> {
    intersect_ray_plane(direction, plane).map(|p| p.coords.norm())
}

/// Finds the closest pair of points between two infinite lines.
///
/// The first returned point lies on `a` and the second on `b`.
/// Returns `None` when the lines are (nearly) parallel, as the pair is not unique.
pub fn closest_points(a: &InfiniteLine3, b: &InfiniteLine3) -> Option<(Point3<f64>, Point3<f64>)> {
    let u = a.direction;
    let v = b.direction;
    let w = a.anchor - b.anchor;
    let uu = u.dot(&u);
    let uv = u.dot(&v);
    let vv = v.dot(&v);
    let uw = u.dot(&w);
    let vw = v.dot(&w);
    let denominator = uu * vv - uv * uv;
    if denominator <= f64::EPSILON * uu * vv {
        return None;
    }
    let s = (uv * vw - vv * uw) / denominator;
    let t = (uu * vw - uv * uw) / denominator;
    let pair = (a.at(s), b.at(t));
    let finite = pair.0.coords.iter().chain(pair.1.coords.iter()).all(|n| n.is_finite());
    finite.then(|| pair)
}

/// The point on the ray through the origin along `direction` which is closest to `line`.
pub fn ray_point_nearest_line(direction: &Vector3<f64>, line: &InfiniteLine3) -> Option<Point3<f64>> {
    closest_points(&InfiniteLine3::ray(*direction), line).map(|(on_ray, _)| on_ray)
}
