use nalgebra::{Point3, UnitVector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// An infinite plane described by a point on it and its unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Plane3 {
    pub anchor: Point3<f64>,
    pub normal: UnitVector3<f64>,
}

impl Plane3 {
    pub fn new(anchor: Point3<f64>, normal: UnitVector3<f64>) -> Self {
        Self { anchor, normal }
    }

    /// Creates the plane with the given `normal` whose signed distance from the origin
    /// along that normal is `depth`.
    pub fn from_depth(normal: UnitVector3<f64>, depth: f64) -> Self {
        Self::new(Point3::from(normal.into_inner() * depth), normal)
    }

    /// Signed depth of the plane along its normal: the signed distance of the origin
    /// to the plane, negated.
    pub fn depth(&self) -> f64 {
        self.anchor.coords.dot(&self.normal)
    }

    /// The point on the plane closest to the origin.
    pub fn root(&self) -> Point3<f64> {
        Point3::from(self.normal.into_inner() * self.depth())
    }

    /// Positive on the side the normal points to.
    pub fn signed_distance_to(&self, point: &Point3<f64>) -> f64 {
        (point - self.anchor).dot(&self.normal)
    }

    pub fn distance_to(&self, point: &Point3<f64>) -> f64 {
        self.signed_distance_to(point).abs()
    }

    /// Scales the plane about the origin.
    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.anchor * factor, self.normal)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn root_is_closest_point_to_origin() {
        let plane = Plane3::new(Point3::new(3.0, 7.0, -2.0), Vector3::x_axis());
        assert_relative_eq!(plane.root(), Point3::new(3.0, 0.0, 0.0));
        assert_relative_eq!(plane.depth(), 3.0);
        assert_relative_eq!(plane.signed_distance_to(&Point3::origin()), -3.0);
        assert_relative_eq!(plane.scale(2.0).depth(), 6.0);
    }
}
