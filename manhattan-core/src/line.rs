use core::ops::Mul;
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A 3d line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Line3 {
    pub first: Point3<f64>,
    pub second: Point3<f64>,
}

impl Line3 {
    pub fn new(first: Point3<f64>, second: Point3<f64>) -> Self {
        Self { first, second }
    }

    /// Unnormalized direction from `first` to `second`.
    pub fn direction(&self) -> Vector3<f64> {
        self.second - self.first
    }

    /// The infinite line supporting this segment.
    pub fn infinite(&self) -> InfiniteLine3 {
        InfiniteLine3::new(self.first, self.direction())
    }
}

/// Scales the segment about the origin, which moves it along the rays of its endpoints.
impl Mul<f64> for Line3 {
    type Output = Line3;

    fn mul(self, factor: f64) -> Line3 {
        Line3::new(self.first * factor, self.second * factor)
    }
}

/// An infinite line through `anchor` along `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct InfiniteLine3 {
    pub anchor: Point3<f64>,
    pub direction: Vector3<f64>,
}

impl InfiniteLine3 {
    pub fn new(anchor: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self { anchor, direction }
    }

    /// The line through the origin along `direction`.
    pub fn ray(direction: Vector3<f64>) -> Self {
        Self::new(Point3::origin(), direction)
    }

    pub fn at(&self, t: f64) -> Point3<f64> {
        self.anchor + self.direction * t
    }
}
