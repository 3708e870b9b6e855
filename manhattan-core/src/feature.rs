use nalgebra::Point2;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// An elementary segmented region of one view.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Region2 {
    /// Pixels along the outer contour of the region, in contour order.
    pub contour: Vec<Point2<f64>>,
    /// Area of the region in pixels.
    pub area: f64,
    /// Center of the region in pixel coordinates.
    pub center: Point2<f64>,
}

/// A detected line segment of one view, classified by the vanishing direction it converges to.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Line2 {
    pub endpoints: [Point2<f64>; 2],
    /// Index into [`VanishingPoints`](crate::VanishingPoints) in `0..3`.
    pub class: usize,
}

impl Line2 {
    pub fn new(a: Point2<f64>, b: Point2<f64>, class: usize) -> Self {
        Self {
            endpoints: [a, b],
            class,
        }
    }
}

/// The shared boundary of two regions segmented in the same view.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RegionBoundary {
    /// Handles of the two regions in [`View::regions`](crate::View::regions).
    pub regions: [usize; 2],
    /// Pixel samples along the boundary curve.
    pub samples: Vec<Point2<f64>>,
}
