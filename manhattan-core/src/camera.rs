use nalgebra::{Point2, Rotation3, UnitVector3, Vector2, Vector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Allows conversion from a point on an image to the spatial direction of the light
/// that hit that point.
///
/// All views of a scene share their optical center, so the returned direction is expressed in
/// world space and protrudes from the origin.
pub trait CameraModel {
    /// Extracts the world-space unit direction for a pixel location in the image.
    ///
    /// The image point has its X axis pointing right and its Y axis pointing down.
    fn spatial_direction(&self, point: Point2<f64>) -> UnitVector3<f64>;
}

/// A distortion-free perspective camera sitting at the origin.
///
/// The camera frame has X pointing right, Y pointing down and Z pointing forwards.
/// `rotation` maps directions from the camera frame into the world frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct PerspectiveCamera {
    pub focal: f64,
    pub principal_point: Point2<f64>,
    pub rotation: Rotation3<f64>,
}

impl PerspectiveCamera {
    pub fn new(focal: f64, principal_point: Point2<f64>, rotation: Rotation3<f64>) -> Self {
        Self {
            focal,
            principal_point,
            rotation,
        }
    }

    /// Creates a camera looking at `center` with the given image `up` direction.
    ///
    /// `up` must not be parallel to `center`.
    pub fn look_at(
        focal: f64,
        principal_point: Point2<f64>,
        center: Vector3<f64>,
        up: Vector3<f64>,
    ) -> Self {
        let z = center.normalize();
        let x = z.cross(&up).normalize();
        // Image Y points down.
        let y = z.cross(&x);
        let rotation = Rotation3::from_basis_unchecked(&[x, y, z]);
        Self::new(focal, principal_point, rotation)
    }
}

impl CameraModel for PerspectiveCamera {
    fn spatial_direction(&self, point: Point2<f64>) -> UnitVector3<f64> {
        let normalized: Vector2<f64> = (point - self.principal_point) / self.focal;
        UnitVector3::new_normalize(self.rotation * normalized.push(1.0))
    }
}

impl<T> CameraModel for &T
where
    T: CameraModel,
{
    fn spatial_direction(&self, point: Point2<f64>) -> UnitVector3<f64> {
        (*self).spatial_direction(point)
    }
}
