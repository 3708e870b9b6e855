use derive_more::{AsRef, Deref, From, Into};
use nalgebra::{UnitVector3, Vector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The three mutually (nearly) orthogonal directions of a Manhattan world.
///
/// A 2D line of class `i` converges towards `self[i]` under perspective projection,
/// and an orthogonal plane of class `i` has `self[i]` as its normal.
#[derive(Debug, Clone, Copy, PartialEq, AsRef, Deref, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct VanishingPoints(pub [UnitVector3<f64>; 3]);

impl VanishingPoints {
    /// The world axes, useful when the scene was already rectified.
    pub fn axes() -> Self {
        Self([Vector3::x_axis(), Vector3::y_axis(), Vector3::z_axis()])
    }
}
