//! # Manhattan Core
//!
//! This library provides the common types shared by the crates of the Manhattan reconstruction workspace.
//! It describes what the reconstruction engine consumes and produces, but contains none of the algorithms.
//!
//! The engine works with several calibrated perspective views which share one optical center (the origin).
//! Every 2D feature in a view is addressed by a [`RegionIndex`] or a [`LineIndex`], which pair the view with
//! the position of the feature inside that view. A camera turns an image point into a [spatial direction](CameraModel),
//! which is a unit ray out of the origin in world space. Because every view shares the origin, a 3d point and the
//! ray it lies on can be used interchangeably as long as only its direction matters.
//!
//! ```text
//!              plane
//!   ----------p--------------
//!            /
//!           /  ray (anchor)
//!          /
//!         O  shared optical center
//! ```
//!
//! The scene is assumed to be a Manhattan world: there are three mutually (nearly) orthogonal
//! [vanishing directions](VanishingPoints) and most planar surfaces are orthogonal to one of them.
//!
//! Everything the engine needs is bundled in a [`Scene`]. The scene is read-only during reconstruction.

mod camera;
mod feature;
mod index;
mod line;
mod plane;
mod relation;
mod scene;
mod vanishing;

pub use camera::*;
pub use feature::*;
pub use index::*;
pub use line::*;
pub use nalgebra;
pub use plane::*;
pub use relation::*;
pub use scene::*;
pub use vanishing::*;
