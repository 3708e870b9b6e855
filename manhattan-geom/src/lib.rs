//! This crate contains the computational geometry used by the Manhattan reconstruction engine.
//!
//! Every view shares its optical center with all other views, so most operations here treat
//! an anchor direction as a line through the origin (a ray) and ask where it meets a plane or
//! how close it comes to another line.
//!
//! ## Visual area
//!
//! The size of a set of directions is measured on a tangential plane: the plane touching the unit
//! sphere at the mean direction of a region. Directions are intersected with that plane and the
//! area of the resulting 2D polygon (or of its convex hull) approximates the solid angle covered
//! by the directions.
//!
//! ```text
//!        x ---- tangential plane ---- x
//!              \       |       /
//!               \      | mean /
//!                \     |     /
//!                 \    |    /
//!                      O
//! ```

mod bounds;
mod hull;
mod intersection;
mod kernel;
mod tangential;

pub use bounds::*;
pub use hull::*;
pub use intersection::*;
pub use kernel::*;
pub use tangential::*;
