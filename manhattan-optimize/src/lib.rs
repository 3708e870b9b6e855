//! Linear solvers used to reconcile the scale of a reconstruction.
//!
//! Local fits only ever see a small neighborhood of the scene, so the depths they commit to drift
//! apart as they propagate. [`WeightedLeastSquares`] collects one linear equation per piece of shared
//! evidence and solves for the corrections that make all of it agree as well as possible.

mod least_squares;
mod subsample;

pub use least_squares::*;
pub use subsample::*;
