use crate::{LineIndex, RegionIndex};
use nalgebra::UnitVector3;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Two regions from different views that cover the same part of the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RegionOverlap {
    pub regions: [RegionIndex; 2],
    /// The overlap ratio in `(0, 1]`.
    pub ratio: f64,
}

/// A line passing near a region, with the rays sampled along the line where it touches the region.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RegionLineConnection {
    pub region: RegionIndex,
    pub line: LineIndex,
    pub anchors: Vec<UnitVector3<f64>>,
}

/// Two lines of the same class from different views which were judged to be coincident.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct InterViewLineIncidence {
    pub lines: [LineIndex; 2],
    pub anchor: UnitVector3<f64>,
}

/// An intersection or incidence relation between two lines of the same view.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct LineRelation {
    /// Handles of the two lines in [`View::lines`](crate::View::lines).
    pub lines: [usize; 2],
    /// How strongly the junction between the two lines was supported.
    pub junction_weight: f64,
}
