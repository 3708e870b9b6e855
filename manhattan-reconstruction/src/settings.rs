#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The settings for the mixed graph reconstruction.
///
/// Distances are relative to the scale of the scene, which is the radius of the sphere
/// enclosing the bounding box of the unit-scale lines.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ReconstructionSettings {
    /// The minimum overlap ratio for two regions to be merged into one region component
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_region_overlap_threshold")
    )]
    pub region_overlap_threshold: f64,
    /// The minimum junction weight for two lines of a view to be merged into one line component
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_minimum_junction_weight")
    )]
    pub minimum_junction_weight: f64,
    /// The maximum number of anchors of one edge used when refining the scale
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_max_anchors_per_edge")
    )]
    pub max_anchors_per_edge: usize,
    /// The distance below which two plane roots are considered duplicates
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_root_merge_distance")
    )]
    pub root_merge_distance: f64,
    /// Planes whose root is at most this far from the origin are too skewed to be considered
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_minimum_root_distance")
    )]
    pub minimum_root_distance: f64,
    /// Planes which push any surrounding anchor further than this are rejected
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_maximum_anchor_distance")
    )]
    pub maximum_anchor_distance: f64,
    /// The distance from a plane below which an anchor is an inlier of that plane
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_inlier_distance")
    )]
    pub inlier_distance: f64,
    /// The bandwidth of the kernel used for mutual voting between depth factors
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_depth_factor_bandwidth")
    )]
    pub depth_factor_bandwidth: f64,
    /// The fraction of a region's convex visual area its best plane must cover to keep full priority
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_inlier_area_ratio_threshold")
    )]
    pub inlier_area_ratio_threshold: f64,
}

impl Default for ReconstructionSettings {
    fn default() -> Self {
        Self {
            region_overlap_threshold: default_region_overlap_threshold(),
            minimum_junction_weight: default_minimum_junction_weight(),
            max_anchors_per_edge: default_max_anchors_per_edge(),
            root_merge_distance: default_root_merge_distance(),
            minimum_root_distance: default_minimum_root_distance(),
            maximum_anchor_distance: default_maximum_anchor_distance(),
            inlier_distance: default_inlier_distance(),
            depth_factor_bandwidth: default_depth_factor_bandwidth(),
            inlier_area_ratio_threshold: default_inlier_area_ratio_threshold(),
        }
    }
}

fn default_region_overlap_threshold() -> f64 {
    0.2
}

fn default_minimum_junction_weight() -> f64 {
    1e-5
}

fn default_max_anchors_per_edge() -> usize {
    2
}

fn default_root_merge_distance() -> f64 {
    0.001
}

fn default_minimum_root_distance() -> f64 {
    0.25
}

fn default_maximum_anchor_distance() -> f64 {
    5.0
}

fn default_inlier_distance() -> f64 {
    0.1
}

fn default_depth_factor_bandwidth() -> f64 {
    0.01
}

fn default_inlier_area_ratio_threshold() -> f64 {
    0.3
}
