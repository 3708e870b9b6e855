use crate::{
    CameraModel, InterViewLineIncidence, Line2, Line3, LineIndex, LineRelation, Region2,
    RegionBoundary, RegionIndex, RegionLineConnection, RegionOverlap, VanishingPoints,
};
use nalgebra::UnitVector3;
use std::collections::HashMap;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Everything extracted from one calibrated image.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct View<C> {
    pub camera: C,
    pub regions: Vec<Region2>,
    pub lines: Vec<Line2>,
    /// Boundaries between pairs of regions of this view.
    pub boundaries: Vec<RegionBoundary>,
    /// Relations between pairs of lines of this view.
    pub line_relations: Vec<LineRelation>,
}

impl<C> View<C> {
    /// Creates a view without any features.
    pub fn new(camera: C) -> Self {
        Self {
            camera,
            regions: vec![],
            lines: vec![],
            boundaries: vec![],
            line_relations: vec![],
        }
    }
}

impl<C> View<C>
where
    C: CameraModel,
{
    /// The spatial direction of the center of a region of this view.
    pub fn region_center_direction(&self, handle: usize) -> Option<UnitVector3<f64>> {
        self.regions
            .get(handle)
            .map(|region| self.camera.spatial_direction(region.center))
    }
}

/// The precomputed, read-only input of a reconstruction.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Scene<C> {
    pub views: Vec<View<C>>,
    pub vanishing_points: VanishingPoints,
    pub region_overlaps: Vec<RegionOverlap>,
    pub region_line_connections: Vec<RegionLineConnection>,
    pub inter_view_line_incidences: Vec<InterViewLineIncidence>,
    /// Unit-scale 3d lines from the upstream line solve. Their direction is known, but
    /// their scale is not: the reconstruction produces a depth factor for each of them.
    pub unit_lines: HashMap<LineIndex, Line3>,
}

impl<C> Scene<C> {
    /// Creates a scene without any views or relations.
    pub fn new(vanishing_points: VanishingPoints) -> Self {
        Self {
            views: vec![],
            vanishing_points,
            region_overlaps: vec![],
            region_line_connections: vec![],
            inter_view_line_incidences: vec![],
            unit_lines: HashMap::new(),
        }
    }

    /// All region indices, ordered by view and then by handle.
    pub fn region_indices(&self) -> impl Iterator<Item = RegionIndex> + Clone + '_ {
        self.views.iter().enumerate().flat_map(|(view, v)| {
            (0..v.regions.len()).map(move |handle| RegionIndex::new(view, handle))
        })
    }

    /// All line indices, ordered by view and then by handle.
    pub fn line_indices(&self) -> impl Iterator<Item = LineIndex> + Clone + '_ {
        self.views.iter().enumerate().flat_map(|(view, v)| {
            (0..v.lines.len()).map(move |handle| LineIndex::new(view, handle))
        })
    }

    pub fn region(&self, index: RegionIndex) -> Option<&Region2> {
        self.views.get(index.view)?.regions.get(index.handle)
    }

    pub fn line(&self, index: LineIndex) -> Option<&Line2> {
        self.views.get(index.view)?.lines.get(index.handle)
    }

    pub fn unit_line(&self, index: LineIndex) -> Option<&Line3> {
        self.unit_lines.get(&index)
    }
}
