use crate::{Context, EdgeKey, EdgeKind, MixedGraph, ReconstructionSettings, VertexKey, VertexKind};
use itertools::iproduct;
use log::*;
use manhattan_core::{
    nalgebra::{Point3, Vector3},
    Line3, Plane3, VanishingPoints,
};
use manhattan_geom::{gaussian, intersect_ray_plane, ray_point_nearest_line, TangentialFrame};
use rstar::RTree;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Vote given to the depth factor every line component starts with.
const SEED_DEPTH_FACTOR_VOTE: f64 = 1e-8;

/// The geometry of a plane hypothesis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum PlaneGeometry {
    /// A plane orthogonal to one of the vanishing directions.
    Orthogonal {
        /// Index of the vanishing direction which is the normal of the plane.
        class: usize,
        /// Signed distance of the plane from the origin along the normal.
        depth: f64,
    },
    /// Any other plane.
    Skewed(Plane3),
}

impl PlaneGeometry {
    pub fn plane(&self, vanishing_points: &VanishingPoints) -> Plane3 {
        match *self {
            Self::Orthogonal { class, depth } => Plane3::from_depth(vanishing_points[class], depth),
            Self::Skewed(plane) => plane,
        }
    }

    /// Scales the plane about the origin.
    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        match self {
            Self::Orthogonal { class, depth } => Self::Orthogonal {
                class,
                depth: depth * factor,
            },
            Self::Skewed(plane) => Self::Skewed(plane.scale(factor)),
        }
    }
}

/// A candidate plane for a region component.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct PlaneHypothesis {
    pub geometry: PlaneGeometry,
    /// Sum of the kernel weighted distances of all inlier anchors.
    pub vote: f64,
    /// Convex visual area covered by the inlier anchors.
    pub inlier_convex_area: f64,
}

impl PlaneHypothesis {
    /// A hypothesis without any support, used as the initial value of a region component.
    pub fn seed(plane: Plane3) -> Self {
        Self {
            geometry: PlaneGeometry::Skewed(plane),
            vote: 0.0,
            inlier_convex_area: 0.0,
        }
    }

    /// How well the hypothesis explains a region whose convex visual area is `convex_visual_area`.
    pub fn score(&self, convex_visual_area: f64) -> f64 {
        if convex_visual_area == 0.0 {
            0.0
        } else {
            self.vote * self.inlier_convex_area / convex_visual_area
        }
    }
}

/// A candidate depth factor for a line component.
///
/// Multiplying the unit-scale lines of the component by the factor places them in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct DepthFactorHypothesis {
    pub depth_factor: f64,
    /// Agreement with all other candidates of the same component.
    pub votes: f64,
}

impl DepthFactorHypothesis {
    pub fn new(depth_factor: f64) -> Self {
        Self {
            depth_factor,
            votes: 0.0,
        }
    }
}

/// Candidate hypotheses of a vertex, grouped by the edge that produced them.
///
/// The group of an edge is replaced every time the edge is updated. Groups keep the order in
/// which they were first inserted, and the seed group (produced by no edge) always comes first.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidates<H> {
    groups: Vec<(Option<EdgeKey>, Vec<H>)>,
}

impl<H> Default for Candidates<H> {
    fn default() -> Self {
        Self { groups: vec![] }
    }
}

impl<H> Candidates<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidates which start with one hypothesis that no edge produced.
    pub fn seeded(seed: H) -> Self {
        Self {
            groups: vec![(None, vec![seed])],
        }
    }

    /// Replaces the candidates produced by `edge`.
    pub fn replace(&mut self, edge: EdgeKey, hypotheses: Vec<H>) {
        match self.groups.iter_mut().find(|(key, _)| *key == Some(edge)) {
            Some((_, group)) => *group = hypotheses,
            None => self.groups.push((Some(edge), hypotheses)),
        }
    }

    /// All hypotheses with the edge that produced them, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Option<EdgeKey>, &H)> + '_ {
        self.groups
            .iter()
            .flat_map(|(edge, group)| group.iter().map(move |h| (*edge, h)))
    }

    pub fn hypotheses_mut(&mut self) -> impl Iterator<Item = &mut H> + '_ {
        self.groups.iter_mut().flat_map(|(_, group)| group.iter_mut())
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, group)| group.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The candidate with the highest score, with the edge that produced it and its score.
    ///
    /// The first inserted candidate wins ties.
    pub fn best_by(&self, score: impl Fn(&H) -> f64) -> Option<(Option<EdgeKey>, &H, f64)> {
        let mut best: Option<(Option<EdgeKey>, &H, f64)> = None;
        for (edge, hypothesis) in self.iter() {
            let s = score(hypothesis);
            if best.map_or(true, |(_, _, best_score)| s > best_score) {
                best = Some((edge, hypothesis, s));
            }
        }
        best
    }
}

impl Candidates<DepthFactorHypothesis> {
    /// Recomputes the votes of every candidate as its kernel weighted agreement with all candidates.
    ///
    /// Clusters of agreeing depth factors outvote isolated outliers.
    pub fn revote(&mut self, bandwidth: f64) {
        let factors: Vec<f64> = self.iter().map(|(_, h)| h.depth_factor).collect();
        for hypothesis in self.hypotheses_mut() {
            hypothesis.votes = factors
                .iter()
                .map(|&other| gaussian(hypothesis.depth_factor - other, bandwidth))
                .sum();
        }
    }
}

/// Produces the orthogonal planes through `anchors` which are consistent with the `surrounding` anchors.
///
/// `surrounding` holds every resolved anchor incident to the region component, including `anchors`.
pub fn plane_candidates(
    anchors: &[Vector3<f64>],
    surrounding: &[Vector3<f64>],
    frame: &TangentialFrame,
    vanishing_points: &VanishingPoints,
    scale: f64,
    settings: &ReconstructionSettings,
) -> Vec<PlaneHypothesis> {
    let merge_distance = settings.root_merge_distance * scale;
    let inlier_distance = settings.inlier_distance * scale;
    let mut roots: RTree<[f64; 3]> = RTree::new();
    let mut candidates = vec![];

    for (anchor, (class, normal)) in iproduct!(anchors, vanishing_points.iter().enumerate()) {
        let depth = anchor.dot(normal);
        let plane = Plane3::from_depth(*normal, depth);
        let root = plane.root();
        let root_key = [root.x, root.y, root.z];
        if !root_key.iter().all(|n| n.is_finite()) {
            continue;
        }
        if roots
            .locate_within_distance(root_key, merge_distance * merge_distance)
            .next()
            .is_some()
        {
            continue;
        }
        // Rejected roots still suppress their duplicates.
        roots.insert(root_key);

        if root.coords.norm() <= settings.minimum_root_distance * scale {
            continue;
        }
        let too_far = surrounding.iter().any(|a| {
            intersect_ray_plane(a, &plane).map_or(true, |p| {
                p.coords.norm() > settings.maximum_anchor_distance * scale
            })
        });
        if too_far {
            continue;
        }

        let mut vote = 0.0;
        let mut inliers = vec![];
        for a in surrounding {
            let distance = plane.distance_to(&Point3::from(*a));
            if distance <= inlier_distance {
                inliers.push(*a);
                vote += gaussian(distance, inlier_distance);
            }
        }
        candidates.push(PlaneHypothesis {
            geometry: PlaneGeometry::Orthogonal { class, depth },
            vote,
            inlier_convex_area: frame.visual_area(&inliers, true),
        });
    }
    candidates
}

/// Produces the depth factors which move the unit-scale `line` onto each of the resolved `anchors`.
///
/// Anchors whose ray runs parallel to the line produce no candidate.
pub fn depth_factor_candidates(anchors: &[Vector3<f64>], line: &Line3) -> Vec<DepthFactorHypothesis> {
    let line = line.infinite();
    anchors
        .iter()
        .filter_map(|anchor| {
            let on_unit_line = ray_point_nearest_line(anchor, &line)?;
            let depth_factor = anchor.norm() / on_unit_line.coords.norm();
            depth_factor
                .is_finite()
                .then(|| DepthFactorHypothesis::new(depth_factor))
        })
        .collect()
}

/// Regenerates the candidates `vertex` derives from the resolved anchors of `edge`.
pub fn update_vertex_from_edge<C>(
    graph: &mut MixedGraph,
    vertex: VertexKey,
    edge: EdgeKey,
    context: &Context<'_, C>,
) {
    let MixedGraph { vertices, edges } = graph;
    let edges = &*edges;
    let current = &mut vertices[vertex];
    let anchors = &edges[edge].anchors;
    match &mut current.kind {
        VertexKind::Region(region) => {
            let surrounding: Vec<Vector3<f64>> = current
                .edges
                .iter()
                .map(|&key| &edges[key])
                .filter(|e| e.determined)
                .flat_map(|e| e.anchors.iter().copied())
                .collect();
            let candidates = plane_candidates(
                anchors,
                &surrounding,
                &region.frame,
                &context.scene.vanishing_points,
                context.scale,
                context.settings,
            );
            trace!(
                "region component {} got {} plane candidates from {} surrounding anchors",
                region.component,
                candidates.len(),
                surrounding.len()
            );
            region.candidates.replace(edge, candidates);
        }
        VertexKind::Line(line) => {
            let unit_line = match edges[edge].kind {
                EdgeKind::RegionLine { line: index, .. } => context.scene.unit_line(index),
                EdgeKind::RegionRegion { .. } => None,
            };
            let unit_line = match unit_line {
                Some(unit_line) => unit_line,
                None => {
                    warn!(
                        "line component {} is attached to an edge without a unit-scale line",
                        line.component
                    );
                    return;
                }
            };
            let candidates = depth_factor_candidates(anchors, unit_line);
            line.candidates.replace(edge, candidates);
            line.candidates
                .revote(context.settings.depth_factor_bandwidth);
        }
    }
}

/// The value every line component starts with.
pub(crate) fn seed_depth_factor() -> (DepthFactorHypothesis, Candidates<DepthFactorHypothesis>) {
    (
        DepthFactorHypothesis::new(1.0),
        Candidates::seeded(DepthFactorHypothesis {
            depth_factor: 1.0,
            votes: SEED_DEPTH_FACTOR_VOTE,
        }),
    )
}
