use crate::{
    update_vertex_from_edge, Context, EdgeKey, EdgeKind, MaxHeap, MixedGraph,
    ReconstructionSettings, Vertex, VertexKey, VertexKind,
};
use core::f64::consts::PI;
use log::*;
use manhattan_geom::{intersect_ray_plane, ray_point_nearest_line};
use slotmap::SecondaryMap;

/// Picks the vertex which is committed first, regardless of its priority.
pub trait SeedingPolicy: Send + Sync {
    fn seed(&self, graph: &MixedGraph) -> Option<VertexKey>;
}

/// Seeds the largest line component (by member count), which fixes the scale of the
/// subgraph to its unit-scale lines. The first one wins ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct LargestLineComponent;

impl SeedingPolicy for LargestLineComponent {
    fn seed(&self, graph: &MixedGraph) -> Option<VertexKey> {
        let mut best: Option<(VertexKey, usize)> = None;
        for (key, vertex) in graph.vertices() {
            if let VertexKind::Line(line) = &vertex.kind {
                if best.map_or(true, |(_, size)| line.members.len() > size) {
                    best = Some((key, line.members.len()));
                }
            }
        }
        best.map(|(key, _)| key)
    }
}

/// Lets the priorities alone decide the order.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSeed;

impl SeedingPolicy for NoSeed {
    fn seed(&self, _: &MixedGraph) -> Option<VertexKey> {
        None
    }
}

/// Watches the spreading process.
///
/// Subgraphs may be spread from several threads at once, all reporting to the same observer.
pub trait SpreadObserver: Send + Sync {
    /// Called right after `vertex` committed its value with the given priority.
    fn committed(&self, _graph: &MixedGraph, _vertex: VertexKey, _priority: f64) {}
}

/// Observes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObserver;

impl SpreadObserver for NoObserver {}

/// Fraction of a vertex's anchors that have already been resolved by its neighbors.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnchoredRatio {
    pub numerator: f64,
    pub denominator: f64,
}

impl AnchoredRatio {
    pub fn value(&self) -> f64 {
        if self.denominator == 0.0 {
            0.0
        } else {
            self.numerator / self.denominator
        }
    }
}

/// Anchored ratios of a vertex, split by the kind of edge the anchors come from.
///
/// Line components only have region-line edges, so they only use `with_lines`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnchoredRatios {
    pub with_regions: AnchoredRatio,
    pub with_lines: AnchoredRatio,
}

/// How urgently an undetermined vertex should be committed.
pub fn priority(vertex: &Vertex, ratios: &AnchoredRatios, settings: &ReconstructionSettings) -> f64 {
    match &vertex.kind {
        VertexKind::Region(region) => {
            if region.convex_visual_area == 0.0 {
                return 0.0;
            }
            let best = match region.best_candidate() {
                Some((_, best, _)) => best,
                None => return 0.0,
            };
            let root = region.frame.plane.root().coords.norm();
            let area_ratio = region.visual_area / (4.0 * PI * root * root);
            let support = if best.inlier_convex_area / region.convex_visual_area
                > settings.inlier_area_ratio_threshold
            {
                1.0
            } else {
                1e-2
            };
            let priority = (ratios.with_regions.value() * 0.7
                + ratios.with_lines.value() * 0.29
                + area_ratio * 0.01)
                * support;
            if priority.is_finite() {
                priority
            } else {
                0.0
            }
        }
        VertexKind::Line(_) => ratios.with_lines.value(),
    }
}

/// Commits one value to every vertex of a connected graph, most constrained vertices first.
///
/// Every time a vertex commits, the anchors of its undetermined edges are resolved against its
/// geometry, and the vertex on the other end of each such edge derives new candidates from them.
/// Returns the vertices in the order they were committed.
pub fn spread<C>(
    graph: &mut MixedGraph,
    context: &Context<'_, C>,
    seeding: &dyn SeedingPolicy,
    observer: &dyn SpreadObserver,
) -> Vec<VertexKey> {
    let settings = context.settings;
    let mut ratios: SecondaryMap<VertexKey, AnchoredRatios> = graph
        .vertices
        .keys()
        .map(|key| (key, AnchoredRatios::default()))
        .collect();
    for edge in graph.edges.values() {
        let count = edge.anchors.len() as f64;
        for endpoint in edge.endpoints {
            match edge.kind {
                EdgeKind::RegionRegion { .. } => ratios[endpoint].with_regions.denominator += count,
                EdgeKind::RegionLine { .. } => ratios[endpoint].with_lines.denominator += count,
            }
        }
    }

    let mut heap: MaxHeap<VertexKey> = graph
        .vertices
        .iter()
        .map(|(key, vertex)| (key, priority(vertex, &ratios[key], settings)))
        .collect();
    if let Some(seed) = seeding.seed(graph) {
        heap.set_score(seed, f64::INFINITY);
    }

    let mut order = Vec::with_capacity(graph.vertices.len());
    while let Some((current, score)) = heap.pop() {
        graph.vertices[current].commit();
        debug!(
            "committed {:?} with priority {}",
            graph.vertices[current].component(),
            score
        );
        observer.committed(graph, current, score);
        order.push(current);

        let from_region = graph.vertices[current].is_region();
        let incident = graph.vertices[current].edges.clone();
        for edge in incident {
            if graph.edges[edge].determined {
                continue;
            }
            resolve_edge(graph, edge, current, context);

            let other = match graph.other_endpoint(edge, current) {
                Some(other) => other,
                None => continue,
            };
            if graph.vertices[other].determined {
                continue;
            }
            update_vertex_from_edge(graph, other, edge, context);

            let resolved = graph.edges[edge].anchors.len() as f64;
            if from_region && graph.vertices[other].is_region() {
                ratios[other].with_regions.numerator += resolved;
            } else {
                ratios[other].with_lines.numerator += resolved;
            }
            if heap.contains(other) {
                heap.set_score(other, priority(&graph.vertices[other], &ratios[other], settings));
            }
        }
    }
    order
}

/// Turns the anchor directions of `edge` into points on the committed geometry of `vertex`
/// and marks the edge as determined.
///
/// Anchors whose ray never meets the geometry are dropped.
fn resolve_edge<C>(graph: &mut MixedGraph, edge: EdgeKey, vertex: VertexKey, context: &Context<'_, C>) {
    let MixedGraph { vertices, edges } = graph;
    let edge = &mut edges[edge];
    let before = edge.anchors.len();
    match &vertices[vertex].kind {
        VertexKind::Region(region) => {
            let plane = region
                .current
                .geometry
                .plane(&context.scene.vanishing_points);
            edge.anchors = edge
                .anchors
                .iter()
                .filter_map(|anchor| intersect_ray_plane(anchor, &plane))
                .map(|point| point.coords)
                .collect();
        }
        VertexKind::Line(line) => {
            let index = match edge.kind {
                EdgeKind::RegionLine { line, .. } => line,
                EdgeKind::RegionRegion { .. } => {
                    warn!("line component {} owns a region edge", line.component);
                    edge.determined = true;
                    return;
                }
            };
            match context.scene.unit_line(index) {
                Some(&unit_line) => {
                    let scaled = (unit_line * line.current.depth_factor).infinite();
                    edge.anchors = edge
                        .anchors
                        .iter()
                        .filter_map(|anchor| ray_point_nearest_line(anchor, &scaled))
                        .map(|point| point.coords)
                        .collect();
                }
                None => {
                    warn!("{} has no unit-scale line to resolve anchors against", index);
                    edge.anchors.clear();
                }
            }
        }
    }
    if edge.anchors.len() != before {
        trace!(
            "dropped {} anchors which do not meet the committed geometry",
            before - edge.anchors.len()
        );
    }
    edge.determined = true;
}
