use crate::{
    connected_components, hypothesis::seed_depth_factor, Candidates, Context,
    DepthFactorHypothesis, PlaneHypothesis,
};
use log::*;
use manhattan_core::{
    nalgebra::{Vector3, UnitVector3},
    CameraModel, LineIndex, RegionIndex,
};
use manhattan_geom::TangentialFrame;
use slotmap::{new_key_type, DenseSlotMap, SecondaryMap};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

new_key_type! {
    pub struct VertexKey;
    pub struct EdgeKey;
}

/// Identifies the component a vertex stands for, independent of the graph it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum ComponentId {
    Region(usize),
    Line(usize),
}

/// A region component: all the regions which must lie on the same plane.
#[derive(Debug, Clone)]
pub struct RegionVertex {
    pub component: usize,
    pub members: Vec<RegionIndex>,
    /// Frame touching the unit sphere at the mean direction of the member centers.
    pub frame: TangentialFrame,
    /// Visual area of the outer contours of the members.
    pub visual_area: f64,
    /// Visual area of the convex hull of the outer contours of the members.
    pub convex_visual_area: f64,
    pub candidates: Candidates<PlaneHypothesis>,
    pub current: PlaneHypothesis,
}

impl RegionVertex {
    pub fn best_candidate(&self) -> Option<(Option<EdgeKey>, &PlaneHypothesis, f64)> {
        self.candidates
            .best_by(|h| h.score(self.convex_visual_area))
    }
}

/// A line component: all the lines which share one depth factor.
#[derive(Debug, Clone)]
pub struct LineVertex {
    pub component: usize,
    pub members: Vec<LineIndex>,
    pub candidates: Candidates<DepthFactorHypothesis>,
    pub current: DepthFactorHypothesis,
}

impl LineVertex {
    pub fn best_candidate(&self) -> Option<(Option<EdgeKey>, &DepthFactorHypothesis, f64)> {
        self.candidates.best_by(|h| h.votes)
    }
}

#[derive(Debug, Clone)]
pub enum VertexKind {
    Region(RegionVertex),
    Line(LineVertex),
}

#[derive(Debug, Clone)]
pub struct Vertex {
    pub kind: VertexKind,
    /// Incident edges in insertion order.
    pub edges: Vec<EdgeKey>,
    pub determined: bool,
    /// Accumulated scale correction applied by refinement.
    pub correction: f64,
}

impl Vertex {
    pub(crate) fn new(kind: VertexKind) -> Self {
        Self {
            kind,
            edges: vec![],
            determined: false,
            correction: 1.0,
        }
    }

    pub fn component(&self) -> ComponentId {
        match &self.kind {
            VertexKind::Region(region) => ComponentId::Region(region.component),
            VertexKind::Line(line) => ComponentId::Line(line.component),
        }
    }

    pub fn is_region(&self) -> bool {
        matches!(self.kind, VertexKind::Region(_))
    }

    /// Commits the best candidate as the current value and marks the vertex as determined.
    ///
    /// A vertex without candidates keeps its current value.
    pub fn commit(&mut self) {
        match &mut self.kind {
            VertexKind::Region(region) => {
                if let Some((_, &best, _)) = region.best_candidate() {
                    region.current = best;
                }
            }
            VertexKind::Line(line) => {
                if let Some((_, &best, _)) = line.best_candidate() {
                    line.current = best;
                }
            }
        }
        self.determined = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Two regions of one view which share a boundary.
    RegionRegion { view: usize, regions: [usize; 2] },
    /// A line passing near a region.
    RegionLine {
        region: RegionIndex,
        line: LineIndex,
    },
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub kind: EdgeKind,
    /// For region-line edges the region vertex comes first.
    pub endpoints: [VertexKey; 2],
    /// Directions of the anchors until the edge is determined, and points on the
    /// geometry of the vertex which determined it afterwards.
    pub anchors: Vec<Vector3<f64>>,
    pub determined: bool,
}

/// A graph whose vertices are region and line components and whose edges carry the
/// anchors shared by two components.
#[derive(Debug, Clone, Default)]
pub struct MixedGraph {
    pub(crate) vertices: DenseSlotMap<VertexKey, Vertex>,
    pub(crate) edges: DenseSlotMap<EdgeKey, Edge>,
}

impl MixedGraph {
    /// Creates one vertex per component of the context and one edge per region boundary
    /// and region-line connection.
    pub fn build<C>(context: &Context<'_, C>) -> Self
    where
        C: CameraModel,
    {
        let scene = context.scene;
        let mut graph = Self::default();

        let region_vertices: Vec<VertexKey> = context
            .regions
            .iter()
            .map(|(component, members)| {
                graph
                    .vertices
                    .insert(Vertex::new(VertexKind::Region(region_vertex(
                        context, component, members,
                    ))))
            })
            .collect();

        let line_vertices: Vec<VertexKey> = context
            .lines
            .iter()
            .map(|(component, members)| {
                let (current, candidates) = seed_depth_factor();
                graph.vertices.insert(Vertex::new(VertexKind::Line(LineVertex {
                    component,
                    members: members.to_vec(),
                    candidates,
                    current,
                })))
            })
            .collect();

        for (view_id, view) in scene.views.iter().enumerate() {
            for boundary in &view.boundaries {
                let [a, b] = boundary.regions.map(|handle| {
                    context
                        .regions
                        .id(RegionIndex::new(view_id, handle))
                        .map(|id| region_vertices[id])
                });
                let (a, b) = match (a, b) {
                    (Some(a), Some(b)) => (a, b),
                    _ => {
                        warn!(
                            "skipping boundary between unknown regions {:?} of view {}",
                            boundary.regions, view_id
                        );
                        continue;
                    }
                };
                if a == b {
                    trace!(
                        "boundary between regions {:?} of view {} lies inside one component",
                        boundary.regions,
                        view_id
                    );
                    continue;
                }
                let anchors = boundary
                    .samples
                    .iter()
                    .map(|&sample| view.camera.spatial_direction(sample).into_inner())
                    .collect();
                graph.insert_edge(
                    EdgeKind::RegionRegion {
                        view: view_id,
                        regions: boundary.regions,
                    },
                    [a, b],
                    anchors,
                );
            }
        }

        for connection in &scene.region_line_connections {
            let region = context.regions.id(connection.region);
            let line = context.lines.id(connection.line);
            let (region, line) = match (region, line) {
                (Some(region), Some(line)) => (region_vertices[region], line_vertices[line]),
                _ => {
                    warn!(
                        "skipping connection between unknown {} and {}",
                        connection.region, connection.line
                    );
                    continue;
                }
            };
            if scene.unit_line(connection.line).is_none() {
                warn!(
                    "skipping connection of {} to {} which has no unit-scale line",
                    connection.region, connection.line
                );
                continue;
            }
            graph.insert_edge(
                EdgeKind::RegionLine {
                    region: connection.region,
                    line: connection.line,
                },
                [region, line],
                connection.anchors.iter().map(|a| a.into_inner()).collect(),
            );
        }

        info!(
            "built mixed graph with {} vertices and {} edges",
            graph.vertices.len(),
            graph.edges.len()
        );
        graph
    }

    pub(crate) fn insert_edge(&mut self, kind: EdgeKind, endpoints: [VertexKey; 2], anchors: Vec<Vector3<f64>>) {
        let key = self.edges.insert(Edge {
            kind,
            endpoints,
            anchors,
            determined: false,
        });
        for endpoint in endpoints {
            self.vertices[endpoint].edges.push(key);
        }
    }

    /// Splits the graph into its maximal connected subgraphs.
    ///
    /// Vertices and edges keep their relative order, and the subgraphs are ordered by their first vertex.
    pub fn split_connected(self) -> Vec<MixedGraph> {
        let graph = &self;
        let components = connected_components(graph.vertices.keys(), |vertex| {
            graph.vertices[vertex]
                .edges
                .iter()
                .filter_map(move |&edge| graph.other_endpoint(edge, vertex))
        });

        let Self {
            mut vertices,
            edges,
        } = self;
        let mut subgraphs: Vec<MixedGraph> = Vec::with_capacity(components.count());
        let mut keys: SecondaryMap<VertexKey, (usize, VertexKey)> = SecondaryMap::new();
        for (id, members) in components.iter() {
            let mut subgraph = MixedGraph::default();
            for &old in members {
                if let Some(mut vertex) = vertices.remove(old) {
                    vertex.edges.clear();
                    keys.insert(old, (id, subgraph.vertices.insert(vertex)));
                }
            }
            subgraphs.push(subgraph);
        }

        for (_, edge) in edges {
            let [a, b] = edge.endpoints;
            if let (Some(&(id, a)), Some(&(_, b))) = (keys.get(a), keys.get(b)) {
                subgraphs[id].insert_edge(edge.kind, [a, b], edge.anchors);
            }
        }

        info!(
            "split mixed graph into {} connected subgraphs, the largest with {} vertices",
            subgraphs.len(),
            subgraphs.iter().map(|g| g.vertices.len()).max().unwrap_or(0)
        );
        subgraphs
    }

    /// The endpoint of `edge` which is not `vertex`.
    pub fn other_endpoint(&self, edge: EdgeKey, vertex: VertexKey) -> Option<VertexKey> {
        let [a, b] = self.edges.get(edge)?.endpoints;
        if a == vertex {
            Some(b)
        } else if b == vertex {
            Some(a)
        } else {
            None
        }
    }

    pub fn vertex(&self, key: VertexKey) -> Option<&Vertex> {
        self.vertices.get(key)
    }

    pub fn edge(&self, key: EdgeKey) -> Option<&Edge> {
        self.edges.get(key)
    }

    /// Iterates over the vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexKey, &Vertex)> + '_ {
        self.vertices.iter()
    }

    /// Iterates over the edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeKey, &Edge)> + '_ {
        self.edges.iter()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

fn region_vertex<C>(context: &Context<'_, C>, component: usize, members: &[RegionIndex]) -> RegionVertex
where
    C: CameraModel,
{
    let scene = context.scene;
    let mut centers = vec![];
    let mut contour = vec![];
    for &index in members {
        let view = match scene.views.get(index.view) {
            Some(view) => view,
            None => continue,
        };
        let center = view.region_center_direction(index.handle);
        let (center, region) = match (center, scene.region(index)) {
            (Some(center), Some(region)) => (center, region),
            _ => continue,
        };
        centers.push(center.into_inner());
        contour.extend(
            region
                .contour
                .iter()
                .map(|&pixel| view.camera.spatial_direction(pixel).into_inner()),
        );
    }

    let frame = TangentialFrame::from_directions(centers).unwrap_or_else(|| {
        warn!(
            "centers of region component {} cancel out, using the forward direction",
            component
        );
        TangentialFrame::new(UnitVector3::new_normalize(Vector3::z()))
    });
    RegionVertex {
        component,
        members: members.to_vec(),
        frame,
        visual_area: frame.visual_area(&contour, false),
        convex_visual_area: frame.visual_area(&contour, true),
        candidates: Candidates::new(),
        current: PlaneHypothesis::seed(frame.plane),
    }
}
