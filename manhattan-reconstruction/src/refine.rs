use crate::{ComponentId, EdgeKind, MixedGraph, VertexKey, VertexKind};
use average::Mean;
use log::*;
use manhattan_core::{nalgebra::Vector3, Line3, Plane3, Scene};
use manhattan_geom::{depth_on_plane, ray_point_nearest_line};
use manhattan_optimize::{uniform_subsample, SolveError, WeightedLeastSquares};
use slotmap::SecondaryMap;
use thiserror::Error;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Upper bound of the weight an equation gets for standing in for skipped anchors.
const MAXIMUM_EQUATION_WEIGHT: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RefineError {
    #[error("failed to solve for the scale corrections: {0}")]
    Solve(#[from] SolveError),
    #[error("the solved correction of the first vertex is {0}, which cannot be pinned to one")]
    DegeneratePin(f64),
    #[error("the mean of the solved corrections is {0}")]
    DegenerateMean(f64),
}

/// The outcome of refining the scale of one subgraph.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ScaleSolution {
    /// The solved correction of every vertex, with the first one pinned to exactly `1.0`.
    pub solution: Vec<(ComponentId, f64)>,
    /// Mean of the solution. The geometry of every vertex is scaled by its solution over the mean.
    pub mean: f64,
    /// The number of equations in the solved system, including the pin.
    pub equations: usize,
}

impl ScaleSolution {
    /// The solved correction of a component.
    pub fn correction(&self, component: ComponentId) -> Option<f64> {
        self.solution
            .iter()
            .find(|(c, _)| *c == component)
            .map(|&(_, x)| x)
    }
}

/// The depth along `anchor` at which it meets the committed geometry of a vertex.
enum Depth {
    Plane(Plane3),
    Line(Line3),
}

impl Depth {
    fn along(&self, anchor: &Vector3<f64>) -> Option<f64> {
        match self {
            Self::Plane(plane) => depth_on_plane(anchor, plane),
            Self::Line(line) => {
                ray_point_nearest_line(anchor, &line.infinite()).map(|p| p.coords.norm())
            }
        }
    }
}

/// Reconciles the scales committed by spreading with one sparse weighted least squares solve.
///
/// Every anchor shared by two vertices must lie at the same depth on both of their geometries,
/// up to an unknown scale correction per vertex. At most `max_anchors_per_edge` anchors of each
/// edge contribute, weighted by how many anchors they stand in for. The first vertex is pinned
/// to a correction of one. When the solve fails, the graph is left untouched.
pub fn refine<C>(
    graph: &mut MixedGraph,
    scene: &Scene<C>,
    max_anchors_per_edge: usize,
) -> Result<ScaleSolution, RefineError> {
    if graph.vertices.len() <= 1 {
        return Ok(ScaleSolution {
            solution: graph
                .vertices
                .values()
                .map(|vertex| (vertex.component(), 1.0))
                .collect(),
            mean: 1.0,
            equations: 0,
        });
    }

    let columns: SecondaryMap<VertexKey, usize> = graph
        .vertices
        .keys()
        .enumerate()
        .map(|(column, key)| (key, column))
        .collect();
    let vanishing_points = &scene.vanishing_points;
    let depth_of = |key: VertexKey, edge: &EdgeKind| -> Option<Depth> {
        match &graph.vertices[key].kind {
            VertexKind::Region(region) => {
                Some(Depth::Plane(region.current.geometry.plane(vanishing_points)))
            }
            VertexKind::Line(line) => match edge {
                EdgeKind::RegionLine { line: index, .. } => scene
                    .unit_line(*index)
                    .map(|&unit| Depth::Line(unit * line.current.depth_factor)),
                EdgeKind::RegionRegion { .. } => None,
            },
        }
    };

    let mut system = WeightedLeastSquares::new(graph.vertices.len());
    system.add_equation([(0, 1.0)], 1.0, 1.0);
    for edge in graph.edges.values() {
        let [a, b] = edge.endpoints;
        let (depth_a, depth_b) = match (depth_of(a, &edge.kind), depth_of(b, &edge.kind)) {
            (Some(depth_a), Some(depth_b)) => (depth_a, depth_b),
            _ => {
                warn!("skipping edge {:?} without geometry on both ends", edge.kind);
                continue;
            }
        };
        let sampled = uniform_subsample(&edge.anchors, max_anchors_per_edge);
        if sampled.is_empty() {
            continue;
        }
        let weight = (edge.anchors.len() as f64 / sampled.len() as f64)
            .clamp(1.0, MAXIMUM_EQUATION_WEIGHT);
        for anchor in &sampled {
            match (depth_a.along(anchor), depth_b.along(anchor)) {
                (Some(da), Some(db)) if da.is_finite() && db.is_finite() => {
                    system.add_equation([(columns[a], da), (columns[b], -db)], 0.0, weight);
                }
                _ => warn!(
                    "skipping anchor {:?} of edge {:?} with non-finite depths",
                    anchor, edge.kind
                ),
            }
        }
    }
    info!(
        "refining the scale of {} vertices with {} equations",
        system.variables(),
        system.equations()
    );

    let raw = system.solve()?;
    let pin = raw[0];
    if !pin.is_normal() {
        return Err(RefineError::DegeneratePin(pin));
    }
    let solution: Vec<f64> = raw.iter().map(|x| x / pin).collect();
    let mean = solution.iter().copied().collect::<Mean>().mean();
    if !mean.is_normal() {
        return Err(RefineError::DegenerateMean(mean));
    }
    debug!("solved scale corrections with mean {}", mean);

    for ((_, vertex), &x) in graph.vertices.iter_mut().zip(&solution) {
        let correction = x / mean;
        vertex.correction *= correction;
        match &mut vertex.kind {
            VertexKind::Region(region) => {
                region.current.geometry = region.current.geometry.scale(correction)
            }
            VertexKind::Line(line) => line.current.depth_factor *= correction,
        }
    }

    Ok(ScaleSolution {
        solution: graph
            .vertices
            .values()
            .map(|vertex| vertex.component())
            .zip(solution)
            .collect(),
        mean,
        equations: system.equations(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Candidates, PlaneGeometry, PlaneHypothesis, RegionVertex, Vertex};
    use approx::assert_relative_eq;
    use manhattan_core::{PerspectiveCamera, VanishingPoints};
    use manhattan_geom::TangentialFrame;

    fn plane_vertex(component: usize, class: usize, depth: f64) -> Vertex {
        let frame = TangentialFrame::new(Vector3::x_axis());
        let mut current = PlaneHypothesis::seed(frame.plane);
        current.geometry = PlaneGeometry::Orthogonal { class, depth };
        Vertex::new(VertexKind::Region(RegionVertex {
            component,
            members: vec![],
            frame,
            visual_area: 0.0,
            convex_visual_area: 0.0,
            candidates: Candidates::new(),
            current,
        }))
    }

    fn plane_of(graph: &MixedGraph, key: VertexKey) -> Plane3 {
        match &graph.vertices[key].kind {
            VertexKind::Region(region) => region.current.geometry.plane(&VanishingPoints::axes()),
            VertexKind::Line(_) => unreachable!(),
        }
    }

    /// Two planes at depths 10 and 20 sharing anchors along a vertical image line.
    fn inconsistent_planes() -> (MixedGraph, [VertexKey; 2], Vec<Vector3<f64>>) {
        let mut graph = MixedGraph::default();
        let p1 = graph.vertices.insert(plane_vertex(0, 0, 10.0));
        let p2 = graph.vertices.insert(plane_vertex(1, 1, 20.0));
        let anchors: Vec<Vector3<f64>> = (0..5)
            .map(|i| Vector3::new(1.0, 1.0, -0.2 + 0.1 * i as f64))
            .collect();
        graph.insert_edge(
            EdgeKind::RegionRegion {
                view: 0,
                regions: [0, 1],
            },
            [p1, p2],
            anchors.clone(),
        );
        (graph, [p1, p2], anchors)
    }

    #[test]
    fn reconciles_inconsistent_depths() {
        let scene = Scene::<PerspectiveCamera>::new(VanishingPoints::axes());
        let (mut graph, [p1, p2], anchors) = inconsistent_planes();
        // Every anchor meets the first plane at half the depth of the second.
        let k = 0.5;

        let solution = refine(&mut graph, &scene, 2).unwrap();
        let x1 = solution.correction(ComponentId::Region(0)).unwrap();
        let x2 = solution.correction(ComponentId::Region(1)).unwrap();
        assert_eq!(x1, 1.0);
        assert_relative_eq!(x1 / x2, 1.0 / k, epsilon = 1e-9);
        assert_relative_eq!(solution.mean, 0.75, epsilon = 1e-9);
        // The pin and two sampled anchors.
        assert_eq!(solution.equations, 3);

        let (plane1, plane2) = (plane_of(&graph, p1), plane_of(&graph, p2));
        for anchor in &anchors {
            assert_relative_eq!(
                depth_on_plane(anchor, &plane1).unwrap(),
                depth_on_plane(anchor, &plane2).unwrap(),
                epsilon = 1e-9
            );
        }
        assert_relative_eq!(graph.vertices[p1].correction, 1.0 / 0.75, epsilon = 1e-9);
    }

    #[test]
    fn failed_solve_leaves_geometry_untouched() {
        let scene = Scene::<PerspectiveCamera>::new(VanishingPoints::axes());
        let mut graph = MixedGraph::default();
        let p1 = graph.vertices.insert(plane_vertex(0, 0, 10.0));
        graph.vertices.insert(plane_vertex(1, 1, 20.0));
        let before = plane_of(&graph, p1);
        assert_eq!(
            refine(&mut graph, &scene, 2),
            Err(RefineError::Solve(SolveError::NotPositiveDefinite))
        );
        assert_eq!(plane_of(&graph, p1), before);
        assert_eq!(graph.vertices[p1].correction, 1.0);
    }

    #[test]
    fn single_vertex_is_unchanged() {
        let scene = Scene::<PerspectiveCamera>::new(VanishingPoints::axes());
        let mut graph = MixedGraph::default();
        let p1 = graph.vertices.insert(plane_vertex(3, 2, -4.0));
        let solution = refine(&mut graph, &scene, 2).unwrap();
        assert_eq!(solution.solution, vec![(ComponentId::Region(3), 1.0)]);
        assert_eq!(solution.equations, 0);
        assert_eq!(plane_of(&graph, p1).depth(), -4.0);
    }
}
