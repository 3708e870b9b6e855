//! Reconstruction of planes and line depths in a Manhattan world from several calibrated views.
//!
//! Reconstruction starts by grouping elementary features into components which must share one
//! 3d hypothesis: overlapping regions lie on one plane and related lines share one depth factor.
//! Each component becomes a vertex of a [`MixedGraph`], and each piece of evidence shared by two
//! components becomes an edge carrying anchor rays.
//!
//! Every connected subgraph is then [spread](spread()) over: the most constrained vertex commits
//! its best hypothesis first, which resolves the anchors of its edges into 3d points and lets the
//! neighbors derive new hypotheses from them. Finally the scale of each subgraph is [refined](refine())
//! with one sparse least squares solve, because hypotheses fitted locally drift in scale.
//!
//! ```no_run
//! use manhattan_core::{PerspectiveCamera, Scene, VanishingPoints};
//! use manhattan_reconstruction::{ReconstructionSettings, Reconstructor};
//!
//! let scene: Scene<PerspectiveCamera> = Scene::new(VanishingPoints::axes());
//! let reconstruction = Reconstructor::new()
//!     .settings(ReconstructionSettings {
//!         max_anchors_per_edge: 4,
//!         ..Default::default()
//!     })
//!     .reconstruct(&scene);
//! for (region, plane) in reconstruction.region_planes() {
//!     println!("{} lies on {:?}", region, plane);
//! }
//! ```

mod context;
mod graph;
mod heap;
mod hypothesis;
mod partition;
mod refine;
mod settings;
mod spread;

pub use context::*;
pub use graph::*;
pub use heap::*;
pub use hypothesis::*;
pub use partition::*;
pub use refine::*;
pub use settings::*;
pub use spread::*;

use log::*;
use manhattan_core::{CameraModel, Line3, LineIndex, Plane3, RegionIndex, Scene};
use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// What happened to one connected subgraph.
#[derive(Debug, Clone)]
pub struct SubgraphReport {
    /// Components in the order they committed their values.
    pub commit_order: Vec<ComponentId>,
    pub edges: usize,
    pub refinement: Result<ScaleSolution, RefineError>,
}

/// The result of a reconstruction run.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub regions: Components<RegionIndex>,
    pub lines: Components<LineIndex>,
    /// Radius of the sphere enclosing all unit-scale lines.
    pub scale: f64,
    /// The committed plane of each region component.
    pub planes: Vec<Option<Plane3>>,
    /// The committed hypothesis of each region component.
    pub plane_hypotheses: Vec<Option<PlaneHypothesis>>,
    /// The committed depth factor of each line component.
    pub depth_factors: Vec<Option<f64>>,
    /// The scale correction refinement applied to each component, one where it failed.
    pub corrections: BTreeMap<ComponentId, f64>,
    pub subgraphs: Vec<SubgraphReport>,
    scaled_lines: BTreeMap<LineIndex, Line3>,
}

impl Reconstruction {
    /// The plane a region lies on.
    pub fn region_plane(&self, region: RegionIndex) -> Option<Plane3> {
        self.planes.get(self.regions.id(region)?).copied().flatten()
    }

    /// The unit-scale line of a line, moved to its reconstructed depth.
    pub fn scaled_line(&self, line: LineIndex) -> Option<Line3> {
        self.scaled_lines.get(&line).copied()
    }

    /// The scale correction refinement applied to a component.
    pub fn correction(&self, component: ComponentId) -> Option<f64> {
        self.corrections.get(&component).copied()
    }

    /// Every region with the plane it lies on, in index order.
    pub fn region_planes(&self) -> impl Iterator<Item = (RegionIndex, Plane3)> + '_ {
        self.regions.iter().flat_map(move |(id, members)| {
            let plane = self.planes.get(id).copied().flatten();
            members
                .iter()
                .filter_map(move |&region| plane.map(|plane| (region, plane)))
        })
    }

    /// Every line which has a unit-scale line, moved to its reconstructed depth.
    pub fn scaled_lines(&self) -> impl Iterator<Item = (LineIndex, Line3)> + '_ {
        self.scaled_lines.iter().map(|(&index, &line)| (index, line))
    }

    /// The subgraph report that contains a component.
    pub fn report(&self, component: ComponentId) -> Option<&SubgraphReport> {
        self.subgraphs
            .iter()
            .find(|report| report.commit_order.contains(&component))
    }
}

/// Runs the whole reconstruction: partitioning, graph construction, spreading and refinement.
pub struct Reconstructor {
    settings: ReconstructionSettings,
    seeding: Box<dyn SeedingPolicy>,
    observer: Box<dyn SpreadObserver>,
}

impl Default for Reconstructor {
    fn default() -> Self {
        Self {
            settings: ReconstructionSettings::default(),
            seeding: Box::new(LargestLineComponent),
            observer: Box::new(NoObserver),
        }
    }
}

impl Reconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(self, settings: ReconstructionSettings) -> Self {
        Self { settings, ..self }
    }

    /// Chooses which vertex of each subgraph commits first.
    pub fn seeding(self, seeding: impl SeedingPolicy + 'static) -> Self {
        Self {
            seeding: Box::new(seeding),
            ..self
        }
    }

    /// Receives every commit of every subgraph.
    pub fn observer(self, observer: impl SpreadObserver + 'static) -> Self {
        Self {
            observer: Box::new(observer),
            ..self
        }
    }

    pub fn reconstruct<C>(&self, scene: &Scene<C>) -> Reconstruction
    where
        C: CameraModel + Sync,
    {
        let regions = region_components(scene, self.settings.region_overlap_threshold);
        let lines = line_components(scene, self.settings.minimum_junction_weight);
        let context = Context::new(scene, &self.settings, &regions, &lines);
        let scale = context.scale;
        info!("reconstructing scene with scale {}", scale);

        let subgraphs = MixedGraph::build(&context).split_connected();

        #[cfg(feature = "parallel")]
        let processed: Vec<(MixedGraph, SubgraphReport)> = subgraphs
            .into_par_iter()
            .map(|graph| self.process(graph, &context))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let processed: Vec<(MixedGraph, SubgraphReport)> = subgraphs
            .into_iter()
            .map(|graph| self.process(graph, &context))
            .collect();

        let mut planes = vec![None; regions.count()];
        let mut plane_hypotheses = vec![None; regions.count()];
        let mut depth_factors = vec![None; lines.count()];
        let mut corrections = BTreeMap::new();
        let mut reports = Vec::with_capacity(processed.len());
        for (graph, report) in processed {
            for (_, vertex) in graph.vertices() {
                corrections.insert(vertex.component(), vertex.correction);
                match &vertex.kind {
                    VertexKind::Region(region) => {
                        planes[region.component] =
                            Some(region.current.geometry.plane(&scene.vanishing_points));
                        plane_hypotheses[region.component] = Some(region.current);
                    }
                    VertexKind::Line(line) => {
                        depth_factors[line.component] = Some(line.current.depth_factor);
                    }
                }
            }
            reports.push(report);
        }

        let scaled_lines = scene
            .unit_lines
            .iter()
            .filter_map(|(&index, &unit)| {
                let factor = depth_factors.get(lines.id(index)?).copied().flatten()?;
                Some((index, unit * factor))
            })
            .collect();

        Reconstruction {
            regions,
            lines,
            scale,
            planes,
            plane_hypotheses,
            depth_factors,
            corrections,
            subgraphs: reports,
            scaled_lines,
        }
    }

    fn process<C>(&self, mut graph: MixedGraph, context: &Context<'_, C>) -> (MixedGraph, SubgraphReport) {
        let order = spread(&mut graph, context, &*self.seeding, &*self.observer);
        let commit_order = order
            .iter()
            .filter_map(|&key| graph.vertex(key).map(Vertex::component))
            .collect();
        let refinement = refine(&mut graph, context.scene, self.settings.max_anchors_per_edge);
        if let Err(e) = &refinement {
            warn!(
                "leaving the scale of a subgraph with {} vertices unrefined: {}",
                graph.vertex_count(),
                e
            );
        }
        let report = SubgraphReport {
            commit_order,
            edges: graph.edge_count(),
            refinement,
        };
        (graph, report)
    }
}
