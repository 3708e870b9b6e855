mod common;

use approx::assert_relative_eq;
use common::*;
use manhattan_core::{nalgebra::Point3, LineIndex, RegionIndex, Scene};
use manhattan_optimize::SolveError;
use manhattan_reconstruction::{
    ComponentId, MixedGraph, Reconstruction, Reconstructor, RefineError, SpreadObserver, VertexKey,
};
use std::sync::{Arc, Mutex};

const EPSILON: f64 = 1e-6;

#[test]
fn recovers_room_corner() {
    init_logging();
    let scene = room_corner(false);
    let reconstruction = Reconstructor::new().reconstruct(&scene);

    assert_eq!(reconstruction.regions.count(), 3);
    assert_eq!(reconstruction.lines.count(), 1);
    assert_relative_eq!(reconstruction.scale, 2.15, epsilon = 1e-9);
    assert_eq!(reconstruction.subgraphs.len(), 1);

    for (handle, (class, depth)) in true_planes().into_iter().enumerate() {
        let plane = reconstruction
            .region_plane(RegionIndex::new(0, handle))
            .unwrap();
        let normal = scene.vanishing_points[class];
        assert_relative_eq!(plane.normal.dot(&normal).abs(), 1.0, epsilon = EPSILON);
        assert_relative_eq!(plane.depth() * plane.normal.dot(&normal), depth, epsilon = EPSILON);
    }

    assert_relative_eq!(reconstruction.depth_factors[0].unwrap(), 1.0, epsilon = EPSILON);
    for (handle, (line, _)) in true_lines().into_iter().enumerate() {
        let scaled = reconstruction.scaled_line(LineIndex::new(0, handle)).unwrap();
        assert_relative_eq!(scaled.first, line.first, epsilon = EPSILON);
        assert_relative_eq!(scaled.second, line.second, epsilon = EPSILON);
    }
}

#[test]
fn consistent_scene_needs_no_correction() {
    init_logging();
    let scene = room_corner(false);
    let reconstruction = Reconstructor::new().reconstruct(&scene);
    let report = reconstruction.report(ComponentId::Line(0)).unwrap();
    assert_eq!(report.edges, 9);
    assert_eq!(report.commit_order[0], ComponentId::Line(0));

    let refinement = report.refinement.as_ref().unwrap();
    // The pin and two anchors of every edge.
    assert_eq!(refinement.equations, 19);
    assert_eq!(refinement.solution[0], (ComponentId::Region(0), 1.0));
    assert_eq!(refinement.solution.len(), 4);
    for &(_, x) in &refinement.solution {
        assert_relative_eq!(x, 1.0, epsilon = EPSILON);
    }
    assert_relative_eq!(refinement.mean, 1.0, epsilon = EPSILON);

    assert_eq!(reconstruction.corrections.len(), 4);
    for (&component, &correction) in &reconstruction.corrections {
        assert_relative_eq!(correction, 1.0, epsilon = EPSILON);
        assert_eq!(reconstruction.correction(component), Some(correction));
    }
}

#[test]
fn failed_subgraph_leaves_others_refined() {
    init_logging();
    let mut scene = room_corner(false);
    let [a, b] = add_unanchored_pair(&mut scene);
    let reconstruction = Reconstructor::new().reconstruct(&scene);
    assert_eq!(reconstruction.subgraphs.len(), 2);

    let pair = reconstruction.regions.id(RegionIndex::new(0, a)).unwrap();
    assert_ne!(reconstruction.regions.id(RegionIndex::new(0, b)), Some(pair));
    let failed = reconstruction.report(ComponentId::Region(pair)).unwrap();
    assert_eq!(
        failed.refinement,
        Err(RefineError::Solve(SolveError::NotPositiveDefinite))
    );
    assert_eq!(reconstruction.correction(ComponentId::Region(pair)), Some(1.0));

    let corner = reconstruction.report(ComponentId::Line(0)).unwrap();
    assert!(corner.refinement.is_ok());
    assert_eq!(corner.commit_order.len(), 4);
    for (handle, (class, depth)) in true_planes().into_iter().enumerate() {
        let plane = reconstruction
            .region_plane(RegionIndex::new(0, handle))
            .unwrap();
        let normal = scene.vanishing_points[class];
        assert_relative_eq!(plane.depth() * plane.normal.dot(&normal), depth, epsilon = EPSILON);
    }
    assert_relative_eq!(
        reconstruction.correction(ComponentId::Line(0)).unwrap(),
        1.0,
        epsilon = EPSILON
    );
}

#[test]
fn scale_follows_unit_lines() {
    init_logging();
    let mut scene = room_corner(false);
    for line in scene.unit_lines.values_mut() {
        *line = *line * 0.5;
    }
    let reconstruction = Reconstructor::new().reconstruct(&scene);
    assert_relative_eq!(reconstruction.scale, 1.075, epsilon = 1e-9);

    for (handle, (class, depth)) in true_planes().into_iter().enumerate() {
        let plane = reconstruction
            .region_plane(RegionIndex::new(0, handle))
            .unwrap();
        let normal = scene.vanishing_points[class];
        assert_relative_eq!(
            plane.depth() * plane.normal.dot(&normal),
            0.5 * depth,
            epsilon = EPSILON
        );
    }
}

#[test]
fn runs_are_deterministic() {
    init_logging();
    let scene = room_corner(true);
    let first = Reconstructor::new().reconstruct(&scene);
    let second = Reconstructor::new().reconstruct(&scene);
    assert_eq!(first.planes, second.planes);
    assert_eq!(first.plane_hypotheses, second.plane_hypotheses);
    assert_eq!(first.depth_factors, second.depth_factors);
    let orders = |r: &Reconstruction| {
        r.subgraphs
            .iter()
            .map(|s| s.commit_order.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(orders(&first), orders(&second));
}

#[derive(Default, Clone)]
struct Recorder(Arc<Mutex<Vec<(ComponentId, f64)>>>);

impl SpreadObserver for Recorder {
    fn committed(
        &self,
        graph: &MixedGraph,
        vertex: VertexKey,
        priority: f64,
    ) {
        if let Some(vertex) = graph.vertex(vertex) {
            self.0.lock().unwrap().push((vertex.component(), priority));
        }
    }
}

#[test]
fn unsupported_region_commits_last() {
    init_logging();
    let scene = room_corner(true);
    let recorder = Recorder::default();
    let reconstruction = Reconstructor::new()
        .observer(recorder.clone())
        .reconstruct(&scene);

    let commits = recorder.0.lock().unwrap().clone();
    assert_eq!(commits.len(), 5);
    assert_eq!(commits[0], (ComponentId::Line(0), f64::INFINITY));
    assert_eq!(commits[4], (ComponentId::Region(DANGLING), 0.0));
    assert!(commits[1..4].iter().all(|&(_, priority)| priority > 0.0));

    // Nothing constrains the scale of the dangling region, so refinement gives up
    // and leaves the spread values in place.
    let report = reconstruction.report(ComponentId::Region(DANGLING)).unwrap();
    assert_eq!(
        report.refinement,
        Err(RefineError::Solve(SolveError::NotPositiveDefinite))
    );
    assert!(reconstruction
        .corrections
        .values()
        .all(|&correction| correction == 1.0));
    let floor = reconstruction
        .region_plane(RegionIndex::new(0, FLOOR))
        .unwrap();
    assert_relative_eq!(
        floor.distance_to(&Point3::new(2.0, 1.0, -1.0)),
        0.0,
        epsilon = EPSILON
    );
}

#[test]
fn empty_scene_reconstructs_nothing() {
    let scene: Scene<manhattan_core::PerspectiveCamera> =
        Scene::new(manhattan_core::VanishingPoints::axes());
    let reconstruction = Reconstructor::new().reconstruct(&scene);
    assert!(reconstruction.regions.is_empty());
    assert!(reconstruction.subgraphs.is_empty());
    assert_eq!(reconstruction.scale, 1.0);
    assert_eq!(reconstruction.scaled_lines().count(), 0);
    assert_eq!(reconstruction.scaled_line(LineIndex::new(0, 0)), None);
}
