//! A synthetic corner of a room seen by one camera at the origin.
//!
//! The floor lies on `z = -1`, wall A on `x = 4` and wall B on `y = 3`. Three lines run along
//! the edges where they meet, and every feature is the exact projection of its 3d counterpart.
#![allow(dead_code)]

use manhattan_core::{
    nalgebra::{Point2, Point3, UnitVector3, Vector2, Vector3},
    Line2, Line3, LineIndex, LineRelation, PerspectiveCamera, Region2, RegionBoundary,
    RegionIndex, RegionLineConnection, Scene, VanishingPoints, View,
};

pub const FLOOR: usize = 0;
pub const WALL_A: usize = 1;
pub const WALL_B: usize = 2;
/// A region attached to the scene by a connection without anchors.
pub const DANGLING: usize = 3;

pub fn init_logging() {
    let _ = pretty_env_logger::try_init();
}

pub fn camera() -> PerspectiveCamera {
    PerspectiveCamera::look_at(
        500.0,
        Point2::new(320.0, 240.0),
        Vector3::new(4.0, 3.0, -0.5),
        Vector3::z(),
    )
}

pub fn project(camera: &PerspectiveCamera, point: Point3<f64>) -> Point2<f64> {
    let local = camera.rotation.inverse() * point.coords;
    camera.principal_point + Vector2::new(local.x / local.z, local.y / local.z) * camera.focal
}

/// The true planes of the floor and the walls as `(class, depth)`.
pub fn true_planes() -> [(usize, f64); 3] {
    [(2, -1.0), (0, 4.0), (1, 3.0)]
}

/// The true 3d segments of the three lines, which are also their unit-scale lines.
pub fn true_lines() -> [(Line3, usize); 3] {
    [
        (
            Line3::new(Point3::new(4.0, 0.0, -1.0), Point3::new(4.0, 2.5, -1.0)),
            1,
        ),
        (
            Line3::new(Point3::new(1.5, 3.0, -1.0), Point3::new(3.5, 3.0, -1.0)),
            0,
        ),
        (
            Line3::new(Point3::new(4.0, 3.0, -0.6), Point3::new(4.0, 3.0, 0.8)),
            2,
        ),
    ]
}

fn lerp(a: Point3<f64>, b: Point3<f64>, t: f64) -> Point3<f64> {
    a + (b - a) * t
}

fn samples(a: Point3<f64>, b: Point3<f64>) -> Vec<Point3<f64>> {
    [0.1, 0.3, 0.5, 0.7, 0.9]
        .iter()
        .map(|&t| lerp(a, b, t))
        .collect()
}

fn region(camera: &PerspectiveCamera, corners: [Point3<f64>; 4]) -> Region2 {
    let contour: Vec<Point2<f64>> = corners.iter().map(|&c| project(camera, c)).collect();
    let centroid = corners.iter().fold(Point3::origin(), |sum, c| sum + c.coords / 4.0);
    Region2 {
        area: manhattan_geom::polygon_area(&contour),
        center: project(camera, centroid),
        contour,
    }
}

/// Builds the room corner. With `dangling` set, a fourth region is connected to the vertical
/// line by a connection that carries no anchors.
pub fn room_corner(dangling: bool) -> Scene<PerspectiveCamera> {
    let camera = camera();
    let mut view = View::new(camera);

    view.regions.push(region(
        &camera,
        [
            Point3::new(1.0, 0.0, -1.0),
            Point3::new(4.0, 0.0, -1.0),
            Point3::new(4.0, 3.0, -1.0),
            Point3::new(1.0, 3.0, -1.0),
        ],
    ));
    view.regions.push(region(
        &camera,
        [
            Point3::new(4.0, 0.0, -1.0),
            Point3::new(4.0, 3.0, -1.0),
            Point3::new(4.0, 3.0, 1.0),
            Point3::new(4.0, 0.0, 1.0),
        ],
    ));
    view.regions.push(region(
        &camera,
        [
            Point3::new(1.0, 3.0, -1.0),
            Point3::new(4.0, 3.0, -1.0),
            Point3::new(4.0, 3.0, 1.0),
            Point3::new(1.0, 3.0, 1.0),
        ],
    ));
    if dangling {
        view.regions.push(region(
            &camera,
            [
                Point3::new(3.0, 2.0, 1.5),
                Point3::new(4.0, 2.0, 1.5),
                Point3::new(4.0, 3.0, 1.5),
                Point3::new(3.0, 3.0, 1.5),
            ],
        ));
    }

    for (line, class) in true_lines() {
        view.lines.push(Line2::new(
            project(&camera, line.first),
            project(&camera, line.second),
            class,
        ));
    }
    view.line_relations = vec![
        LineRelation {
            lines: [0, 1],
            junction_weight: 1.0,
        },
        LineRelation {
            lines: [0, 2],
            junction_weight: 1.0,
        },
    ];

    let boundaries = [
        ([FLOOR, WALL_A], Point3::new(4.0, 0.0, -1.0), Point3::new(4.0, 3.0, -1.0)),
        ([FLOOR, WALL_B], Point3::new(1.0, 3.0, -1.0), Point3::new(4.0, 3.0, -1.0)),
        ([WALL_A, WALL_B], Point3::new(4.0, 3.0, -1.0), Point3::new(4.0, 3.0, 1.0)),
    ];
    view.boundaries = boundaries
        .iter()
        .map(|&(regions, a, b)| RegionBoundary {
            regions,
            samples: samples(a, b).into_iter().map(|p| project(&camera, p)).collect(),
        })
        .collect();

    let mut scene = Scene::new(VanishingPoints::axes());
    let lines = true_lines();
    for (handle, (line, _)) in lines.iter().enumerate() {
        scene.unit_lines.insert(LineIndex::new(0, handle), *line);
    }

    let connections = [(FLOOR, 0), (FLOOR, 1), (WALL_A, 0), (WALL_A, 2), (WALL_B, 1), (WALL_B, 2)];
    scene.region_line_connections = connections
        .iter()
        .map(|&(region, line)| {
            let segment = lines[line].0;
            RegionLineConnection {
                region: RegionIndex::new(0, region),
                line: LineIndex::new(0, line),
                anchors: samples(segment.first, segment.second)
                    .into_iter()
                    .map(|p| UnitVector3::new_normalize(p.coords))
                    .collect(),
            }
        })
        .collect();
    if dangling {
        scene.region_line_connections.push(RegionLineConnection {
            region: RegionIndex::new(0, DANGLING),
            line: LineIndex::new(0, 2),
            anchors: vec![],
        });
    }

    scene.views.push(view);
    scene
}

/// Adds two ceiling patches above the corner which share a boundary without samples, so
/// nothing fixes their relative scale. Returns their handles.
pub fn add_unanchored_pair(scene: &mut Scene<PerspectiveCamera>) -> [usize; 2] {
    let camera = camera();
    let view = &mut scene.views[0];
    let first = view.regions.len();
    for x in [2.0, 3.0] {
        view.regions.push(region(
            &camera,
            [
                Point3::new(x, 2.0, 2.0),
                Point3::new(x + 1.0, 2.0, 2.0),
                Point3::new(x + 1.0, 3.0, 2.0),
                Point3::new(x, 3.0, 2.0),
            ],
        ));
    }
    let pair = [first, first + 1];
    view.boundaries.push(RegionBoundary {
        regions: pair,
        samples: vec![],
    });
    pair
}
