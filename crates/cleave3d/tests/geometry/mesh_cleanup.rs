use cleave3d::math::{Point, Real, Vector};
use cleave3d::mesh::{
    CleanupParams, FaceLoop, MeshBuilderError, SurfaceMesh, SurfaceMeshFlags, TopologyError,
};

fn cube_buffers() -> (Vec<Point<Real>>, Vec<FaceLoop>) {
    let vertices = vec![
        Point::new(-0.5, -0.5, -0.5),
        Point::new(0.5, -0.5, -0.5),
        Point::new(0.5, 0.5, -0.5),
        Point::new(-0.5, 0.5, -0.5),
        Point::new(-0.5, -0.5, 0.5),
        Point::new(0.5, -0.5, 0.5),
        Point::new(0.5, 0.5, 0.5),
        Point::new(-0.5, 0.5, 0.5),
    ];
    let faces = vec![
        FaceLoop::from_slice(&[0, 3, 2, 1]),
        FaceLoop::from_slice(&[4, 5, 6, 7]),
        FaceLoop::from_slice(&[0, 1, 5, 4]),
        FaceLoop::from_slice(&[1, 2, 6, 5]),
        FaceLoop::from_slice(&[2, 3, 7, 6]),
        FaceLoop::from_slice(&[3, 0, 4, 7]),
    ];
    (vertices, faces)
}

#[test]
fn duplicate_vertices_are_merged_by_flags() {
    // Two triangles sharing an edge, with every vertex duplicated.
    let vertices = vec![
        Point::new(0.0, 0.0, 0.0),
        Point::new(1.0, 0.0, 0.0),
        Point::new(0.0, 1.0, 0.0),
        Point::new(1.0, 0.0, 0.0),
        Point::new(1.0, 1.0, 0.0),
        Point::new(0.0, 1.0, 0.0),
    ];
    let faces = vec![
        FaceLoop::from_slice(&[0, 1, 2]),
        FaceLoop::from_slice(&[3, 4, 5]),
    ];

    let mesh = SurfaceMesh::with_flags(
        vertices,
        None,
        faces,
        SurfaceMeshFlags::MERGE_DUPLICATE_VERTICES | SurfaceMeshFlags::CONNECTED_COMPONENTS,
    )
    .unwrap();

    assert_eq!(mesh.vertices().len(), 4);
    let components = mesh.connected_components().unwrap();
    assert_eq!(components.num_connected_components(), 1);
}

#[test]
fn nearby_vertices_are_welded_by_distance() {
    let vertices = vec![
        Point::new(0.0, 0.0, 0.0),
        Point::new(1.0, 0.0, 0.0),
        Point::new(0.0, 1.0, 0.0),
        Point::new(1.0 + 1.0e-4, 1.0e-4, 0.0),
        Point::new(1.0, 1.0, 0.0),
        Point::new(1.0e-4, 1.0 - 1.0e-4, 0.0),
    ];
    let faces = vec![
        FaceLoop::from_slice(&[0, 1, 2]),
        FaceLoop::from_slice(&[3, 4, 5]),
    ];
    let mut mesh = SurfaceMesh::new(vertices, faces).unwrap();

    assert_eq!(mesh.merge_vertices_by_distance(1.0e-3), 2);
    assert_eq!(mesh.vertices().len(), 4);

    // An exact-duplicate pass afterwards has nothing left to do.
    assert_eq!(mesh.merge_vertices_by_distance(0.0), 0);
}

#[test]
fn open_boxes_get_their_missing_wall_back() {
    let (vertices, mut faces) = cube_buffers();
    // Remove the top face.
    let _ = faces.remove(1);
    let mut mesh = SurfaceMesh::new(vertices, faces).unwrap();

    assert_eq!(mesh.boundary_loops().len(), 1);

    // A four-sided hole is left alone if only triangles may be added.
    assert_eq!(mesh.fill_holes(3), 0);

    assert_eq!(mesh.fill_holes(1000), 1);
    assert_eq!(mesh.num_faces(), 6);
    assert!(mesh.boundary_edges().is_empty());
}

#[test]
fn filled_holes_are_capped_with_a_single_polygon() {
    // An open hexagonal prism: both rims are six-sided holes.
    let mut vertices = Vec::new();
    for ring in 0..2 {
        for (x, y) in [
            (1.0, 0.0),
            (0.5, 0.866025),
            (-0.5, 0.866025),
            (-1.0, 0.0),
            (-0.5, -0.866025),
            (0.5, -0.866025),
        ] {
            vertices.push(Point::new(x, y, ring as Real));
        }
    }
    let faces = (0..6u32)
        .map(|k| FaceLoop::from_slice(&[k, (k + 1) % 6, (k + 1) % 6 + 6, k + 6]))
        .collect();
    let mut mesh = SurfaceMesh::new(vertices, faces).unwrap();

    assert_eq!(mesh.boundary_loops().len(), 2);
    assert_eq!(mesh.fill_holes(1000), 2);
    assert_eq!(mesh.num_faces(), 8);
    assert!(mesh.boundary_edges().is_empty());

    // The caps stay hexagons; only a triangulation pass fans them.
    let caps = mesh.faces().iter().filter(|face| face.len() == 6).count();
    assert_eq!(caps, 2);

    assert_eq!(mesh.triangulate(), 8);
    assert!(mesh.faces().iter().all(|face| face.len() == 3));
}

#[test]
fn small_loose_parts_are_pruned() {
    let (mut vertices, mut faces) = cube_buffers();
    let base = vertices.len() as u32;
    vertices.push(Point::new(5.0, 0.0, 0.0));
    vertices.push(Point::new(6.0, 0.0, 0.0));
    vertices.push(Point::new(5.0, 1.0, 0.0));
    faces.push(FaceLoop::from_slice(&[base, base + 1, base + 2]));

    let mut mesh = SurfaceMesh::new(vertices, faces).unwrap();
    assert_eq!(mesh.prune_loose_parts(4), 1);
    assert_eq!(mesh.vertices().len(), 8);
    assert_eq!(mesh.num_faces(), 6);

    // A single remaining component is never pruned, whatever its size.
    assert_eq!(mesh.prune_loose_parts(1_000_000), 0);
    assert_eq!(mesh.num_faces(), 6);
}

#[test]
fn pruning_keeps_the_mesh_when_everything_is_small() {
    let vertices = vec![
        Point::new(0.0, 0.0, 0.0),
        Point::new(1.0, 0.0, 0.0),
        Point::new(0.0, 1.0, 0.0),
        Point::new(10.0, 0.0, 0.0),
        Point::new(11.0, 0.0, 0.0),
        Point::new(10.0, 1.0, 0.0),
    ];
    let faces = vec![
        FaceLoop::from_slice(&[0, 1, 2]),
        FaceLoop::from_slice(&[3, 4, 5]),
    ];
    let mut mesh = SurfaceMesh::new(vertices, faces).unwrap();

    assert_eq!(mesh.prune_loose_parts(100), 0);
    assert_eq!(mesh.num_faces(), 2);
}

#[test]
fn degenerate_faces_are_dissolved() {
    let vertices = vec![
        Point::new(0.0, 0.0, 0.0),
        Point::new(1.0, 0.0, 0.0),
        Point::new(0.0, 1.0, 0.0),
        Point::new(2.0, 0.0, 0.0),
    ];
    let faces = vec![
        FaceLoop::from_slice(&[0, 1, 2]),
        // Collinear, zero area.
        FaceLoop::from_slice(&[0, 1, 3]),
        // Repeated vertex, collapses back to a triangle.
        FaceLoop::from_slice(&[0, 1, 1, 2]),
    ];
    let mut mesh = SurfaceMesh::new(vertices, faces).unwrap();

    // Newell's normal spots the zero-area face before the pass runs.
    assert_relative_eq!(mesh.face_scaled_normal(0).norm(), 1.0);
    assert_relative_eq!(mesh.face_scaled_normal(1).norm(), 0.0);

    assert_eq!(mesh.dissolve_degenerate_faces(1.0e-8), 1);
    assert_eq!(mesh.num_faces(), 2);
    assert!(mesh.faces().iter().all(|face| face.len() == 3));
}

#[test]
fn triangulate_fans_every_polygon() {
    let (vertices, faces) = cube_buffers();
    let mut mesh = SurfaceMesh::new(vertices, faces).unwrap();

    assert_eq!(mesh.triangulate(), 6);
    assert_eq!(mesh.num_faces(), 12);
    assert!(mesh.faces().iter().all(|face| face.len() == 3));
    // Fanning a closed surface keeps it closed.
    assert!(mesh.boundary_edges().is_empty());
}

#[test]
fn full_cleanup_reports_everything_it_did() {
    // An open cube with a loose sliver triangle next to it.
    let (mut vertices, mut faces) = cube_buffers();
    let _ = faces.remove(1);
    let base = vertices.len() as u32;
    vertices.push(Point::new(5.0, 0.0, 0.0));
    vertices.push(Point::new(5.1, 0.0, 0.0));
    vertices.push(Point::new(5.0, 0.1, 0.0));
    faces.push(FaceLoop::from_slice(&[base, base + 1, base + 2]));

    let mut mesh = SurfaceMesh::new(vertices, faces).unwrap();
    let report = mesh.cleanup(&CleanupParams {
        min_component_vertices: 4,
        ..CleanupParams::default()
    });

    assert_eq!(report.components_removed, 1);
    assert_eq!(report.holes_filled, 1);
    assert_eq!(report.degenerate_faces_removed, 0);
    assert_eq!(report.vertices_merged, 0);
    assert_eq!(report.faces_triangulated, 6);

    assert_eq!(mesh.num_faces(), 12);
    assert!(mesh.boundary_edges().is_empty());
    assert!(mesh.faces().iter().all(|face| face.len() == 3));
}

#[test]
fn connected_components_group_faces() {
    let vertices = vec![
        // Face 0.
        Point::new(15.82, 6.455, -0.15),
        Point::new(9.915, 6.455, -0.15),
        Point::new(9.915, 6.4, 0.0),
        // Face 1, sharing two vertices with face 0.
        Point::new(15.82, 6.455, -0.15),
        Point::new(9.915, 6.4, 0.0),
        Point::new(15.82, 6.4, 0.0),
        // Face 2, on its own.
        Point::new(0.0, 0.0, 10.0),
        Point::new(1.0, 0.0, 10.0),
        Point::new(0.0, 1.0, 10.0),
    ];
    let faces = vec![
        FaceLoop::from_slice(&[0, 1, 2]),
        FaceLoop::from_slice(&[3, 4, 5]),
        FaceLoop::from_slice(&[6, 7, 8]),
    ];

    let mut mesh = SurfaceMesh::new(vertices, faces).unwrap();
    mesh.set_flags(
        SurfaceMeshFlags::MERGE_DUPLICATE_VERTICES | SurfaceMeshFlags::CONNECTED_COMPONENTS,
    )
    .unwrap();

    let components = mesh.connected_components().unwrap();
    assert_eq!(components.num_connected_components(), 2);
    assert_eq!(components.ranges, vec![0, 2, 3]);

    let parts = mesh.split_loose_parts();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].num_faces(), 2);
    assert_eq!(parts[1].num_faces(), 1);
}

#[test]
fn manifold_check_rejects_edges_with_three_faces() {
    // Three triangles glued on the same edge, like the pages of a book.
    let vertices = vec![
        Point::new(0.0, 0.0, 0.0),
        Point::new(0.0, 0.0, 1.0),
        Point::new(1.0, 0.0, 0.0),
        Point::new(0.0, 1.0, 0.0),
        Point::new(-1.0, 0.0, 0.0),
    ];
    let faces = vec![
        FaceLoop::from_slice(&[0, 1, 2]),
        FaceLoop::from_slice(&[0, 1, 3]),
        FaceLoop::from_slice(&[0, 1, 4]),
    ];

    assert!(
        SurfaceMesh::with_flags(vertices, None, faces, SurfaceMeshFlags::MANIFOLD_CHECK).is_err()
    );
}

#[test]
fn manifold_check_rejects_inconsistent_winding() {
    let square = || {
        vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ]
    };

    // Both triangles traverse the diagonal from 2 to 0.
    let flipped = vec![
        FaceLoop::from_slice(&[0, 1, 2]),
        FaceLoop::from_slice(&[0, 3, 2]),
    ];
    assert_eq!(
        SurfaceMesh::with_flags(square(), None, flipped, SurfaceMeshFlags::MANIFOLD_CHECK).err(),
        Some(MeshBuilderError::Topology(
            TopologyError::BadAdjacentFacesOrientation {
                face1: 0,
                face2: 1,
                edge: (2, 0),
            }
        ))
    );

    let wound = vec![
        FaceLoop::from_slice(&[0, 1, 2]),
        FaceLoop::from_slice(&[0, 2, 3]),
    ];
    assert!(
        SurfaceMesh::with_flags(square(), None, wound, SurfaceMeshFlags::MANIFOLD_CHECK).is_ok()
    );
}

#[test]
fn builders_reject_malformed_buffers() {
    let (vertices, faces) = cube_buffers();

    assert_eq!(
        SurfaceMesh::new(vertices.clone(), vec![]).err(),
        Some(MeshBuilderError::EmptyFaces)
    );

    let mut short = faces.clone();
    short[2] = FaceLoop::from_slice(&[0, 1]);
    assert_eq!(
        SurfaceMesh::new(vertices.clone(), short).err(),
        Some(MeshBuilderError::FaceTooSmall(2))
    );

    let mut out_of_bounds = faces.clone();
    out_of_bounds[1][3] = 8;
    assert_eq!(
        SurfaceMesh::new(vertices.clone(), out_of_bounds).err(),
        Some(MeshBuilderError::VertexOutOfBounds { face: 1, vertex: 8 })
    );

    let normals = vec![Vector::z(); 7];
    assert_eq!(
        SurfaceMesh::with_normals(vertices, normals, faces).err(),
        Some(MeshBuilderError::NormalCountMismatch {
            vertices: 8,
            normals: 7,
        })
    );
}
