use cleave3d::math::Point;
use cleave3d::mesh::{FaceLoop, SurfaceMesh};

#[test]
fn obj_files_round_trip() {
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
    let cube = SurfaceMesh::new(vertices, faces).unwrap();

    let path = std::env::temp_dir().join("cleave3d_roundtrip.obj");
    cube.to_obj_file(&path).unwrap();
    let reloaded = SurfaceMesh::from_obj_file(&path).unwrap();

    assert_eq!(reloaded.vertices().len(), cube.vertices().len());
    assert_eq!(reloaded.num_faces(), cube.num_faces());
    assert_eq!(reloaded.faces(), cube.faces());

    for (a, b) in cube.vertices().iter().zip(reloaded.vertices()) {
        assert_relative_eq!(a.coords, b.coords, epsilon = 1.0e-4);
    }

    // The normals written to the file are read back, not recomputed.
    for (a, b) in cube.normals().iter().zip(reloaded.normals()) {
        assert_relative_eq!(*a, *b, epsilon = 1.0e-4);
    }
}
