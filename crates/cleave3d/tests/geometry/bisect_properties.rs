use cleave3d::math::{Point, Real};
use cleave3d::mesh::{FaceLoop, SurfaceMesh};
use cleave3d::query::SplitResult;
use na::Vector3;

fn random_triangle_soup(seed: u64, num_triangles: usize) -> SurfaceMesh {
    let mut rng = oorandom::Rand32::new(seed);
    let mut coord = move || rng.rand_float() as Real * 2.0 - 1.0;

    let vertices = (0..num_triangles * 3)
        .map(|_| Point::new(coord(), coord(), coord()))
        .collect();
    let faces = (0..num_triangles)
        .map(|i| {
            let base = i as u32 * 3;
            FaceLoop::from_slice(&[base, base + 1, base + 2])
        })
        .collect();

    SurfaceMesh::new(vertices, faces).unwrap()
}

#[test]
fn every_input_vertex_survives_the_cut() {
    let mesh = random_triangle_soup(1234, 50);

    for cut in [-0.5, -0.1, 0.0, 0.3, 0.7] {
        let (result, report) = mesh.local_split_and_get_report(&Vector3::z_axis(), cut, 1.0e-5);

        let (lhs, rhs) = match result {
            SplitResult::Pair(lhs, rhs) => (lhs, rhs),
            // The plane missed the mesh entirely, nothing to check.
            _ => continue,
        };

        assert_eq!(report.failed_face_splits, 0);
        assert_eq!(report.dropped_faces, 0);

        // On-plane vertices are duplicated on both sides, everything else
        // lands on exactly one side.
        let num_shared = lhs
            .vertices()
            .iter()
            .filter(|pt| rhs.vertices().contains(pt))
            .count();
        assert_eq!(
            lhs.vertices().len() + rhs.vertices().len() - num_shared,
            mesh.vertices().len() + report.split_edges,
        );

        for pt in mesh.vertices() {
            assert!(lhs.vertices().contains(pt) || rhs.vertices().contains(pt));
        }
    }
}

#[test]
fn cut_outputs_carry_no_nan() {
    let mesh = random_triangle_soup(9876, 80);

    for cut in [-0.9, -0.2, 0.1, 0.8] {
        for axis in [Vector3::x_axis(), Vector3::y_axis(), Vector3::z_axis()] {
            let halves = match mesh.local_split(&axis, cut, 1.0e-5) {
                SplitResult::Pair(lhs, rhs) => [lhs, rhs],
                _ => continue,
            };

            for half in &halves {
                for pt in half.vertices() {
                    assert!(pt.coords.iter().all(|x| x.is_finite()));
                }

                // Interpolated normals are renormalized (or zero when the two
                // source normals cancel out exactly).
                for normal in half.normals() {
                    assert!(normal.iter().all(|x| x.is_finite()));
                    let norm = normal.norm();
                    assert!(norm == 0.0 || (norm - 1.0).abs() <= 1.0e-3);
                }
            }
        }
    }
}

#[test]
fn cuts_grazing_a_vertex_stay_finite() {
    // Planes passing within a hair of existing vertices exercise the
    // blend-factor clamping of the edge subdivision.
    let mesh = random_triangle_soup(555, 40);
    let target = mesh.vertices()[7].z;

    for nudge in [-1.0e-6, 0.0, 1.0e-6] {
        if let SplitResult::Pair(lhs, rhs) =
            mesh.local_split(&Vector3::z_axis(), target + nudge, 1.0e-7)
        {
            for half in [&lhs, &rhs] {
                for pt in half.vertices() {
                    assert!(pt.coords.iter().all(|x| x.is_finite()));
                }
            }
        }
    }
}
