extern crate nalgebra as na;

use cleave3d::math::Point;
use cleave3d::mesh::{FaceLoop, SurfaceMesh};
use cleave3d::query::SplitResult;
use cleave3d::tiling::bisect;
use na::Vector3;

fn main() {
    // A unit cube centered at the origin, built from six quads.
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

    // Cut the cube by the vertical plane running through its center.
    let center = cube.local_aabb().center();
    match bisect(&cube, 0.0, &Vector3::x_axis(), &center, 1.0e-5) {
        SplitResult::Pair(negative, positive) => {
            assert_eq!(negative.num_faces(), 5);
            assert_eq!(positive.num_faces(), 5);
            println!("negative half: {:?}", negative);
            println!("positive half: {:?}", positive);
        }
        _ => println!("the plane missed the cube"),
    }
}
