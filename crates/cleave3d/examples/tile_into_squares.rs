extern crate nalgebra as na;

use cleave3d::math::{Point, Real};
use cleave3d::mesh::{FaceLoop, SurfaceMesh};
use cleave3d::tiling::{tile_into_squares, TilingParams};

fn main() {
    // An open height-field over a 4 x 4 square.
    let n = 41;
    let mut rng = oorandom::Rand32::new(42);
    let mut vertices = Vec::with_capacity(n * n);

    for i in 0..n {
        for j in 0..n {
            let x = 4.0 * i as Real / (n - 1) as Real;
            let y = 4.0 * j as Real / (n - 1) as Real;
            let z = rng.rand_float() * 0.1;
            vertices.push(Point::new(x, y, z));
        }
    }

    let mut faces = Vec::new();
    for i in 0..n - 1 {
        for j in 0..n - 1 {
            let v00 = (i * n + j) as u32;
            let v01 = (i * n + j + 1) as u32;
            let v10 = ((i + 1) * n + j) as u32;
            let v11 = ((i + 1) * n + j + 1) as u32;
            faces.push(FaceLoop::from_slice(&[v00, v10, v11, v01]));
        }
    }

    let mesh = SurfaceMesh::new(vertices, faces).unwrap();

    // Cut it into a 2 x 2 grid of square tiles.
    let output = tile_into_squares(mesh, 4, &TilingParams::default()).unwrap();
    assert_eq!(output.tiles.len(), 4);

    for tile in &output.tiles {
        println!("{}: {:?}", tile.name(), tile.mesh);
    }
    println!("report: {:?}", output.report);
}
