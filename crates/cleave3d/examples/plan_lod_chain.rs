extern crate nalgebra as na;

use cleave3d::lod::{LodChain, LodParams};
use cleave3d::math::{Point, Real};
use cleave3d::mesh::{FaceLoop, SurfaceMesh};

fn main() {
    // A flat open grid standing in for one tile of a larger mesh.
    let n = 11;
    let mut vertices = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            vertices.push(Point::new(i as Real, j as Real, 0.0));
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

    let tile = SurfaceMesh::new(vertices, faces).unwrap();

    let chain = LodChain::plan(&tile, "tile_0_0", &LodParams::default());
    assert_eq!(chain.levels.len(), 4);

    // The boundary of the tile is pinned so that decimating it cannot open
    // cracks between neighboring tiles.
    println!(
        "{} vertices pinned as {:?}",
        chain.preserve.len(),
        chain.preserve.name
    );

    for level in &chain.levels {
        println!(
            "{}: keep {:.1}% of the geometry in {} decimation steps",
            level.name,
            level.ratio * 100.0,
            level.schedule.iterations()
        );
    }
}
