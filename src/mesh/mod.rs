//! Polygon surface meshes and their cleanup operators.

pub use self::cleanup::{CleanupParams, CleanupReport};
pub use self::surface_mesh::{
    FaceLoop, MeshBuilderError, MeshConnectedComponents, SurfaceMesh, SurfaceMeshFlags,
    TopologyError,
};
#[cfg(feature = "wavefront")]
pub use self::wavefront::WavefrontError;

mod cleanup;
mod surface_mesh;
#[cfg(feature = "wavefront")]
mod wavefront;
