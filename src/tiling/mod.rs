//! Square tiling of large meshes, and the command pipeline driving it.

pub use self::pipeline::{Command, Pipeline, PipelineError, PipelineOutput};
pub use self::tiler::{
    bisect, tile_into_squares, Tile, TilingError, TilingOutput, TilingParams, TilingReport,
};

mod pipeline;
mod tiler;
