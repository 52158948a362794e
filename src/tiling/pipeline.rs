use crate::lod::{LodChain, LodParams};
use crate::mesh::{CleanupParams, CleanupReport, SurfaceMesh};
use crate::tiling::{tile_into_squares, Tile, TilingError, TilingParams, TilingReport};

/// A typed mesh-processing command.
///
/// A pipeline is a plain sequence of these commands; dispatch is a single
/// `match`, with no name-based lookup involved.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum Command {
    /// Run the geometry cleanup pass.
    Cleanup(CleanupParams),
    /// Cut the mesh into square tiles.
    TileIntoSquares {
        /// The number of tiles to produce; must be a perfect square.
        modules: usize,
        /// The cutting parameters.
        params: TilingParams,
    },
    /// Plan a level-of-detail chain for every tile produced so far.
    PlanLodChain(LodParams),
}

/// Failure while running a [`Pipeline`].
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum PipelineError {
    /// A tiling command failed.
    #[error("tiling failed: {0}")]
    Tiling(#[from] TilingError),
    /// A `TileIntoSquares` command ran on an already tiled mesh.
    #[error("the mesh was already tiled by an earlier command.")]
    AlreadyTiled,
}

/// Everything a pipeline run produced.
#[derive(Clone, Debug, Default)]
pub struct PipelineOutput {
    /// The resulting meshes: one tile per grid cell holding geometry, or a
    /// single `(0, 0)` tile if no tiling command ran.
    pub tiles: Vec<Tile>,
    /// One LOD chain per tile, in the same order, if a
    /// [`Command::PlanLodChain`] ran.
    pub lod_chains: Vec<LodChain>,
    /// One report per executed cleanup command (per tile when the mesh was
    /// already tiled).
    pub cleanup_reports: Vec<CleanupReport>,
    /// The report of the tiling command, if one ran.
    pub tiling_report: Option<TilingReport>,
}

/// The mesh being threaded through the pipeline: whole until a tiling
/// command runs, a set of tiles afterwards.
enum State {
    Whole(SurfaceMesh),
    Tiled(Vec<Tile>),
}

/// An explicit sequence of mesh-processing commands.
///
/// The pipeline owns no mesh of its own: [`Pipeline::run`] takes the input
/// mesh, threads it through every command in order, and hands back everything
/// the commands produced.
#[derive(Clone, Debug, PartialEq)]
pub struct Pipeline {
    commands: Vec<Command>,
}

impl Pipeline {
    /// Creates a pipeline running the given commands in order.
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    /// The commands of this pipeline.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Runs every command of this pipeline on `mesh`, in order.
    pub fn run(&self, mesh: SurfaceMesh) -> Result<PipelineOutput, PipelineError> {
        let mut state = State::Whole(mesh);
        let mut output = PipelineOutput::default();

        for command in &self.commands {
            match command {
                Command::Cleanup(params) => match &mut state {
                    State::Whole(mesh) => {
                        output.cleanup_reports.push(mesh.cleanup(params));
                    }
                    State::Tiled(tiles) => {
                        for tile in tiles.iter_mut() {
                            output.cleanup_reports.push(tile.mesh.cleanup(params));
                        }
                    }
                },
                Command::TileIntoSquares { modules, params } => {
                    state = match state {
                        State::Whole(mesh) => {
                            let tiling = tile_into_squares(mesh, *modules, params)?;
                            output.tiling_report = Some(tiling.report);
                            State::Tiled(tiling.tiles)
                        }
                        State::Tiled(_) => return Err(PipelineError::AlreadyTiled),
                    };
                }
                Command::PlanLodChain(params) => {
                    output.lod_chains = match &state {
                        State::Whole(mesh) => vec![LodChain::plan(mesh, "tile_0_0", params)],
                        State::Tiled(tiles) => tiles
                            .iter()
                            .map(|tile| LodChain::plan(&tile.mesh, &tile.name(), params))
                            .collect(),
                    };
                }
            }
        }

        output.tiles = match state {
            State::Whole(mesh) => vec![Tile {
                col: 0,
                row: 0,
                mesh,
            }],
            State::Tiled(tiles) => tiles,
        };

        Ok(output)
    }
}
