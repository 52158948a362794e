use crate::math::{Point, Real, UnitVector, Vector};
use crate::mesh::SurfaceMesh;
use crate::query::{SplitReport, SplitResult};

/// Error preventing a tiling operation from running.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TilingError {
    /// The requested number of modules must be `k * k` for an integer `k`.
    #[error("the requested module count {0} is not a perfect square.")]
    NotPerfectSquare(usize),
    /// At least one module must be requested.
    #[error("the requested module count must be at least 1.")]
    NoModules,
    /// The input mesh must contain at least one face.
    #[error("the input mesh contains no faces.")]
    EmptyMesh,
}

/// Parameters controlling [`tile_into_squares`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct TilingParams {
    /// Vertices within this distance of a cutting plane are considered to lie
    /// on it and end up on both sides of the cut.
    pub epsilon: Real,
    /// Weld distance of the cleanup applied to each finished tile.
    pub merge_distance: Real,
    /// The cleanup applied to each finished tile closes the holes with at
    /// most this many sides.
    pub max_hole_sides: usize,
}

impl Default for TilingParams {
    fn default() -> Self {
        Self {
            epsilon: 1.0e-5,
            merge_distance: 1.0e-6,
            max_hole_sides: 1000,
        }
    }
}

/// One square module cut out of an input mesh.
#[derive(Clone, Debug)]
pub struct Tile {
    /// Zero-based column of this tile along the X axis.
    pub col: u32,
    /// Zero-based row of this tile along the Y axis.
    pub row: u32,
    /// The tile geometry.
    pub mesh: SurfaceMesh,
}

impl Tile {
    /// A `tile_{col}_{row}` name for this tile, used to derive stable export
    /// and LOD level names.
    pub fn name(&self) -> String {
        format!("tile_{}_{}", self.col, self.row)
    }
}

/// Aggregated counters for a whole tiling pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct TilingReport {
    /// The number of plane cuts performed.
    pub cuts: usize,
    /// The counters of every cut, accumulated.
    pub split: SplitReport,
    /// The number of grid cells containing no geometry at all.
    pub empty_tiles: usize,
    /// The number of vertices welded by the per-tile cleanup.
    pub vertices_merged: usize,
    /// The number of holes closed by the per-tile cleanup.
    pub holes_filled: usize,
}

/// The product of a whole tiling pass.
#[derive(Clone, Debug)]
pub struct TilingOutput {
    /// The non-empty tiles, in column-major order.
    pub tiles: Vec<Tile>,
    /// The counters aggregated over every cut and tile cleanup of the pass.
    pub report: TilingReport,
}

/// Splits `mesh` by the plane orthogonal to `axis_direction` passing at the
/// signed offset `cut_position` from `bounding_box_center`.
///
/// When the plane actually crosses the mesh, the first element of the
/// resulting pair lies on the negative side of the plane and the second on
/// its positive side.
pub fn bisect(
    mesh: &SurfaceMesh,
    cut_position: Real,
    axis_direction: &UnitVector<Real>,
    bounding_box_center: &Point<Real>,
    epsilon: Real,
) -> SplitResult<SurfaceMesh> {
    let bias = axis_direction.dot(&bounding_box_center.coords) + cut_position;
    mesh.local_split(axis_direction, bias, epsilon)
}

/// Cuts `mesh` into `modules` square tiles arranged on a `k × k` grid, where
/// `modules = k * k`.
///
/// The grid lives on the X and Y axes: the cell size is the larger of the two
/// bounding-box extents divided by `k`, and the same cut positions (relative
/// to the bounding-box center) are used on both axes. Grid cells crossing no
/// geometry produce no tile; they are only counted in the report. Each
/// finished tile gets a light cleanup (vertex weld and hole filling) driven
/// by `params`.
pub fn tile_into_squares(
    mesh: SurfaceMesh,
    modules: usize,
    params: &TilingParams,
) -> Result<TilingOutput, TilingError> {
    // The builders reject faceless meshes, but the cleanup passes can
    // produce one.
    if mesh.num_faces() == 0 {
        return Err(TilingError::EmptyMesh);
    }

    let k = perfect_square_root(modules)?;
    let mut report = TilingReport::default();

    let aabb = mesh.local_aabb();
    let center = aabb.center();
    let extents = aabb.extents();
    let max_len = extents.x.max(extents.y);
    let step = max_len / k as Real;

    // Cut positions shared by both axes, relative to the AABB center.
    let cuts: Vec<Real> = (1..k).map(|i| i as Real * step - max_len * 0.5).collect();

    let columns = slice_axis(mesh, 0, center.x, &cuts, params.epsilon, &mut report);
    let mut tiles = Vec::new();

    for (col, column) in columns.into_iter().enumerate() {
        let column = match column {
            Some(column) => column,
            None => {
                report.empty_tiles += k;
                continue;
            }
        };

        let rows = slice_axis(column, 1, center.y, &cuts, params.epsilon, &mut report);

        for (row, cell) in rows.into_iter().enumerate() {
            match cell {
                Some(mut cell) => {
                    report.vertices_merged += cell.merge_vertices_by_distance(params.merge_distance);
                    report.holes_filled += cell.fill_holes(params.max_hole_sides);
                    tiles.push(Tile {
                        col: col as u32,
                        row: row as u32,
                        mesh: cell,
                    });
                }
                None => report.empty_tiles += 1,
            }
        }
    }

    Ok(TilingOutput { tiles, report })
}

/// Folds a sequence of parallel cuts over `mesh`: each cut slices off the
/// geometry below it into its own slot and keeps the rest for the next cut.
///
/// Returns `cuts.len() + 1` slots; the slots crossing no geometry are `None`.
fn slice_axis(
    mesh: SurfaceMesh,
    axis: usize,
    center: Real,
    cuts: &[Real],
    epsilon: Real,
    report: &mut TilingReport,
) -> Vec<Option<SurfaceMesh>> {
    let mut slots = Vec::with_capacity(cuts.len() + 1);
    let mut remainder = Some(mesh);

    for cut in cuts {
        let current = match remainder.take() {
            Some(current) => current,
            None => {
                slots.push(None);
                continue;
            }
        };

        let (result, split_report) =
            current.local_split_and_get_report(&Vector::ith_axis(axis), center + cut, epsilon);
        report.cuts += 1;
        report.split.append(&split_report);

        match result {
            SplitResult::Pair(negative, positive) => {
                slots.push(Some(negative));
                remainder = Some(positive);
            }
            SplitResult::Negative => {
                // Everything lies below this cut: this slot takes it all.
                slots.push(Some(current));
            }
            SplitResult::Positive => {
                // Nothing below this cut.
                slots.push(None);
                remainder = Some(current);
            }
        }
    }

    slots.push(remainder);
    slots
}

fn perfect_square_root(modules: usize) -> Result<usize, TilingError> {
    if modules == 0 {
        return Err(TilingError::NoModules);
    }

    // `checked_mul` keeps huge counts whose rounded root squares past
    // `usize::MAX` from wrapping.
    let k = (modules as f64).sqrt().round() as usize;
    if k.checked_mul(k) != Some(modules) {
        return Err(TilingError::NotPerfectSquare(modules));
    }

    Ok(k)
}
