use crate::lod::VertexGroup;
use crate::math::Real;
use crate::mesh::SurfaceMesh;

/// Parameters for planning a level-of-detail chain.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct LodParams {
    /// The number of reduced levels to plan, in addition to level 0 (the
    /// source mesh itself).
    pub lod_count: u32,
    /// The percentage of geometry removed from one level to the next, in
    /// `(0, 99]`.
    pub reduction_percentage: Real,
    /// The number of decimation iterations used to reach each level's target
    /// ratio.
    pub iterations: u32,
}

impl Default for LodParams {
    fn default() -> Self {
        Self {
            lod_count: 3,
            reduction_percentage: 50.0,
            iterations: 5,
        }
    }
}

/// An iterative decimation schedule converging on a target ratio.
///
/// A single aggressive decimation tends to destroy the silhouette of a
/// scanned mesh; the schedule reaches the same target through `iterations`
/// equal multiplicative steps instead.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct DecimationSchedule {
    target_ratio: Real,
    iterations: u32,
}

impl DecimationSchedule {
    /// The smallest ratio a schedule will ever emit.
    pub const MIN_RATIO: Real = 0.01;

    /// Builds the schedule reaching `target_ratio` of the original geometry
    /// in `iterations` equal multiplicative steps.
    ///
    /// The target is clamped to `[MIN_RATIO, 1]` and the number of iterations
    /// raised to at least 1.
    pub fn new(target_ratio: Real, iterations: u32) -> Self {
        Self {
            target_ratio: target_ratio.clamp(Self::MIN_RATIO, 1.0),
            iterations: iterations.max(1),
        }
    }

    /// The ratio applied at each step: the `iterations`-th root of the target.
    pub fn step_ratio(&self) -> Real {
        self.target_ratio.powf(1.0 / self.iterations as Real)
    }

    /// The cumulative ratios to apply, one per iteration, ending on the
    /// target ratio.
    ///
    /// Every intermediate ratio is floored at [`DecimationSchedule::MIN_RATIO`].
    pub fn ratios(&self) -> impl Iterator<Item = Real> + '_ {
        let step = self.step_ratio();
        (1..=self.iterations).map(move |i| step.powi(i as i32).max(Self::MIN_RATIO))
    }

    /// The ratio reached once the last iteration has run.
    pub fn final_ratio(&self) -> Real {
        self.target_ratio
    }

    /// The number of steps of this schedule.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

/// One level of a LOD chain.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct LodLevel {
    /// The name of this level, derived from the base name: `{base}_lod_{i}`.
    pub name: String,
    /// The fraction of the source geometry this level keeps, in `[0.01, 1]`.
    pub ratio: Real,
    /// The decimation schedule reaching `ratio` from the source mesh.
    pub schedule: DecimationSchedule,
}

/// A decimation plan for one mesh: a list of levels, and the vertices every
/// level must keep in place.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct LodChain {
    /// The planned levels, from level 0 (the untouched source) to the
    /// coarsest one.
    pub levels: Vec<LodLevel>,
    /// The boundary vertices decimation must not displace.
    pub preserve: VertexGroup,
}

impl LodChain {
    /// Plans the LOD chain of `mesh`.
    ///
    /// Level 0 is the source mesh itself; each further level `i` keeps
    /// `(1 - reduction_percentage / 100)^i` of the source geometry, floored
    /// at [`DecimationSchedule::MIN_RATIO`].
    pub fn plan(mesh: &SurfaceMesh, base_name: &str, params: &LodParams) -> Self {
        let keep = 1.0 - params.reduction_percentage.clamp(0.0, 99.0) / 100.0;

        let levels = (0..=params.lod_count)
            .map(|i| {
                let ratio = keep.powi(i as i32).max(DecimationSchedule::MIN_RATIO);
                LodLevel {
                    name: format!("{}_lod_{}", base_name, i),
                    ratio,
                    schedule: DecimationSchedule::new(ratio, params.iterations),
                }
            })
            .collect();

        Self {
            levels,
            preserve: VertexGroup::from_open_boundaries(mesh),
        }
    }
}
