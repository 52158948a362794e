//! Level-of-detail planning for decimating tiles without opening cracks.

pub use self::schedule::{DecimationSchedule, LodChain, LodLevel, LodParams};
pub use self::vertex_group::VertexGroup;

mod schedule;
mod vertex_group;
