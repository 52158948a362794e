pub use self::split::{SplitReport, SplitResult};
pub use self::split_segment::{segment_plane_intersection, MAX_BLEND_FACTOR, MIN_BLEND_FACTOR};

mod split;
mod split_segment;
mod split_surface_mesh;
