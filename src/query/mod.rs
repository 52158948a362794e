//! Non-persistent geometric queries.

pub use self::split::{SplitReport, SplitResult};

/// Plane-splitting queries.
pub mod split;
