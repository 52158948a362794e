/// The result of splitting a shape with a plane.
pub enum SplitResult<T> {
    /// The split operation yielded two results: one lying on the negative
    /// half-space of the plane, and the other lying on the positive half-space.
    Pair(T, T),
    /// The shape being split is fully contained on the negative half-space of the plane.
    Negative,
    /// The shape being split is fully contained on the positive half-space of the plane.
    Positive,
}

/// Counters for the defects tolerated while splitting a surface mesh.
///
/// A cut running through clean geometry reports all zeros.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SplitReport {
    /// The number of edges subdivided by the cutting plane.
    pub split_edges: usize,
    /// The number of crossed faces whose loop did not expose exactly two
    /// split points.
    pub failed_face_splits: usize,
    /// The number of faces dropped at reconstruction because they still
    /// spanned both sides of the plane.
    pub dropped_faces: usize,
}

impl SplitReport {
    /// Accumulates the counters of another report into this one.
    pub fn append(&mut self, rhs: &SplitReport) {
        self.split_edges += rhs.split_edges;
        self.failed_face_splits += rhs.failed_face_splits;
        self.dropped_faces += rhs.dropped_faces;
    }
}
