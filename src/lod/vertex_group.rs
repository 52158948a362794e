use crate::mesh::SurfaceMesh;
use crate::utils::hashset::HashSet;

/// A named set of mesh vertices, identified by their indices.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct VertexGroup {
    /// The name of this group.
    pub name: String,
    /// The indices of the vertices of this group, sorted in increasing order.
    pub indices: Vec<u32>,
}

impl VertexGroup {
    /// The conventional name of the group holding the vertices decimation must
    /// not displace: the ones lying on the open boundary of a tile.
    pub const PRESERVE_EDGES: &'static str = "PreserveEdges";

    /// Collects every vertex lying on an open boundary edge of `mesh` into a
    /// group named [`VertexGroup::PRESERVE_EDGES`].
    ///
    /// Decimating a tile while keeping this group pinned prevents cracks from
    /// opening along the seams between neighboring tiles.
    pub fn from_open_boundaries(mesh: &SurfaceMesh) -> Self {
        let mut seen = HashSet::new();

        for (a, b) in mesh.boundary_edges() {
            let _ = seen.insert(a);
            let _ = seen.insert(b);
        }

        let mut indices: Vec<u32> = seen.into_iter().collect();
        indices.sort_unstable();

        Self {
            name: Self::PRESERVE_EDGES.to_string(),
            indices,
        }
    }

    /// The number of vertices of this group.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether this group contains no vertex at all.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
