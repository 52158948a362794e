use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::utils::hashmap::{Entry, HashMap};
use crate::utils::SortedPair;
use core::fmt;
use smallvec::SmallVec;

/// The vertex loop of a single polygon face, in winding order.
///
/// Loops with up to four vertices are stored inline; larger polygons
/// spill to the heap.
pub type FaceLoop = SmallVec<[u32; 4]>;

/// Indicates an inconsistency in the topology of a surface mesh.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum TopologyError {
    /// Found a face with at least two identical vertices.
    #[error("the face {0} has at least two identical vertices.")]
    BadFace(u32),
    /// An edge is shared by more than two faces.
    #[error("the edge {edge:?} is shared by {num_faces} faces.")]
    NonManifoldEdge {
        /// The offending edge, identified by its two vertices.
        edge: (u32, u32),
        /// The number of faces incident to that edge.
        num_faces: usize,
    },
    /// At least two adjacent faces have opposite orientations.
    #[error("the faces {face1} and {face2} sharing the edge {edge:?} have opposite orientations.")]
    BadAdjacentFacesOrientation {
        /// The first face, with an orientation opposite to the second face.
        face1: u32,
        /// The second face, with an orientation opposite to the first face.
        face2: u32,
        /// The edge shared between the two faces.
        edge: (u32, u32),
    },
}

/// Indicates a failure when building a surface mesh.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum MeshBuilderError {
    /// A surface mesh must contain at least one face.
    #[error("a surface mesh must contain at least one face.")]
    EmptyFaces,
    /// A face has fewer than three vertices.
    #[error("the face {0} has fewer than three vertices.")]
    FaceTooSmall(u32),
    /// A face refers to a vertex that doesn't exist.
    #[error("the face {face} refers to the out-of-bounds vertex {vertex}.")]
    VertexOutOfBounds {
        /// The face holding the out-of-bounds index.
        face: u32,
        /// The out-of-bounds vertex index.
        vertex: u32,
    },
    /// The normal buffer doesn't match the vertex buffer.
    #[error("got {normals} normals for {vertices} vertices.")]
    NormalCountMismatch {
        /// The number of vertices of the mesh.
        vertices: usize,
        /// The number of normals given for these vertices.
        normals: usize,
    },
    /// Indicates an inconsistency in the topology of the mesh.
    #[error("topology error: {0}")]
    Topology(TopologyError),
}

#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// Controls how a [`SurfaceMesh`] should be loaded.
pub struct SurfaceMeshFlags(u16);

bitflags::bitflags! {
    impl SurfaceMeshFlags: u16 {
        /// If set, the duplicate vertices of the mesh will be merged.
        ///
        /// Two vertices with the exact same coordinates are considered duplicates.
        const MERGE_DUPLICATE_VERTICES = 1;
        /// If set, any face with two identical vertices after loading will be deleted.
        const DELETE_DEGENERATE_FACES = 1 << 1;
        /// If set, the connected components of the mesh will be computed.
        const CONNECTED_COMPONENTS = 1 << 2;
        /// If set, loading fails with a [`TopologyError`] if any edge of the mesh
        /// is shared by more than two faces, or if two faces sharing an edge have
        /// opposite orientations.
        const MANIFOLD_CHECK = 1 << 3;
    }
}

/// The connected-components of a surface mesh.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct MeshConnectedComponents {
    /// The `face_colors[i]` gives the connected-component index
    /// of the i-th face.
    pub face_colors: Vec<u32>,
    /// The set of faces grouped by connected components.
    pub grouped_faces: Vec<u32>,
    /// The range of connected components. `self.grouped_faces[self.ranges[i]..self.ranges[i + 1]]`
    /// contains the indices of all the faces part of the i-th connected component.
    pub ranges: Vec<usize>,
}

impl MeshConnectedComponents {
    /// The number of connected components on the mesh.
    pub fn num_connected_components(&self) -> usize {
        self.ranges.len() - 1
    }

    /// Extracts each connected component as standalone mesh buffers.
    ///
    /// Returns one `(vertices, normals, faces)` triplet per non-empty connected
    /// component, with faces re-indexed into the compacted vertex buffer.
    pub fn to_mesh_buffers(
        &self,
        mesh: &SurfaceMesh,
    ) -> Vec<(Vec<Point<Real>>, Vec<Vector<Real>>, Vec<FaceLoop>)> {
        let mut result = vec![];
        let mut new_vtx_index: Vec<_> = vec![u32::MAX; mesh.vertices.len()];

        for ranges in self.ranges.windows(2) {
            let num_faces = ranges[1] - ranges[0];

            if num_faces == 0 {
                continue;
            }

            let mut vertices = Vec::new();
            let mut normals = Vec::new();
            let mut faces = Vec::with_capacity(num_faces);

            for fid in ranges[0]..ranges[1] {
                let loop_ids = &mesh.faces[self.grouped_faces[fid] as usize];
                let new_ids = loop_ids
                    .iter()
                    .map(|id| {
                        if new_vtx_index[*id as usize] == u32::MAX {
                            vertices.push(mesh.vertices[*id as usize]);
                            normals.push(mesh.normals[*id as usize]);
                            new_vtx_index[*id as usize] = vertices.len() as u32 - 1;
                        }

                        new_vtx_index[*id as usize]
                    })
                    .collect();
                faces.push(new_ids);
            }

            result.push((vertices, normals, faces));
        }

        result
    }
}

/// An indexed polygon mesh with per-vertex normals.
///
/// The mesh is a plain surface: faces are flat polygon loops indexing a shared
/// vertex buffer, and every vertex carries a normal that is preserved verbatim
/// by all the cutting operations of this crate.
#[derive(Clone)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SurfaceMesh {
    pub(crate) vertices: Vec<Point<Real>>,
    pub(crate) normals: Vec<Vector<Real>>,
    pub(crate) faces: Vec<FaceLoop>,
    pub(crate) connected_components: Option<MeshConnectedComponents>,
    pub(crate) flags: SurfaceMeshFlags,
}

impl fmt::Debug for SurfaceMesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SurfaceMesh {{ vertices: {}, faces: {} }}",
            self.vertices.len(),
            self.faces.len()
        )
    }
}

impl SurfaceMesh {
    /// Creates a new surface mesh from a vertex buffer and a set of face loops.
    ///
    /// The vertex normals are computed from the face geometry, weighted by the
    /// incident angle of each face corner.
    pub fn new(vertices: Vec<Point<Real>>, faces: Vec<FaceLoop>) -> Result<Self, MeshBuilderError> {
        Self::with_flags(vertices, None, faces, SurfaceMeshFlags::empty())
    }

    /// Creates a new surface mesh from vertex, normal, and face buffers.
    ///
    /// The normal buffer must contain exactly one normal per vertex.
    pub fn with_normals(
        vertices: Vec<Point<Real>>,
        normals: Vec<Vector<Real>>,
        faces: Vec<FaceLoop>,
    ) -> Result<Self, MeshBuilderError> {
        Self::with_flags(vertices, Some(normals), faces, SurfaceMeshFlags::empty())
    }

    /// Creates a new surface mesh, and applies the given loading flags.
    ///
    /// If `normals` is `None` the vertex normals are computed from the face
    /// geometry.
    pub fn with_flags(
        vertices: Vec<Point<Real>>,
        normals: Option<Vec<Vector<Real>>>,
        faces: Vec<FaceLoop>,
        flags: SurfaceMeshFlags,
    ) -> Result<Self, MeshBuilderError> {
        if faces.is_empty() {
            return Err(MeshBuilderError::EmptyFaces);
        }

        for (fid, face) in faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(MeshBuilderError::FaceTooSmall(fid as u32));
            }

            for vid in face {
                if *vid as usize >= vertices.len() {
                    return Err(MeshBuilderError::VertexOutOfBounds {
                        face: fid as u32,
                        vertex: *vid,
                    });
                }
            }
        }

        let normals = match normals {
            Some(normals) => {
                if normals.len() != vertices.len() {
                    return Err(MeshBuilderError::NormalCountMismatch {
                        vertices: vertices.len(),
                        normals: normals.len(),
                    });
                }
                normals
            }
            None => compute_vertex_normals(&vertices, &faces),
        };

        let mut result = Self {
            vertices,
            normals,
            faces,
            connected_components: None,
            flags: SurfaceMeshFlags::empty(),
        };

        result.set_flags(flags).map_err(MeshBuilderError::Topology)?;
        Ok(result)
    }

    /// Builds a mesh from buffers known to be consistent.
    ///
    /// Only called from the splitting and tiling code, which derives its
    /// buffers from an already validated mesh.
    pub(crate) fn from_trusted_buffers(
        vertices: Vec<Point<Real>>,
        normals: Vec<Vector<Real>>,
        faces: Vec<FaceLoop>,
        flags: SurfaceMeshFlags,
    ) -> Self {
        let mut result = Self {
            vertices,
            normals,
            faces,
            connected_components: None,
            flags: flags & !SurfaceMeshFlags::CONNECTED_COMPONENTS,
        };

        if flags.contains(SurfaceMeshFlags::CONNECTED_COMPONENTS) {
            result.compute_connected_components();
            result.flags = flags;
        }

        result
    }

    /// Sets the flags of this mesh, controlling its optional associated data.
    pub fn set_flags(&mut self, flags: SurfaceMeshFlags) -> Result<(), TopologyError> {
        if !flags.contains(SurfaceMeshFlags::CONNECTED_COMPONENTS) {
            self.connected_components = None;
        }

        let difference = flags & !self.flags;

        if difference.intersects(
            SurfaceMeshFlags::MERGE_DUPLICATE_VERTICES | SurfaceMeshFlags::DELETE_DEGENERATE_FACES,
        ) {
            self.merge_duplicate_vertices(flags.contains(SurfaceMeshFlags::DELETE_DEGENERATE_FACES));
        }

        if flags.contains(SurfaceMeshFlags::MANIFOLD_CHECK) {
            self.check_manifold()?;
        }

        if difference.intersects(SurfaceMeshFlags::CONNECTED_COMPONENTS) {
            self.compute_connected_components();
        }

        self.flags = flags;
        Ok(())
    }

    /// The flags of this mesh.
    pub fn flags(&self) -> SurfaceMeshFlags {
        self.flags
    }

    /// The vertex buffer of this mesh.
    pub fn vertices(&self) -> &[Point<Real>] {
        &self.vertices
    }

    /// The per-vertex normals of this mesh.
    pub fn normals(&self) -> &[Vector<Real>] {
        &self.normals
    }

    /// The face loops of this mesh.
    pub fn faces(&self) -> &[FaceLoop] {
        &self.faces
    }

    /// The number of faces of this mesh.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// The axis-aligned bounding box of this mesh.
    pub fn local_aabb(&self) -> Aabb {
        Aabb::from_points(&self.vertices)
    }

    /// The connected-component structure of this mesh, if it has been computed.
    pub fn connected_components(&self) -> Option<&MeshConnectedComponents> {
        self.connected_components.as_ref()
    }

    /// Maps every undirected edge of this mesh to the faces incident to it.
    pub fn edge_incident_faces(&self) -> HashMap<SortedPair<u32>, SmallVec<[u32; 2]>> {
        let mut edges: HashMap<SortedPair<u32>, SmallVec<[u32; 2]>> = HashMap::new();

        for (fid, face) in self.faces.iter().enumerate() {
            for k in 0..face.len() {
                let edge = SortedPair::new(face[k], face[(k + 1) % face.len()]);
                edges.entry(edge).or_default().push(fid as u32);
            }
        }

        edges
    }

    /// Checks that no face repeats a vertex, that no edge is shared by more
    /// than two faces, and that adjacent faces are consistently wound.
    pub fn check_manifold(&self) -> Result<(), TopologyError> {
        for (fid, face) in self.faces.iter().enumerate() {
            for k in 0..face.len() {
                if face[k + 1..].contains(&face[k]) {
                    return Err(TopologyError::BadFace(fid as u32));
                }
            }
        }

        for (edge, faces) in self.edge_incident_faces() {
            if faces.len() > 2 {
                return Err(TopologyError::NonManifoldEdge {
                    edge: *edge,
                    num_faces: faces.len(),
                });
            }
        }

        // Consistently wound faces traverse a shared edge once in each
        // direction, so no directed edge may appear twice.
        let mut half_edges: HashMap<(u32, u32), u32> = HashMap::new();
        for (fid, face) in self.faces.iter().enumerate() {
            for k in 0..face.len() {
                let edge = (face[k], face[(k + 1) % face.len()]);
                match half_edges.entry(edge) {
                    Entry::Vacant(entry) => {
                        let _ = entry.insert(fid as u32);
                    }
                    Entry::Occupied(entry) => {
                        return Err(TopologyError::BadAdjacentFacesOrientation {
                            face1: *entry.get(),
                            face2: fid as u32,
                            edge,
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// The directed edges of this mesh bounding exactly one face.
    ///
    /// Each edge is returned with the orientation it has inside its single
    /// incident face loop.
    pub fn boundary_edges(&self) -> Vec<(u32, u32)> {
        let mut counts: HashMap<SortedPair<u32>, u32> = HashMap::new();

        for face in &self.faces {
            for k in 0..face.len() {
                *counts
                    .entry(SortedPair::new(face[k], face[(k + 1) % face.len()]))
                    .or_insert(0) += 1;
            }
        }

        let mut result = Vec::new();
        for face in &self.faces {
            for k in 0..face.len() {
                let (a, b) = (face[k], face[(k + 1) % face.len()]);
                if counts[&SortedPair::new(a, b)] == 1 {
                    result.push((a, b));
                }
            }
        }

        result
    }

    /// The closed loops formed by the boundary edges of this mesh.
    ///
    /// Boundary edges that don't chain into a closed loop (for example around a
    /// non-manifold vertex) are ignored.
    pub fn boundary_loops(&self) -> Vec<Vec<u32>> {
        let boundary = self.boundary_edges();
        let mut next: HashMap<u32, u32> = HashMap::new();

        for (a, b) in &boundary {
            match next.entry(*a) {
                Entry::Vacant(entry) => {
                    let _ = entry.insert(*b);
                }
                Entry::Occupied(_) => {
                    // Two boundary edges leave the same vertex. The boundary
                    // around this vertex is ambiguous, skip it.
                    log::debug!("ambiguous boundary at vertex {}", a);
                }
            }
        }

        let mut loops = Vec::new();
        let mut visited: HashMap<u32, bool> = HashMap::new();

        for (start, _) in &boundary {
            if visited.get(start).copied().unwrap_or(false) {
                continue;
            }

            let mut curr = *start;
            let mut chain = Vec::new();

            loop {
                chain.push(curr);
                let _ = visited.insert(curr, true);

                match next.get(&curr) {
                    Some(succ) if *succ == *start => {
                        // Closed the loop.
                        loops.push(chain);
                        break;
                    }
                    Some(succ) if !visited.get(succ).copied().unwrap_or(false) => {
                        curr = *succ;
                    }
                    _ => break, // Dead end, not a closed loop.
                }
            }
        }

        loops
    }

    /// Appends a second surface mesh to this one.
    pub fn append(&mut self, rhs: &SurfaceMesh) {
        let base_id = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&rhs.vertices);
        self.normals.extend_from_slice(&rhs.normals);
        self.faces.extend(
            rhs.faces
                .iter()
                .map(|face| face.iter().map(|id| id + base_id).collect::<FaceLoop>()),
        );
        self.refresh_connected_components();
    }

    /// Merges all duplicate vertices and adjusts the face loops accordingly.
    ///
    /// Two vertices are duplicates if they have the exact same coordinates; the
    /// normal of the first occurrence is kept. If `delete_degenerate_faces` is
    /// set to true, repeated vertices inside a loop are collapsed and any face
    /// left with fewer than three vertices is removed.
    pub fn merge_duplicate_vertices(&mut self, delete_degenerate_faces: bool) {
        let mut vtx_to_id = HashMap::new();
        let mut new_vertices = Vec::with_capacity(self.vertices.len());
        let mut new_normals = Vec::with_capacity(self.normals.len());
        let mut new_faces = Vec::with_capacity(self.faces.len());

        fn resolve_coord_id(
            coord: &Point<Real>,
            normal: &Vector<Real>,
            vtx_to_id: &mut HashMap<(u64, u64, u64), u32>,
            new_vertices: &mut Vec<Point<Real>>,
            new_normals: &mut Vec<Vector<Real>>,
        ) -> u32 {
            // Keying on the exact bit pattern makes the match exact, like a
            // comparison of the coordinates themselves would be.
            let key = (
                coord.x.to_bits() as u64,
                coord.y.to_bits() as u64,
                coord.z.to_bits() as u64,
            );
            let id = match vtx_to_id.entry(key) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(new_vertices.len() as u32),
            };

            if *id == new_vertices.len() as u32 {
                new_vertices.push(*coord);
                new_normals.push(*normal);
            }

            *id
        }

        for face in &self.faces {
            let mut new_loop: FaceLoop = face
                .iter()
                .map(|vid| {
                    resolve_coord_id(
                        &self.vertices[*vid as usize],
                        &self.normals[*vid as usize],
                        &mut vtx_to_id,
                        &mut new_vertices,
                        &mut new_normals,
                    )
                })
                .collect();

            if delete_degenerate_faces {
                new_loop = collapse_repeated_vertices(&new_loop);
                if new_loop.len() < 3 {
                    continue;
                }
            }

            new_faces.push(new_loop);
        }

        self.vertices = new_vertices;
        self.normals = new_normals;
        self.faces = new_faces;
        self.refresh_connected_components();
    }

    fn compute_connected_components(&mut self) {
        self.connected_components = Some(connected_component_data(
            self.vertices.len(),
            &self.faces,
        ));
    }

    /// Recomputes the connected components when the flag requesting them is set.
    pub(crate) fn refresh_connected_components(&mut self) {
        if self.flags.contains(SurfaceMeshFlags::CONNECTED_COMPONENTS) {
            self.compute_connected_components();
        }
    }

    /// Splits this mesh into one new mesh per connected component.
    ///
    /// The loose parts are returned in no particular order. The vertex and
    /// normal buffers of each part are compacted to only hold the vertices of
    /// that part.
    pub fn split_loose_parts(&self) -> Vec<SurfaceMesh> {
        let components = match &self.connected_components {
            Some(components) => components.to_mesh_buffers(self),
            None => connected_component_data(self.vertices.len(), &self.faces).to_mesh_buffers(self),
        };

        components
            .into_iter()
            .map(|(vertices, normals, faces)| {
                SurfaceMesh::from_trusted_buffers(vertices, normals, faces, self.flags)
            })
            .collect()
    }

    /// The unnormalized normal of the face `fid`, computed with Newell's method.
    ///
    /// Its norm is twice the area of the polygon, which makes it usable to
    /// detect degenerate faces. Returns a zero vector for degenerate loops.
    pub fn face_scaled_normal(&self, fid: u32) -> Vector<Real> {
        newell_normal(&self.vertices, &self.faces[fid as usize])
    }
}

pub(crate) fn collapse_repeated_vertices(face: &FaceLoop) -> FaceLoop {
    let mut result = FaceLoop::new();

    for vid in face {
        if result.last() != Some(vid) {
            result.push(*vid);
        }
    }

    if result.len() > 1 && result.first() == result.last() {
        let _ = result.pop();
    }

    result
}

pub(crate) fn newell_normal(vertices: &[Point<Real>], face: &[u32]) -> Vector<Real> {
    let mut normal = Vector::zeros();

    for k in 0..face.len() {
        let a = &vertices[face[k] as usize];
        let b = &vertices[face[(k + 1) % face.len()] as usize];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }

    normal
}

fn compute_vertex_normals(vertices: &[Point<Real>], faces: &[FaceLoop]) -> Vec<Vector<Real>> {
    let mut normals = vec![Vector::zeros(); vertices.len()];

    for face in faces {
        let scaled_normal = newell_normal(vertices, face);
        let face_normal = match scaled_normal.try_normalize(0.0) {
            Some(normal) => normal,
            None => continue, // Degenerate face, contributes nothing.
        };

        let len = face.len();
        for k in 0..len {
            let prev = &vertices[face[(k + len - 1) % len] as usize];
            let curr = &vertices[face[k] as usize];
            let next = &vertices[face[(k + 1) % len] as usize];

            let to_prev = (prev - curr).try_normalize(0.0);
            let to_next = (next - curr).try_normalize(0.0);

            if let (Some(to_prev), Some(to_next)) = (to_prev, to_next) {
                // Weight each face contribution by the angle of its corner at
                // this vertex.
                let angle = to_prev.dot(&to_next).clamp(-1.0, 1.0).acos();
                normals[face[k] as usize] += face_normal * angle;
            }
        }
    }

    for normal in &mut normals {
        let _ = normal.try_normalize_mut(0.0);
    }

    normals
}

fn connected_component_data(num_vertices: usize, faces: &[FaceLoop]) -> MeshConnectedComponents {
    use ena::unify::{InPlaceUnificationTable, UnifyKey};

    #[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
    struct IntKey(u32);

    impl UnifyKey for IntKey {
        type Value = ();
        fn index(&self) -> u32 {
            self.0
        }
        fn from_index(u: u32) -> IntKey {
            IntKey(u)
        }
        fn tag() -> &'static str {
            "IntKey"
        }
    }

    let mut ufind: InPlaceUnificationTable<IntKey> = InPlaceUnificationTable::new();
    let mut face_colors = vec![u32::MAX; faces.len()];
    let mut ranges = vec![0];
    let mut group_to_range = vec![u32::MAX; num_vertices];
    let mut grouped_faces = vec![u32::MAX; faces.len()];
    let mut vertex_to_key = vec![IntKey(u32::MAX); num_vertices];

    let mut vertex_key = |id: u32, ufind: &mut InPlaceUnificationTable<IntKey>| {
        if vertex_to_key[id as usize].0 == u32::MAX {
            let new_key = ufind.new_key(());
            vertex_to_key[id as usize] = new_key;
            new_key
        } else {
            vertex_to_key[id as usize]
        }
    };

    for face in faces {
        let first = vertex_key(face[0], &mut ufind);
        for vid in &face[1..] {
            let key = vertex_key(*vid, &mut ufind);
            ufind.union(first, key);
        }
    }

    for (face, face_color) in faces.iter().zip(face_colors.iter_mut()) {
        let group_index = ufind.find(vertex_to_key[face[0] as usize]).0 as usize;

        if group_to_range[group_index] == u32::MAX {
            // Additional range
            ranges.push(0);
            group_to_range[group_index] = ranges.len() as u32 - 1;
        }

        let range_id = group_to_range[group_index];
        ranges[range_id as usize] += 1;
        // NOTE: the range_id points to the range upper bound. The face color is the range lower bound.
        *face_color = range_id - 1;
    }

    // Cumulated sum on range indices, to find the first index faces need to be
    // inserted into for each range.
    for i in 1..ranges.len() {
        ranges[i] += ranges[i - 1];
    }

    // Group faces.
    let mut insertion_in_range_index = ranges.clone();
    for (face_id, face_color) in face_colors.iter().enumerate() {
        let insertion_index = &mut insertion_in_range_index[*face_color as usize];
        grouped_faces[*insertion_index] = face_id as u32;
        *insertion_index += 1;
    }

    MeshConnectedComponents {
        face_colors,
        grouped_faces,
        ranges,
    }
}
