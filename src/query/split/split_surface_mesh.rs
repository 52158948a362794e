use crate::math::{Real, UnitVector, Vector};
use crate::mesh::{FaceLoop, SurfaceMesh};
use crate::query::split::split_segment::segment_plane_intersection;
use crate::query::split::{SplitReport, SplitResult};
use crate::utils::hashmap::{Entry, HashMap};
use crate::utils::SortedPair;
use smallvec::SmallVec;

impl SurfaceMesh {
    /// Splits this mesh along the plane orthogonal to the canonical axis
    /// `axis` (`0 = X`, `1 = Y`, `2 = Z`) located at the signed distance
    /// `bias` from the origin.
    pub fn canonical_split(&self, axis: usize, bias: Real, epsilon: Real) -> SplitResult<Self> {
        self.local_split(&Vector::ith_axis(axis), bias, epsilon)
    }

    /// Splits this mesh by the plane with normal `local_axis` located at the
    /// signed distance `bias` from the origin.
    ///
    /// Vertices within `epsilon` of the plane are considered to lie on it and
    /// end up on both sides of the cut. The per-vertex normals of the input
    /// are carried over to the outputs (and interpolated on subdivided edges),
    /// never recomputed.
    pub fn local_split(
        &self,
        local_axis: &UnitVector<Real>,
        bias: Real,
        epsilon: Real,
    ) -> SplitResult<Self> {
        self.local_split_and_get_report(local_axis, bias, epsilon).0
    }

    /// Same as [`SurfaceMesh::local_split`], but also returns the counters of
    /// the defects tolerated during the cut.
    pub fn local_split_and_get_report(
        &self,
        local_axis: &UnitVector<Real>,
        bias: Real,
        epsilon: Real,
    ) -> (SplitResult<Self>, SplitReport) {
        let mut report = SplitReport::default();

        // 1. Partition the vertices.
        // Color of a vertex:
        // 0 = on the plane (goes to both sides)
        // 1 = negative half-space
        // 2 = positive half-space
        let mut colors = vec![0u8; self.vertices().len()];
        let mut found_negative = false;
        let mut found_positive = false;

        for (i, pt) in self.vertices().iter().enumerate() {
            let dist_to_plane = pt.coords.dot(local_axis) - bias;
            if dist_to_plane < -epsilon {
                found_negative = true;
                colors[i] = 1;
            } else if dist_to_plane > epsilon {
                found_positive = true;
                colors[i] = 2;
            }
        }

        // Exit early if `self` isn't crossed by the plane.
        if !found_negative {
            return (SplitResult::Positive, report);
        }

        if !found_positive {
            return (SplitResult::Negative, report);
        }

        // 2. Subdivide the edges crossing the plane, and split the loops of
        //    the faces containing them. The new vertex inserted on each
        //    crossing edge is memoized so both faces sharing the edge reuse
        //    the same index.
        let mut vertices = self.vertices().to_vec();
        let mut normals = self.normals().to_vec();
        let mut intersections_found: HashMap<SortedPair<u32>, u32> = HashMap::new();
        let mut faces: Vec<FaceLoop> = Vec::with_capacity(self.num_faces());

        for face in self.faces() {
            let mut augmented = FaceLoop::new();
            let mut crossing_failed = false;

            for k in 0..face.len() {
                let ia = face[k];
                let ib = face[(k + 1) % face.len()];
                augmented.push(ia);

                // Only edges with one vertex on each strict side cross the plane.
                if colors[ia as usize] + colors[ib as usize] != 3 {
                    continue;
                }

                let intersection = match intersections_found.entry(SortedPair::new(ia, ib)) {
                    Entry::Occupied(entry) => Some(*entry.get()),
                    Entry::Vacant(entry) => {
                        match segment_plane_intersection(
                            &vertices[ia as usize],
                            &vertices[ib as usize],
                            local_axis,
                            bias,
                        ) {
                            Some((pt, bcoord)) => {
                                let new_id = vertices.len() as u32;
                                vertices.push(pt);

                                let mut normal =
                                    normals[ia as usize].lerp(&normals[ib as usize], bcoord);
                                let _ = normal.try_normalize_mut(0.0);
                                normals.push(normal);

                                colors.push(0); // The new vertex lies on the plane.
                                report.split_edges += 1;
                                Some(*entry.insert(new_id))
                            }
                            // Numerically parallel edge, no usable intersection.
                            None => None,
                        }
                    }
                };

                match intersection {
                    Some(id) => augmented.push(id),
                    None => crossing_failed = true,
                }
            }

            let mut has_negative = false;
            let mut has_positive = false;
            for vid in &augmented {
                match colors[*vid as usize] {
                    1 => has_negative = true,
                    2 => has_positive = true,
                    _ => {}
                }
            }

            if !(has_negative && has_positive) {
                // The face lies fully on one side (or on the plane itself).
                faces.push(augmented);
                continue;
            }

            // A clean two-way split requires the loop to run through exactly
            // two on-plane vertices.
            let on_plane: SmallVec<[usize; 2]> = augmented
                .iter()
                .enumerate()
                .filter(|(_, vid)| colors[**vid as usize] == 0)
                .map(|(k, _)| k)
                .collect();

            if crossing_failed || on_plane.len() != 2 {
                // The loop can't be split unambiguously. Keep it whole for
                // now; it still spans both sides, so it will be dropped when
                // the two output meshes are assembled.
                report.failed_face_splits += 1;
                log::debug!(
                    "face split failed: {} split points, crossing failure: {}",
                    on_plane.len(),
                    crossing_failed
                );
                faces.push(augmented);
                continue;
            }

            let (p, q) = (on_plane[0], on_plane[1]);
            let first: FaceLoop = augmented[p..=q].iter().copied().collect();
            let second: FaceLoop = augmented[q..]
                .iter()
                .chain(augmented[..=p].iter())
                .copied()
                .collect();

            if first.len() < 3 || second.len() < 3 {
                // The plane only touches this face along an edge or a corner.
                faces.push(augmented);
                continue;
            }

            faces.push(first);
            faces.push(second);
        }

        // 3. Partition the vertices into both output buffers, on-plane
        //    vertices going to both.
        let mut remap = Vec::with_capacity(vertices.len());
        let mut vertices_lhs = vec![];
        let mut vertices_rhs = vec![];
        let mut normals_lhs = vec![];
        let mut normals_rhs = vec![];

        for ((i, pt), normal) in vertices.into_iter().enumerate().zip(normals) {
            match colors[i] {
                0 => {
                    remap.push((vertices_lhs.len() as u32, vertices_rhs.len() as u32));
                    vertices_lhs.push(pt);
                    vertices_rhs.push(pt);
                    normals_lhs.push(normal);
                    normals_rhs.push(normal);
                }
                1 => {
                    remap.push((vertices_lhs.len() as u32, u32::MAX));
                    vertices_lhs.push(pt);
                    normals_lhs.push(normal);
                }
                2 => {
                    remap.push((u32::MAX, vertices_rhs.len() as u32));
                    vertices_rhs.push(pt);
                    normals_rhs.push(normal);
                }
                _ => unreachable!(),
            }
        }

        // 4. Partition the faces, remapping their vertex indices into the
        //    side-local buffers.
        let mut faces_lhs: Vec<FaceLoop> = vec![];
        let mut faces_rhs: Vec<FaceLoop> = vec![];

        for face in faces {
            let mut has_negative = false;
            let mut has_positive = false;

            for vid in &face {
                match colors[*vid as usize] {
                    1 => has_negative = true,
                    2 => has_positive = true,
                    _ => {}
                }
            }

            match (has_negative, has_positive) {
                (true, true) => {
                    // Left over from a failed split: the face still spans both
                    // sides, so it can't be attributed to either output.
                    report.dropped_faces += 1;
                    log::warn!("dropping a face spanning both sides of the cutting plane");
                }
                (true, false) => {
                    faces_lhs.push(face.iter().map(|vid| remap[*vid as usize].0).collect());
                }
                (false, true) => {
                    faces_rhs.push(face.iter().map(|vid| remap[*vid as usize].1).collect());
                }
                (false, false) => {
                    // The face lies entirely on the plane, give it to both sides.
                    faces_lhs.push(face.iter().map(|vid| remap[*vid as usize].0).collect());
                    faces_rhs.push(face.iter().map(|vid| remap[*vid as usize].1).collect());
                }
            }
        }

        if faces_lhs.is_empty() {
            log::warn!("every face of the negative side was dropped");
            return (SplitResult::Positive, report);
        }

        if faces_rhs.is_empty() {
            log::warn!("every face of the positive side was dropped");
            return (SplitResult::Negative, report);
        }

        let mesh_lhs =
            SurfaceMesh::from_trusted_buffers(vertices_lhs, normals_lhs, faces_lhs, self.flags());
        let mesh_rhs =
            SurfaceMesh::from_trusted_buffers(vertices_rhs, normals_rhs, faces_rhs, self.flags());

        (SplitResult::Pair(mesh_lhs, mesh_rhs), report)
    }
}
