use crate::math::{Point, Real, Vector};
use crate::mesh::surface_mesh::{collapse_repeated_vertices, newell_normal};
use crate::mesh::{FaceLoop, SurfaceMesh};
use crate::utils::hashmap::HashMap;
use smallvec::SmallVec;

/// Parameters for the geometry cleanup pass applied to freshly imported or
/// freshly cut meshes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CleanupParams {
    /// Connected components with fewer vertices than this are discarded.
    pub min_component_vertices: usize,
    /// Boundary loops with at most this many edges are closed with a new face.
    pub max_hole_sides: usize,
    /// Faces with an area at or below this threshold are dissolved.
    pub degenerate_area: Real,
    /// Vertices closer to each other than this distance are welded.
    pub merge_distance: Real,
    /// If `true`, every polygon is fan-triangulated at the end of the pass.
    pub triangulate: bool,
}

impl Default for CleanupParams {
    fn default() -> Self {
        Self {
            min_component_vertices: 1000,
            max_hole_sides: 1000,
            degenerate_area: 1.0e-8,
            merge_distance: 1.0e-6,
            triangulate: true,
        }
    }
}

/// Counters describing what a cleanup pass did to a mesh.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CleanupReport {
    /// The number of small connected components that were discarded.
    pub components_removed: usize,
    /// The number of boundary loops that were closed with a new face.
    pub holes_filled: usize,
    /// The number of zero-area or collapsed faces that were dissolved.
    pub degenerate_faces_removed: usize,
    /// The number of vertices removed by the distance weld.
    pub vertices_merged: usize,
    /// The number of polygons that were fan-triangulated.
    pub faces_triangulated: usize,
}

impl SurfaceMesh {
    /// Runs the full cleanup pass on this mesh.
    ///
    /// The pass discards small loose parts, closes holes, dissolves degenerate
    /// faces, welds nearby vertices, and optionally triangulates, in that
    /// order.
    pub fn cleanup(&mut self, params: &CleanupParams) -> CleanupReport {
        let components_removed = self.prune_loose_parts(params.min_component_vertices);
        let holes_filled = self.fill_holes(params.max_hole_sides);
        let degenerate_faces_removed = self.dissolve_degenerate_faces(params.degenerate_area);
        let vertices_merged = self.merge_vertices_by_distance(params.merge_distance);
        let faces_triangulated = if params.triangulate {
            self.triangulate()
        } else {
            0
        };

        let report = CleanupReport {
            components_removed,
            holes_filled,
            degenerate_faces_removed,
            vertices_merged,
            faces_triangulated,
        };

        log::debug!("mesh cleanup: {:?}", report);
        report
    }

    /// Discards every connected component with fewer than `min_vertices`
    /// vertices, and returns the number of discarded components.
    ///
    /// If every component is below the threshold the mesh is left unchanged.
    pub fn prune_loose_parts(&mut self, min_vertices: usize) -> usize {
        let parts = self.split_loose_parts();

        if parts.len() <= 1 {
            return 0;
        }

        let (kept, dropped): (Vec<_>, Vec<_>) = parts
            .into_iter()
            .partition(|part| part.vertices().len() >= min_vertices);

        if kept.is_empty() {
            log::warn!(
                "every connected component has fewer than {} vertices, keeping the mesh unchanged",
                min_vertices
            );
            return 0;
        }

        if dropped.is_empty() {
            return 0;
        }

        let mut parts = kept.into_iter();
        if let Some(mut merged) = parts.next() {
            for part in parts {
                merged.append(&part);
            }
            *self = merged;
        }

        dropped.len()
    }

    /// Closes every boundary loop with at most `max_sides` edges by inserting
    /// a new polygon face, and returns the number of holes that were closed.
    pub fn fill_holes(&mut self, max_sides: usize) -> usize {
        let loops = self.boundary_loops();
        let mut filled = 0;

        for boundary in loops {
            if boundary.len() < 3 || boundary.len() > max_sides {
                continue;
            }

            // The new face winds against the boundary direction so that its
            // edges pair up with the existing half-edges.
            let mut face: FaceLoop = boundary.into_iter().collect();
            face.reverse();
            self.faces.push(face);
            filled += 1;
        }

        if filled > 0 {
            self.refresh_connected_components();
        }

        filled
    }

    /// Removes faces whose area is at or below `min_area`, collapsing repeated
    /// vertices inside the remaining loops. Returns the number of removed faces.
    pub fn dissolve_degenerate_faces(&mut self, min_area: Real) -> usize {
        let num_before = self.faces.len();
        let vertices = &self.vertices;

        self.faces.retain_mut(|face| {
            let collapsed = collapse_repeated_vertices(face);

            if collapsed.len() < 3 {
                return false;
            }

            let area = newell_normal(vertices, &collapsed).norm() * 0.5;
            if area <= min_area {
                return false;
            }

            *face = collapsed;
            true
        });

        let removed = num_before - self.faces.len();
        if removed > 0 {
            self.refresh_connected_components();
        }

        removed
    }

    /// Welds all the vertices closer to each other than `distance`, and remaps
    /// the face loops accordingly.
    ///
    /// Vertices not referenced by any face are dropped, and faces collapsed by
    /// the weld are removed. Returns the number of removed vertices.
    pub fn merge_vertices_by_distance(&mut self, distance: Real) -> usize {
        let num_before = self.vertices.len();

        if distance <= 0.0 {
            self.merge_duplicate_vertices(true);
            return num_before - self.vertices.len();
        }

        let inv_cell = 1.0 / distance;
        let mut new_vertices: Vec<Point<Real>> = Vec::with_capacity(self.vertices.len());
        let mut new_normals: Vec<Vector<Real>> = Vec::with_capacity(self.normals.len());
        let mut new_faces = Vec::with_capacity(self.faces.len());
        let mut cell_to_ids: HashMap<(i64, i64, i64), SmallVec<[u32; 4]>> = HashMap::new();
        let mut remap = vec![u32::MAX; self.vertices.len()];

        for face in &self.faces {
            let mapped: FaceLoop = face
                .iter()
                .map(|vid| {
                    if remap[*vid as usize] != u32::MAX {
                        return remap[*vid as usize];
                    }

                    let pt = self.vertices[*vid as usize];
                    let cell = (
                        (pt.x * inv_cell).round() as i64,
                        (pt.y * inv_cell).round() as i64,
                        (pt.z * inv_cell).round() as i64,
                    );

                    // Two points within `distance` of each other can only
                    // land in the same or an adjacent grid cell.
                    let mut target = u32::MAX;
                    'search: for dx in -1..=1 {
                        for dy in -1..=1 {
                            for dz in -1..=1 {
                                let key = (cell.0 + dx, cell.1 + dy, cell.2 + dz);
                                if let Some(ids) = cell_to_ids.get(&key) {
                                    for id in ids {
                                        if na::distance(&new_vertices[*id as usize], &pt)
                                            <= distance
                                        {
                                            target = *id;
                                            break 'search;
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if target == u32::MAX {
                        target = new_vertices.len() as u32;
                        new_vertices.push(pt);
                        new_normals.push(self.normals[*vid as usize]);
                        cell_to_ids.entry(cell).or_default().push(target);
                    }

                    remap[*vid as usize] = target;
                    target
                })
                .collect();

            let collapsed = collapse_repeated_vertices(&mapped);
            if collapsed.len() >= 3 {
                new_faces.push(collapsed);
            }
        }

        self.vertices = new_vertices;
        self.normals = new_normals;
        self.faces = new_faces;
        self.refresh_connected_components();

        num_before - self.vertices.len()
    }

    /// Fan-triangulates every polygon with more than three vertices, and
    /// returns the number of polygons that were triangulated.
    pub fn triangulate(&mut self) -> usize {
        let mut new_faces = Vec::with_capacity(self.faces.len());
        let mut fanned = 0;

        for face in &self.faces {
            if face.len() == 3 {
                new_faces.push(face.clone());
            } else {
                fanned += 1;
                for k in 1..face.len() - 1 {
                    new_faces.push(FaceLoop::from_slice(&[face[0], face[k], face[k + 1]]));
                }
            }
        }

        self.faces = new_faces;

        if fanned > 0 {
            self.refresh_connected_components();
        }

        fanned
    }
}
