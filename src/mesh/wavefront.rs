use crate::math::{Point, Real, Vector};
use crate::mesh::{FaceLoop, MeshBuilderError, SurfaceMesh, SurfaceMeshFlags};
use obj::{Group, IndexTuple, ObjData, ObjError, Object, SimplePolygon};
use std::path::Path;

/// Failure when importing a mesh from a Wavefront (`.obj`) file.
#[derive(thiserror::Error, Debug)]
pub enum WavefrontError {
    /// The file could not be read or parsed.
    #[error("obj error: {0}")]
    Obj(#[from] ObjError),
    /// The parsed buffers don't form a valid surface mesh.
    #[error("mesh error: {0}")]
    Mesh(#[from] MeshBuilderError),
}

impl SurfaceMesh {
    /// Outputs a Wavefront (`.obj`) file at the given path, including the
    /// per-vertex normals.
    ///
    /// This function is enabled by the `wavefront` feature flag.
    pub fn to_obj_file(&self, path: &Path) -> Result<(), ObjError> {
        let mut file = std::fs::File::create(path).map_err(ObjError::Io)?;

        ObjData {
            #[allow(clippy::unnecessary_cast)]
            position: self
                .vertices()
                .iter()
                .map(|v| [v.x as f32, v.y as f32, v.z as f32])
                .collect(),
            #[allow(clippy::unnecessary_cast)]
            normal: self
                .normals()
                .iter()
                .map(|n| [n.x as f32, n.y as f32, n.z as f32])
                .collect(),
            objects: vec![Object {
                groups: vec![Group {
                    polys: self
                        .faces()
                        .iter()
                        .map(|face| {
                            SimplePolygon(
                                face.iter()
                                    .map(|vid| {
                                        IndexTuple(*vid as usize, None, Some(*vid as usize))
                                    })
                                    .collect(),
                            )
                        })
                        .collect(),
                    name: "".to_string(),
                    index: 0,
                    material: None,
                }],
                name: "".to_string(),
            }],
            ..Default::default()
        }
        .write_to_buf(&mut file)
    }

    /// Loads a surface mesh from a Wavefront (`.obj`) file.
    ///
    /// Every polygon of the file ends up in a single mesh, whatever object or
    /// group it belongs to. If the file provides a normal for every referenced
    /// vertex these normals are kept, otherwise they are all recomputed from
    /// the face geometry.
    ///
    /// This function is enabled by the `wavefront` feature flag.
    pub fn from_obj_file(path: &Path) -> Result<Self, WavefrontError> {
        let file = std::fs::File::open(path).map_err(ObjError::Io)?;
        let data = ObjData::load_buf(std::io::BufReader::new(file))?;

        #[allow(clippy::unnecessary_cast)]
        let vertices: Vec<Point<Real>> = data
            .position
            .iter()
            .map(|p| Point::new(p[0] as Real, p[1] as Real, p[2] as Real))
            .collect();

        let mut normals: Vec<Option<Vector<Real>>> = vec![None; vertices.len()];
        let mut faces = Vec::new();

        for object in &data.objects {
            for group in &object.groups {
                for poly in &group.polys {
                    let mut face = FaceLoop::new();

                    for IndexTuple(pos, _, normal) in &poly.0 {
                        face.push(*pos as u32);

                        if let (Some(nid), Some(slot)) = (normal, normals.get_mut(*pos)) {
                            #[allow(clippy::unnecessary_cast)]
                            if let Some(n) = data.normal.get(*nid) {
                                *slot =
                                    Some(Vector::new(n[0] as Real, n[1] as Real, n[2] as Real));
                            }
                        }
                    }

                    faces.push(face);
                }
            }
        }

        // Only keep the file's normals if they cover every vertex.
        let normals = if !normals.is_empty() && normals.iter().all(|n| n.is_some()) {
            Some(normals.into_iter().flatten().collect())
        } else {
            None
        };

        Ok(Self::with_flags(
            vertices,
            normals,
            faces,
            SurfaceMeshFlags::empty(),
        )?)
    }
}
