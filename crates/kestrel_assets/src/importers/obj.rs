//! Wavefront OBJ mesh importer
//!
//! Loads OBJ files using the `tobj` crate. Faces are triangulated and
//! vertex attributes are re-indexed to a single index buffer. The first
//! object in the file takes the file's name; further objects are named
//! `file:object`.

use super::{asset_name, Importer};
use crate::data::{AssetData, MeshData};
use crate::error::{AssetError, Result};
use std::path::Path;

/// Wavefront OBJ mesh importer
#[derive(Clone, Debug)]
pub struct ObjImporter {
    /// Whether to triangulate faces
    pub triangulate: bool,
}

impl ObjImporter {
    /// Create a new OBJ importer with default settings
    pub fn new() -> Self {
        Self { triangulate: true }
    }

    /// Set whether to triangulate non-triangle faces
    pub fn with_triangulate(mut self, triangulate: bool) -> Self {
        self.triangulate = triangulate;
        self
    }
}

impl Default for ObjImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Importer for ObjImporter {
    fn load(&self, path: &Path) -> Result<Vec<AssetData>> {
        let file = path.display().to_string();
        if !path.is_file() {
            return Err(AssetError::NotFound(file));
        }
        let load_options = tobj::LoadOptions {
            triangulate: self.triangulate,
            single_index: true,
            ..Default::default()
        };

        // Materials are requested separately as .mtl assets.
        let (models, _materials) = tobj::load_obj(path, &load_options)
            .map_err(|e| AssetError::parse(file.clone(), e.to_string()))?;

        let stem = asset_name(path);
        let mut records = Vec::with_capacity(models.len());
        for (i, model) in models.into_iter().enumerate() {
            let name = if i == 0 {
                stem.clone()
            } else {
                format!("{stem}:{}", model.name)
            };
            let mesh = model.mesh;
            if mesh.positions.is_empty() || mesh.indices.is_empty() {
                return Err(AssetError::parse(
                    file,
                    format!("object {} needs vertex and face data", model.name),
                ));
            }

            records.push(AssetData::Mesh(MeshData {
                name,
                positions: mesh
                    .positions
                    .chunks_exact(3)
                    .map(|p| [p[0], p[1], p[2]])
                    .collect(),
                normals: mesh
                    .normals
                    .chunks_exact(3)
                    .map(|n| [n[0], n[1], n[2]])
                    .collect(),
                uvs: mesh.texcoords.chunks_exact(2).map(|t| [t[0], t[1]]).collect(),
                indices: mesh.indices,
            }));
        }

        if records.is_empty() {
            return Err(AssetError::parse(file, "no objects defined"));
        }
        Ok(records)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["obj"]
    }

    fn name(&self) -> &'static str {
        "obj"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1 4//1
";

    #[test]
    fn test_load_quad_triangulated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.obj");
        std::fs::write(&path, QUAD).unwrap();

        let records = ObjImporter::new().load(&path).unwrap();
        assert_eq!(records.len(), 1);
        let AssetData::Mesh(mesh) = &records[0] else {
            panic!("expected mesh");
        };
        assert_eq!(mesh.name, "panel");
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.normals.len(), 4);
        assert!(mesh.uvs.is_empty());
    }

    #[test]
    fn test_rejects_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.obj");
        std::fs::write(&path, "# nothing here\n").unwrap();

        assert!(matches!(
            ObjImporter::new().load(&path),
            Err(AssetError::Parse { .. })
        ));
    }
}
