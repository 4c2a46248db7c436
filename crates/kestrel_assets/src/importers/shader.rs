//! Shader source importer
//!
//! A shader called `phong` is stored as `phong.vsh` and `phong.fsh`. Both
//! stages must be present.

use super::{asset_name, read_to_string, Importer};
use crate::data::{AssetData, ShaderSource};
use crate::error::Result;
use std::path::Path;

/// Imports `.vsh` files together with their `.fsh` fragment stage
#[derive(Clone, Copy, Debug, Default)]
pub struct ShaderImporter;

impl Importer for ShaderImporter {
    fn load(&self, path: &Path) -> Result<Vec<AssetData>> {
        let vertex = read_to_string(path)?;
        let fragment = read_to_string(&path.with_extension("fsh"))?;
        Ok(vec![AssetData::Shader(ShaderSource {
            name: asset_name(path),
            vertex,
            fragment,
        })])
    }

    fn supported_extensions(&self) -> &[&str] {
        &["vsh"]
    }

    fn name(&self) -> &'static str {
        "shader"
    }
}
