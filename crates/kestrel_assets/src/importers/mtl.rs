//! Wavefront material importer
//!
//! Only the first material in the file is used. Diffuse colour becomes the
//! base colour and dissolve the alpha. The PBR extension keys `Pm` and `Pr`
//! set metallic and roughness when present.

use super::{asset_name, Importer};
use crate::data::{AssetData, MaterialData};
use crate::error::{AssetError, Result};
use std::path::Path;

/// Imports `.mtl` files
#[derive(Clone, Copy, Debug, Default)]
pub struct MtlImporter;

impl Importer for MtlImporter {
    fn load(&self, path: &Path) -> Result<Vec<AssetData>> {
        let file = path.display().to_string();
        if !path.is_file() {
            return Err(AssetError::NotFound(file));
        }
        let (materials, _) =
            tobj::load_mtl(path).map_err(|e| AssetError::parse(file.clone(), e.to_string()))?;
        let material = materials
            .into_iter()
            .next()
            .ok_or_else(|| AssetError::parse(file, "no materials defined"))?;

        Ok(vec![AssetData::Material(convert(material, asset_name(path)))])
    }

    fn supported_extensions(&self) -> &[&str] {
        &["mtl"]
    }

    fn name(&self) -> &'static str {
        "mtl"
    }
}

pub(crate) fn convert(material: tobj::Material, name: String) -> MaterialData {
    let [r, g, b] = material.diffuse.unwrap_or([1.0, 1.0, 1.0]);
    let alpha = material.dissolve.unwrap_or(1.0);
    let extension = |key: &str| {
        material
            .unknown_param
            .get(key)
            .and_then(|v| v.trim().parse::<f32>().ok())
    };
    MaterialData {
        name,
        color: [r, g, b, alpha],
        metallic: extension("Pm").unwrap_or(0.0),
        roughness: extension("Pr").unwrap_or(1.0),
    }
}
