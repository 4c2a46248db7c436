//! File importers
//!
//! Importers turn a file on disk into one or more [`AssetData`] records.
//! They run on loader worker threads so they must be `Send + Sync` and may
//! block on IO.
//!
//! - PNG textures (`.png`)
//! - WAV audio (`.wav`)
//! - Shader sources (`.vsh` plus the matching `.fsh`)
//! - Bitmap fonts (`.fnt` plus the matching `.png` atlas)
//! - Wavefront materials (`.mtl`)
//! - Wavefront meshes (`.obj`)
//!
//! # Example
//!
//! ```ignore
//! use kestrel_assets::importers::{Importer, ImporterRegistry};
//!
//! let registry = ImporterRegistry::new();
//! let records = registry.load(Path::new("assets/lucida.fnt"))?;
//! ```

mod fnt;
mod mtl;
mod obj;
mod png;
mod shader;
mod wav;

pub use fnt::FntImporter;
pub use mtl::MtlImporter;
pub use obj::ObjImporter;
pub use png::PngImporter;
pub use shader::ShaderImporter;
pub use wav::WavImporter;

use crate::data::AssetData;
use crate::error::{AssetError, Result};
use std::path::Path;

/// Trait for file importers
pub trait Importer: Send + Sync {
    /// Read and parse a file
    fn load(&self, path: &Path) -> Result<Vec<AssetData>>;

    /// Get supported file extensions
    fn supported_extensions(&self) -> &[&str];

    /// Check if this importer can handle the given extension
    fn can_load(&self, extension: &str) -> bool {
        let ext_lower = extension.to_lowercase();
        self.supported_extensions()
            .iter()
            .any(|e| e.to_lowercase() == ext_lower)
    }

    /// Get the importer name for debugging
    fn name(&self) -> &'static str;
}

/// Registry of available importers, dispatching on file extension
pub struct ImporterRegistry {
    importers: Vec<Box<dyn Importer>>,
}

impl ImporterRegistry {
    /// Create a registry with every built-in importer
    pub fn new() -> Self {
        let importers: Vec<Box<dyn Importer>> = vec![
            Box::new(PngImporter),
            Box::new(WavImporter),
            Box::new(ShaderImporter),
            Box::new(FntImporter),
            Box::new(MtlImporter),
            Box::new(ObjImporter::new()),
        ];
        Self { importers }
    }

    /// Create a registry with no importers
    pub fn empty() -> Self {
        Self {
            importers: Vec::new(),
        }
    }

    /// Register a custom importer. Later registrations are tried last.
    pub fn register(&mut self, importer: Box<dyn Importer>) {
        self.importers.push(importer);
    }

    /// Check if a format is supported
    pub fn supports_format(&self, extension: &str) -> bool {
        self.importers.iter().any(|i| i.can_load(extension))
    }
}

impl Default for ImporterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Importer for ImporterRegistry {
    fn load(&self, path: &Path) -> Result<Vec<AssetData>> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let importer = self
            .importers
            .iter()
            .find(|i| i.can_load(extension))
            .ok_or_else(|| AssetError::UnsupportedFormat(path.display().to_string()))?;

        tracing::debug!(file = %path.display(), importer = importer.name(), "importing");
        importer.load(path)
    }

    fn supported_extensions(&self) -> &[&str] {
        // Not meaningful for the registry as a whole; see `supports_format`.
        &[]
    }

    fn can_load(&self, extension: &str) -> bool {
        self.supports_format(extension)
    }

    fn name(&self) -> &'static str {
        "registry"
    }
}

/// Asset name for a file: the file name without its extension
pub(crate) fn asset_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| AssetError::io(path.display().to_string(), e))
}

pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| AssetError::io(path.display().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_registry_dispatch() {
        let registry = ImporterRegistry::new();
        assert!(registry.can_load("PNG"));
        assert!(registry.can_load("wav"));
        assert!(!registry.can_load("gltf"));

        let err = registry.load(Path::new("scene.gltf")).unwrap_err();
        assert!(matches!(err, AssetError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_registry_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ImporterRegistry::new();
        let err = registry.load(&dir.path().join("ghost.vsh")).unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
    }

    #[test]
    fn test_registry_loads_material() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.mtl");
        fs::write(&path, "newmtl red\nKd 1.0 0.0 0.0\nd 0.5\n").unwrap();

        let records = ImporterRegistry::new().load(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), "red");
    }

    #[test]
    fn test_asset_name() {
        assert_eq!(asset_name(Path::new("dir/lucida.fnt")), "lucida");
        assert_eq!(asset_name(Path::new("box")), "box");
    }
}
