//! Engine configuration
//!
//! Configuration is plain TOML. Every field has a default so an empty file
//! is a valid configuration:
//!
//! ```toml
//! [loader]
//! workers = 5
//! request_capacity = 256
//! result_capacity = 64
//! drain_budget_ms = 5
//! asset_dir = "assets"
//! ```

use crate::error::{EngineError, Result};
use kestrel_assets::LoaderConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top level engine configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Asset loader settings
    pub loader: LoaderConfig,
}

impl EngineConfig {
    /// Read a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(file = %path.display(), "loaded engine configuration");
        Ok(config)
    }

    /// Parse configuration text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Serialize to TOML text
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EngineError::Config(e.to_string()))
    }

    pub fn with_loader(mut self, loader: LoaderConfig) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.loader.workers = workers;
        self
    }

    pub fn with_asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.loader.asset_dir = dir.into();
        self
    }

    pub fn with_drain_budget_ms(mut self, ms: u64) -> Self {
        self.loader.drain_budget_ms = ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.loader.workers, 5);
        assert_eq!(config.loader.drain_budget_ms, 5);
    }

    #[test]
    fn test_partial_loader_section() {
        let config = EngineConfig::from_toml_str(
            r#"
            [loader]
            workers = 2
            asset_dir = "assets"
            "#,
        )
        .unwrap();
        assert_eq!(config.loader.workers, 2);
        assert_eq!(config.loader.asset_dir, PathBuf::from("assets"));
        assert_eq!(config.loader.request_capacity, 256);
    }

    #[test]
    fn test_invalid_config() {
        let err = EngineConfig::from_toml_str("[loader]\nworkers = \"many\"").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kestrel.toml");
        let config = EngineConfig::default()
            .with_workers(3)
            .with_drain_budget_ms(8)
            .with_asset_dir("data");
        fs::write(&path, config.to_toml().unwrap()).unwrap();

        assert_eq!(EngineConfig::load(&path).unwrap(), config);

        let missing = EngineConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, EngineError::Io { .. }));
    }
}
