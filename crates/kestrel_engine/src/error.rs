//! Engine error types

use kestrel_assets::AssetError;
use kestrel_core::EntityError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while setting up, configuring or populating an engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration text could not be parsed or produced
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be read or written
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The asset loader could not be started
    #[error("Asset loader error: {0}")]
    Asset(#[from] AssetError),

    /// No entity could be created
    #[error("Entity error: {0}")]
    Entity(#[from] EntityError),
}

/// Result type for kestrel_engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
