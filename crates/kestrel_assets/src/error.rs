//! Asset error types

use std::io;
use thiserror::Error;

/// Errors that can occur while importing or uploading assets
#[derive(Error, Debug)]
pub enum AssetError {
    /// File or asset does not exist
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// IO error when reading a file
    #[error("IO error reading {file}: {source}")]
    Io {
        /// File being read
        file: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// File contents could not be understood
    #[error("Failed to parse {file}: {detail}")]
    Parse {
        /// File being parsed
        file: String,
        /// What was wrong with it
        detail: String,
    },

    /// No importer handles the file extension
    #[error("Unsupported asset format: {0}")]
    UnsupportedFormat(String),

    /// The GPU or audio device rejected the data
    #[error("Upload of {name} failed: {reason}")]
    Upload {
        /// Asset being uploaded
        name: String,
        /// Device supplied reason
        reason: String,
    },

    /// A loader worker thread could not be started
    #[error("Failed to spawn loader worker: {0}")]
    WorkerSpawn(#[source] io::Error),

    /// Image decoding failed
    #[error("Image decoding failed for {file}: {source}")]
    Image {
        /// Image file
        file: String,
        /// Decoder error
        #[source]
        source: image::ImageError,
    },
}

impl AssetError {
    /// Wrap an IO error, mapping a missing file to [`AssetError::NotFound`]
    pub fn io(file: impl Into<String>, source: io::Error) -> Self {
        let file = file.into();
        if source.kind() == io::ErrorKind::NotFound {
            AssetError::NotFound(file)
        } else {
            AssetError::Io { file, source }
        }
    }

    /// Build a parse error
    pub fn parse(file: impl Into<String>, detail: impl Into<String>) -> Self {
        AssetError::Parse {
            file: file.into(),
            detail: detail.into(),
        }
    }

    /// Build an upload error
    pub fn upload(name: impl Into<String>, reason: impl Into<String>) -> Self {
        AssetError::Upload {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for kestrel_assets operations
pub type Result<T> = std::result::Result<T, AssetError>;
