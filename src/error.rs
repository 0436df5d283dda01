// error.rs - Error taxonomy for the ingest and export pipeline

use thiserror::Error;

/// Result type for massing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while ingesting images or exporting geometry
#[derive(Error, Debug)]
pub enum Error {
    /// The image bytes could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] image::ImageError),

    /// A sampling, meshing or massing parameter is out of range
    #[error("Invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    /// A mesh instance cannot be turned into triangles
    #[error("Invalid geometry in instance {instance}: {reason}")]
    InvalidGeometry { instance: usize, reason: String },

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config error: {0}")]
    Config(String),

    /// Snapshot (de)serialization failed
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// The background decode task panicked or was cancelled
    #[error("Ingest task aborted: {0}")]
    TaskAborted(String),
}

impl Error {
    pub(crate) fn invalid_param(
        name: &'static str,
        value: impl ToString,
        reason: &'static str,
    ) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
