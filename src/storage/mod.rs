//! Persistent storage
//!
//! Data directory resolution, settings, and the model file cache.

pub mod huggingface;
pub mod settings;

use directories::ProjectDirs;
use std::path::PathBuf;

/// Errors raised by the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No data directory available on this platform")]
    NoDataDir,
    #[error("Invalid model filename: {0}")]
    InvalidFilename(String),
    #[error("Download failed: {0}")]
    Download(String),
}

/// Platform data directory for the application (settings, downloaded models).
pub fn get_data_dir() -> Result<PathBuf, StorageError> {
    ProjectDirs::from("org", "medassist", "MedAssist")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(StorageError::NoDataDir)
}
