//! Settings storage
//!
//! Loads the optional `settings.json` from the data directory. The file is
//! read-only from the application's point of view; users edit it by hand.

use crate::storage::huggingface::ModelSource;
use crate::storage::{get_data_dir, StorageError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Context sizes llama.cpp is allowed to allocate for a request.
const VALID_CONTEXT_SIZES: [u32; 4] = [2048, 4096, 8192, 16384];

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Remote GGUF file to fetch on first request
    pub model: ModelSource,
    /// Local GGUF file; when set, `model` is never downloaded
    pub model_path: Option<PathBuf>,
    /// Directory where downloaded model files are cached
    pub models_directory: PathBuf,
    /// Layers to offload to the GPU. `None` picks automatically.
    pub gpu_layers: Option<u32>,
    /// Context window allocated per request (prompt + generated tokens)
    pub context_size: u32,
    /// Fixed sampling seed. `None` draws a fresh seed per request.
    pub seed: Option<u32>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            model: ModelSource::default(),
            model_path: None,
            models_directory: get_data_dir()
                .ok()
                .map(|d| d.join("models"))
                .unwrap_or_else(|| PathBuf::from("./models")),
            gpu_layers: None,
            context_size: 2048,
            seed: None,
        }
    }
}

impl AppSettings {
    /// Validate settings values
    ///
    /// Snaps the context size to the nearest supported value and drops
    /// blank model fields back to their defaults.
    pub fn validate(&mut self) {
        if !VALID_CONTEXT_SIZES.contains(&self.context_size) {
            let requested = self.context_size;
            self.context_size = *VALID_CONTEXT_SIZES
                .iter()
                .min_by_key(|&&size| (size as i64 - requested as i64).abs())
                .unwrap_or(&2048);
            tracing::warn!(
                "Unsupported context size {}, using {}",
                requested,
                self.context_size
            );
        }

        let defaults = ModelSource::default();
        if self.model.repo_id.trim().is_empty() {
            self.model.repo_id = defaults.repo_id;
        }
        if self.model.filename.trim().is_empty() {
            self.model.filename = defaults.filename;
        }
        if self.model.revision.trim().is_empty() {
            self.model.revision = defaults.revision;
        }

        if self
            .model_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            self.model_path = None;
        }
    }
}

/// Get the settings file path
fn get_settings_path() -> Result<PathBuf, StorageError> {
    Ok(get_data_dir()?.join("settings.json"))
}

/// Load settings from disk
///
/// Returns default settings if the file doesn't exist or is corrupted
pub fn load_settings() -> AppSettings {
    let loaded = get_settings_path().and_then(|path| load_settings_from(&path));
    match loaded {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to load settings, using defaults: {}", e);
            AppSettings::default()
        }
    }
}

/// Settings loading with error propagation
pub fn load_settings_from(path: &Path) -> Result<AppSettings, StorageError> {
    if !path.exists() {
        tracing::info!("Settings file not found, using defaults");
        return Ok(AppSettings::default());
    }

    let json = fs::read_to_string(path)?;
    let mut settings: AppSettings = serde_json::from_str(&json)?;
    settings.validate();

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.context_size, 2048);
        assert_eq!(settings.model, ModelSource::default());
        assert!(settings.model_path.is_none());
        assert!(settings.gpu_layers.is_none());
        assert!(settings.seed.is_none());
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = AppSettings::default();

        settings.context_size = 5000;
        settings.validate();
        assert_eq!(settings.context_size, 4096);

        settings.context_size = 100;
        settings.validate();
        assert_eq!(settings.context_size, 2048);

        settings.model.repo_id = "  ".to_string();
        settings.model.revision = String::new();
        settings.model_path = Some(PathBuf::new());
        settings.validate();
        assert_eq!(settings.model.repo_id, ModelSource::default().repo_id);
        assert_eq!(settings.model.revision, "main");
        assert!(settings.model_path.is_none());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings.context_size, 2048);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "gpu_layers": 0, "seed": 42, "context_size": 8192 }"#).unwrap();

        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.gpu_layers, Some(0));
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.context_size, 8192);
        assert_eq!(settings.model, ModelSource::default());
    }

    #[test]
    fn test_corrupted_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            load_settings_from(&path),
            Err(StorageError::Json(_))
        ));
    }
}
