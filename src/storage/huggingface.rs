//! HuggingFace model downloader
//!
//! Resolves the fixed model repository to a local GGUF file, downloading it
//! into the models directory on first use.

use crate::storage::StorageError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Default repository holding the 4-bit medical model.
pub const DEFAULT_REPO_ID: &str = "Pablo305/llama3-medical-3b-4bit";
/// Default 4-bit GGUF export inside the repository.
pub const DEFAULT_FILENAME: &str = "llama3-medical-3b.Q4_K_M.gguf";

/// A single GGUF file on the HuggingFace hub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSource {
    pub repo_id: String,
    pub filename: String,
    #[serde(default = "default_revision")]
    pub revision: String,
}

fn default_revision() -> String {
    "main".to_string()
}

impl Default for ModelSource {
    fn default() -> Self {
        Self {
            repo_id: DEFAULT_REPO_ID.to_string(),
            filename: DEFAULT_FILENAME.to_string(),
            revision: default_revision(),
        }
    }
}

impl ModelSource {
    /// Build the download URL for the file
    pub fn download_url(&self) -> String {
        format!(
            "https://huggingface.co/{}/resolve/{}/{}",
            self.repo_id, self.revision, self.filename
        )
    }

    /// Name of the cached file inside the models directory.
    ///
    /// The repository id is folded in so two repos shipping the same
    /// filename don't collide.
    pub fn local_filename(&self) -> Result<String, StorageError> {
        sanitize_local_filename(&format!("{}/{}", self.repo_id, self.filename))
    }
}

fn sanitize_local_filename(filename: &str) -> Result<String, StorageError> {
    let trimmed = filename.trim();
    if trimmed.is_empty() {
        return Err(StorageError::InvalidFilename(filename.to_string()));
    }

    let no_query = trimmed.split('?').next().unwrap_or(trimmed);
    let no_fragment = no_query.split('#').next().unwrap_or(no_query);
    let no_leading = no_fragment.trim_start_matches('/');

    let flattened = no_leading.replace('\\', "/").replace('/', "__");

    let mut sanitized = String::with_capacity(flattened.len());
    for ch in flattened.chars() {
        let invalid = matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*');
        if invalid || ch.is_control() {
            sanitized.push('_');
        } else {
            sanitized.push(ch);
        }
    }

    while sanitized.ends_with('.') || sanitized.ends_with(' ') {
        sanitized.pop();
    }

    if sanitized.is_empty() {
        return Err(StorageError::InvalidFilename(filename.to_string()));
    }

    Ok(sanitized)
}

/// Return the local path of `source`, downloading it first if needed.
///
/// An existing non-empty file is reused as-is. Downloads stream into a
/// `.tmp` sibling that is renamed into place once complete.
pub async fn fetch_model(
    source: &ModelSource,
    models_dir: &Path,
    progress_callback: impl Fn(u64, u64) + Send + 'static,
) -> Result<PathBuf, StorageError> {
    let safe_filename = source.local_filename()?;

    fs::create_dir_all(models_dir)?;

    let output_path = models_dir.join(&safe_filename);
    let temp_path = models_dir.join(format!("{}.tmp", safe_filename));

    if output_path.exists() && fs::metadata(&output_path)?.len() > 0 {
        tracing::info!("Model already cached: {:?}", output_path);
        return Ok(output_path);
    }

    let download_url = source.download_url();
    tracing::info!("Downloading from: {}", download_url);
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(3600)) // 1 hour timeout for large models
        .build()
        .map_err(|e| StorageError::Download(format!("Failed to create HTTP client: {}", e)))?;

    let response = client
        .get(&download_url)
        .header("User-Agent", concat!("medassist/", env!("CARGO_PKG_VERSION")))
        .send()
        .await
        .map_err(|e| StorageError::Download(e.to_string()))?;

    if !response.status().is_success() {
        return Err(StorageError::Download(format!(
            "{} returned status {}",
            download_url,
            response.status()
        )));
    }

    let total_size = response
        .content_length()
        .ok_or_else(|| StorageError::Download("Could not determine file size".to_string()))?;

    tracing::info!("File size: {}", format_size(total_size));

    let mut temp_file = File::create(&temp_path).await?;

    let mut response = response;
    let mut downloaded: u64 = 0;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| StorageError::Download(e.to_string()))?
    {
        temp_file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        progress_callback(downloaded, total_size);
    }
    temp_file.flush().await?;

    if downloaded != total_size {
        return Err(StorageError::Download(format!(
            "Download incomplete: got {} bytes, expected {}",
            downloaded, total_size
        )));
    }

    fs::rename(&temp_path, &output_path)?;

    tracing::info!("Download complete: {:?}", output_path);

    Ok(output_path)
}

/// Get a human-readable size string
pub fn format_size(bytes: u64) -> String {
    let bytes = bytes as f64;
    if bytes < 1024.0 {
        format!("{} B", bytes as u64)
    } else if bytes < 1024.0 * 1024.0 {
        format!("{:.2} KB", bytes / 1024.0)
    } else if bytes < 1024.0 * 1024.0 * 1024.0 {
        format!("{:.2} MB", bytes / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes / (1024.0 * 1024.0 * 1024.0))
    }
}
