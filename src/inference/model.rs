//! Model file checks
//!
//! Cheap sanity checks run before handing a file to llama.cpp, which
//! otherwise aborts with an opaque message on garbage input.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Magic bytes at the start of every GGUF file
pub const GGUF_MAGIC: [u8; 4] = *b"GGUF";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model file not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not a GGUF file: {0}")]
    InvalidFormat(String),
}

/// Check that `path` exists and starts with the GGUF magic.
pub fn validate_gguf(path: &Path) -> Result<(), ModelError> {
    if !path.is_file() {
        return Err(ModelError::NotFound(path.display().to_string()));
    }

    let mut magic = [0u8; 4];
    let mut file = File::open(path)?;
    match file.read_exact(&mut magic) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ModelError::InvalidFormat(format!(
                "{} is too short",
                path.display()
            )));
        }
        Err(e) => return Err(e.into()),
    }

    if magic != GGUF_MAGIC {
        return Err(ModelError::InvalidFormat(path.display().to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_gguf_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.gguf");
        std::fs::write(&path, b"GGUF\x03\x00\x00\x00rest").unwrap();
        assert!(validate_gguf(&path).is_ok());
    }

    #[test]
    fn test_rejects_html_error_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.gguf");
        std::fs::write(&path, b"<!DOCTYPE html>").unwrap();
        assert!(matches!(validate_gguf(&path), Err(ModelError::InvalidFormat(_))));
    }

    #[test]
    fn test_rejects_short_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.gguf");
        std::fs::write(&path, b"GG").unwrap();
        assert!(matches!(validate_gguf(&path), Err(ModelError::InvalidFormat(_))));

        let missing = dir.path().join("missing.gguf");
        assert!(matches!(validate_gguf(&missing), Err(ModelError::NotFound(_))));
    }
}
