//! Model types
//!
//! Lifecycle of the lazily loaded model, as shown to the user.

/// Represents the current state of the model
#[derive(Clone, PartialEq, Debug, Default)]
pub enum ModelState {
    /// Nothing loaded yet; the first question triggers the load
    #[default]
    NotLoaded,
    /// Weights are being fetched from the hub
    Downloading { downloaded: u64, total: u64 },
    /// Weights are on disk and being handed to llama.cpp
    Loading,
    /// Ready, with a short description of name and placement
    Loaded(String),
    /// Last load attempt failed; the next question retries
    Error(String),
}

impl ModelState {
    /// Download progress in percent, if a download is running.
    pub fn download_percent(&self) -> Option<u8> {
        match self {
            ModelState::Downloading { downloaded, total } if *total > 0 => {
                Some(((*downloaded).min(*total) * 100 / *total) as u8)
            }
            ModelState::Downloading { .. } => Some(0),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, ModelState::Downloading { .. } | ModelState::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_percent() {
        let state = ModelState::Downloading {
            downloaded: 50,
            total: 200,
        };
        assert_eq!(state.download_percent(), Some(25));

        let unknown = ModelState::Downloading {
            downloaded: 10,
            total: 0,
        };
        assert_eq!(unknown.download_percent(), Some(0));
        assert_eq!(ModelState::Loading.download_percent(), None);
    }

    #[test]
    fn test_busy_states() {
        assert!(ModelState::Loading.is_busy());
        assert!(!ModelState::NotLoaded.is_busy());
        assert!(!ModelState::Error("x".into()).is_busy());
    }
}
