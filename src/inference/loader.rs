//! Lazy model loader
//!
//! Holds the single `LlamaEngine` for the process. The first caller of
//! [`ModelLoader::engine`] fetches and loads the model; concurrent callers
//! wait on the same load. A failed load leaves the cell empty; callers that
//! were waiting on it, and the next request, each try again.

use crate::inference::engine::{EngineError, LlamaEngine};
use crate::inference::model::validate_gguf;
use crate::storage::huggingface::fetch_model;
use crate::storage::settings::AppSettings;
use crate::system::gpu::resolve_placement;
use crate::types::model::ModelState;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{watch, OnceCell};

/// Single-entry async slot holding one lazily loaded value
pub struct LoadSlot<T> {
    cell: OnceCell<Arc<T>>,
}

impl<T> Default for LoadSlot<T> {
    fn default() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }
}

impl<T> LoadSlot<T> {
    /// Return the stored value, running `load` if the slot is empty.
    ///
    /// Only one `load` runs at a time; a successful one is shared by every
    /// waiting caller. An error is returned to the caller that ran it and
    /// nothing is stored.
    pub async fn get_or_load<F, Fut>(&self, load: F) -> Result<Arc<T>, EngineError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, EngineError>>,
    {
        self.cell
            .get_or_try_init(|| async { load().await.map(Arc::new) })
            .await
            .cloned()
    }
}

pub struct ModelLoader {
    settings: AppSettings,
    engine: LoadSlot<LlamaEngine>,
    state: watch::Sender<ModelState>,
}

impl ModelLoader {
    pub fn new(settings: AppSettings) -> Self {
        let (state, _) = watch::channel(ModelState::NotLoaded);
        Self {
            settings,
            engine: LoadSlot::default(),
            state,
        }
    }

    /// Observe load progress; the UI mirrors this into its status line.
    pub fn subscribe(&self) -> watch::Receiver<ModelState> {
        self.state.subscribe()
    }

    /// Return the loaded engine, loading it on first use.
    pub async fn engine(&self) -> Result<Arc<LlamaEngine>, EngineError> {
        self.engine
            .get_or_load(|| async {
                let result = self.load().await;
                if let Err(e) = &result {
                    tracing::error!("Model load failed: {}", e);
                    self.state.send_replace(ModelState::Error(e.to_string()));
                }
                result
            })
            .await
    }

    async fn load(&self) -> Result<LlamaEngine, EngineError> {
        let path = self.resolve_model_path().await?;
        validate_gguf(&path)?;

        self.state.send_replace(ModelState::Loading);
        let placement = resolve_placement(self.settings.gpu_layers);
        let context_size = self.settings.context_size;
        let engine = tokio::task::spawn_blocking(move || {
            LlamaEngine::load(&path, placement, context_size)
        })
        .await
        .map_err(|e| EngineError::Task(e.to_string()))??;

        let info = engine.info();
        self.state.send_replace(ModelState::Loaded(format!(
            "{} on {}",
            info.name, info.placement
        )));
        Ok(engine)
    }

    async fn resolve_model_path(&self) -> Result<PathBuf, EngineError> {
        if let Some(path) = &self.settings.model_path {
            tracing::info!("Using local model file {:?}", path);
            return Ok(path.clone());
        }

        self.state.send_replace(ModelState::Downloading {
            downloaded: 0,
            total: 0,
        });
        let progress = self.state.clone();
        let path = fetch_model(
            &self.settings.model,
            &self.settings.models_directory,
            move |downloaded, total| {
                progress.send_replace(ModelState::Downloading { downloaded, total });
            },
        )
        .await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::model::ModelError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn loader_for(path: PathBuf) -> ModelLoader {
        ModelLoader::new(AppSettings {
            model_path: Some(path),
            ..AppSettings::default()
        })
    }

    #[tokio::test]
    async fn test_starts_unloaded() {
        let dir = tempfile::tempdir().unwrap();
        let loader = loader_for(dir.path().join("model.gguf"));
        assert_eq!(*loader.subscribe().borrow(), ModelState::NotLoaded);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_load() {
        let slot = LoadSlot::<u32>::default();
        let counter = AtomicUsize::new(0);
        let loads = &counter;
        let load = move || async move {
            loads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<u32, EngineError>(7)
        };

        let (a, b) = tokio::join!(slot.get_or_load(load), slot.get_or_load(load));
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(*a, 7);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        // Later callers reuse the stored value
        let c = slot.get_or_load(load).await.unwrap();
        assert!(Arc::ptr_eq(&a, &c));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_waiters_retry_after_failed_load() {
        let slot = LoadSlot::<u32>::default();
        let counter = AtomicUsize::new(0);
        let loads = &counter;
        let load = move || async move {
            loads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Err::<u32, _>(EngineError::Load("no weights".to_string()))
        };

        let (a, b) = tokio::join!(slot.get_or_load(load), slot.get_or_load(load));
        assert!(a.is_err());
        assert!(b.is_err());
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalid_file_reports_error_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.gguf");
        std::fs::write(&path, b"<html>not found</html>").unwrap();
        let loader = loader_for(path);

        let err = loader.engine().await.err().unwrap();
        assert!(matches!(
            err,
            EngineError::InvalidModel(ModelError::InvalidFormat(_))
        ));
        assert!(matches!(*loader.subscribe().borrow(), ModelState::Error(_)));
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.gguf");
        let loader = loader_for(path.clone());

        let first = loader.engine().await.err().unwrap();
        assert!(matches!(first, EngineError::InvalidModel(ModelError::NotFound(_))));

        // The second attempt sees the new file instead of a cached failure
        std::fs::write(&path, b"nope").unwrap();
        let second = loader.engine().await.err().unwrap();
        assert!(matches!(
            second,
            EngineError::InvalidModel(ModelError::InvalidFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_first_requests_both_see_failure() {
        let dir = tempfile::tempdir().unwrap();
        let loader = Arc::new(loader_for(dir.path().join("missing.gguf")));
        let mut rx = loader.subscribe();

        let a = tokio::spawn({
            let loader = loader.clone();
            async move { loader.engine().await.is_err() }
        });
        let b = tokio::spawn({
            let loader = loader.clone();
            async move { loader.engine().await.is_err() }
        });
        assert!(a.await.unwrap());
        assert!(b.await.unwrap());

        assert!(rx.has_changed().unwrap());
        assert!(matches!(*rx.borrow_and_update(), ModelState::Error(_)));
    }
}
