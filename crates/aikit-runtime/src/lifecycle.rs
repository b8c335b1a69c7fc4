//! Model lifecycle manager.
//!
//! Owns the single permitted loaded-model slot: `Unloaded → Loading →
//! Loaded → Unloading → Unloaded`, with `Loading` only ever resolving to
//! `Loaded` or rolling back to `Unloaded` on failure. Loading over an
//! occupied slot is rejected with `AlreadyLoaded`; the caller must unload
//! first.

use std::path::PathBuf;
use std::sync::Arc;

use aikit_core::domain::{LoadRequest, ModelHandle};
use aikit_core::error::{BridgeError, BridgeResult};
use aikit_core::ports::{KeyValueStore, StoreError, keys, mark_external_change};

use crate::state::{EngineRuntime, SlotState};

/// Orchestrates model loads and unloads against the engine slot.
pub struct ModelLifecycle {
    runtime: Arc<EngineRuntime>,
    store: Arc<dyn KeyValueStore>,
}

impl ModelLifecycle {
    /// Create a lifecycle manager over a shared runtime slot.
    pub fn new(runtime: Arc<EngineRuntime>, store: Arc<dyn KeyValueStore>) -> Self {
        Self { runtime, store }
    }

    /// Load a model file into the slot.
    ///
    /// Fails with `InvalidInput` when no file exists at the path,
    /// `AlreadyLoading` while a load or unload is in flight, and
    /// `AlreadyLoaded` while another model occupies the slot. On native
    /// success the path is persisted as the last-loaded model and returned.
    pub async fn load(&self, request: LoadRequest) -> BridgeResult<PathBuf> {
        if !request.path.is_file() {
            return Err(BridgeError::invalid_input(format!(
                "model file not found at {}",
                request.path.display()
            )));
        }

        self.runtime.begin_load()?;
        tracing::info!(
            path = %request.path.display(),
            use_mmap = request.use_mmap,
            threads = request.threads,
            "loading model"
        );

        let engine = Arc::clone(self.runtime.engine());
        let native_request = request.clone();
        let result = tokio::task::spawn_blocking(move || engine.load(&native_request)).await;

        // A panicked load task counts as a native failure; the slot rolls back.
        let result = match result {
            Ok(outcome) => outcome,
            Err(join_error) => Err(aikit_core::ports::EngineError::Load(format!(
                "load task aborted: {join_error}"
            ))),
        };

        match result {
            Ok(()) => {
                self.runtime
                    .finish_load(Some(ModelHandle::from_request(&request)));
                self.persist_last_model(&request.path).await;
                tracing::info!(path = %request.path.display(), "model loaded");
                Ok(request.path)
            }
            Err(e) => {
                self.runtime.finish_load(None);
                tracing::warn!(path = %request.path.display(), error = %e, "model load failed");
                Err(BridgeError::native_load_failure(e.to_string()))
            }
        }
    }

    /// Release the loaded model.
    ///
    /// No-op success when the slot is already empty. Fails with
    /// `GenerationInProgress` while a session is active.
    pub async fn unload(&self) -> BridgeResult<()> {
        if !self.runtime.begin_unload()? {
            return Ok(());
        }

        let engine = Arc::clone(self.runtime.engine());
        if let Err(join_error) = tokio::task::spawn_blocking(move || engine.unload()).await {
            tracing::warn!(error = %join_error, "native unload task aborted");
        }
        self.runtime.finish_unload();

        if let Err(e) = self.store.remove(keys::LAST_MODEL_PATH).await {
            tracing::warn!(error = %e, "failed to clear last-model record");
        }
        mark_external_change(self.store.as_ref()).await;
        tracing::info!("model unloaded");
        Ok(())
    }

    /// Path of the last successfully loaded model, if any.
    ///
    /// Pure key-value read; no native call.
    pub async fn last_loaded_path(&self) -> BridgeResult<Option<String>> {
        self.store
            .get(keys::LAST_MODEL_PATH)
            .await
            .map_err(store_error)
    }

    /// Whether a model currently occupies the slot.
    pub fn is_loaded(&self) -> bool {
        self.runtime.is_loaded()
    }

    /// Snapshot of the slot state.
    pub fn slot(&self) -> SlotState {
        self.runtime.slot()
    }

    async fn persist_last_model(&self, path: &std::path::Path) {
        // The model is loaded at this point; a store failure must not
        // un-load it. Record keeping degrades to a warning.
        let value = path.display().to_string();
        if let Err(e) = self.store.set(keys::LAST_MODEL_PATH, &value).await {
            tracing::warn!(error = %e, "failed to persist last-model record");
        }
        mark_external_change(self.store.as_ref()).await;
    }
}

fn store_error(e: StoreError) -> BridgeError {
    BridgeError::Io {
        kind: "KeyValueStore".to_string(),
        message: e.to_string(),
    }
}
