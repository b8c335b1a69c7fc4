//! The aikit composition facade.
//!
//! [`AiBridge`] is the composition root for the caller-facing surface:
//! acquisition (download tracking, file import), the model lifecycle, and
//! streaming generation. Embedders construct it once with concrete
//! implementations of the ports and route every call through it.
//!
//! ```ignore
//! let bridge = AiBridge::new(BridgeDeps {
//!     engine,
//!     queue,
//!     store,
//!     listener,
//!     downloads_dir,
//! });
//!
//! let receipt = bridge.acquire(url, "model.gguf").await?;
//! // ... poll bridge.progress(receipt.download_id) until Succeeded ...
//! bridge.load(LoadRequest::new(receipt.path)).await?;
//! let ticket = bridge.generate(GenerationRequest::new("hello"))?;
//! let outcome = ticket.wait().await;
//! ```

#![deny(unused_crate_dependencies)]

// Dev-dependencies are exercised by the integration tests in `tests/`, but the
// `unused_crate_dependencies` lint evaluates them against this lib test target.
// Reference them here so the lint sees the usage.
#[cfg(test)]
use {async_trait as _, tempfile as _, tokio as _};

use std::path::PathBuf;
use std::sync::Arc;

use aikit_core::domain::{
    AcquireReceipt, DownloadProgress, GenerationRequest, ImportedModel, LoadRequest, LocatedFile,
};
use aikit_core::error::BridgeResult;
use aikit_core::ports::{
    DownloadQueuePort, GenerationListener, ImportSource, InferenceEngine, KeyValueStore,
    mark_external_change,
};
use aikit_download::{DownloadTracker, ModelImporter};
use aikit_runtime::{EngineRuntime, GenerationController, GenerationTicket, ModelLifecycle};

/// Everything needed to construct an [`AiBridge`].
pub struct BridgeDeps {
    /// The native inference engine.
    pub engine: Arc<dyn InferenceEngine>,
    /// The platform download subsystem.
    pub queue: Arc<dyn DownloadQueuePort>,
    /// The platform key-value store.
    pub store: Arc<dyn KeyValueStore>,
    /// Listener receiving generation tokens and outcomes. Registered up
    /// front; sessions cannot gain a listener mid-stream.
    pub listener: Arc<dyn GenerationListener>,
    /// Managed directory for downloaded and imported model files.
    pub downloads_dir: PathBuf,
}

/// The caller-facing facade.
pub struct AiBridge {
    lifecycle: ModelLifecycle,
    controller: GenerationController,
    tracker: DownloadTracker,
    importer: ModelImporter,
    store: Arc<dyn KeyValueStore>,
}

impl AiBridge {
    /// Wire the services over the supplied ports.
    #[must_use]
    pub fn new(deps: BridgeDeps) -> Self {
        let runtime = Arc::new(EngineRuntime::new(deps.engine));
        Self {
            lifecycle: ModelLifecycle::new(Arc::clone(&runtime), Arc::clone(&deps.store)),
            controller: GenerationController::new(runtime, deps.listener),
            tracker: DownloadTracker::new(deps.queue, deps.downloads_dir.clone()),
            importer: ModelImporter::new(deps.downloads_dir),
            store: deps.store,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Acquisition
    // ─────────────────────────────────────────────────────────────────────

    /// Start downloading model weights. See [`DownloadTracker::acquire`].
    pub async fn acquire(&self, url: &str, filename: &str) -> BridgeResult<AcquireReceipt> {
        self.tracker.acquire(url, filename).await
    }

    /// Progress view for one acquisition. See [`DownloadTracker::progress`].
    pub async fn progress(&self, download_id: u64) -> BridgeResult<DownloadProgress> {
        self.tracker.progress(download_id).await
    }

    /// Probe the managed directory for a named artifact. Never fails.
    #[must_use]
    pub fn locate(&self, filename: &str) -> LocatedFile {
        self.tracker.locate(filename)
    }

    /// Delete an acquisition's artifact; returns whether anything was
    /// deleted. External surfaces are told to resync when it was.
    pub async fn remove(&self, filename: &str, download_id: Option<u64>) -> bool {
        let deleted = self.tracker.remove(filename, download_id).await;
        if deleted {
            mark_external_change(self.store.as_ref()).await;
        }
        deleted
    }

    /// Import an externally selected model file into managed storage.
    pub async fn import(&self, source: &dyn ImportSource) -> BridgeResult<ImportedModel> {
        let imported = self.importer.import(source)?;
        mark_external_change(self.store.as_ref()).await;
        Ok(imported)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Model lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Load a model into the single engine slot. See
    /// [`ModelLifecycle::load`].
    pub async fn load(&self, request: LoadRequest) -> BridgeResult<PathBuf> {
        self.lifecycle.load(request).await
    }

    /// Release the loaded model. See [`ModelLifecycle::unload`].
    pub async fn unload(&self) -> BridgeResult<()> {
        self.lifecycle.unload().await
    }

    /// Path of the last successfully loaded model, if any.
    pub async fn last_loaded_path(&self) -> BridgeResult<Option<String>> {
        self.lifecycle.last_loaded_path().await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Generation
    // ─────────────────────────────────────────────────────────────────────

    /// Start a generation session. See [`GenerationController::generate`].
    pub fn generate(&self, request: GenerationRequest) -> BridgeResult<GenerationTicket> {
        self.controller.generate(request)
    }

    /// Cancel the active session, if any. Always succeeds.
    pub fn cancel(&self) {
        self.controller.cancel();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Component access
    // ─────────────────────────────────────────────────────────────────────

    /// The lifecycle manager.
    pub const fn lifecycle(&self) -> &ModelLifecycle {
        &self.lifecycle
    }

    /// The session controller.
    pub const fn controller(&self) -> &GenerationController {
        &self.controller
    }

    /// The download tracker.
    pub const fn tracker(&self) -> &DownloadTracker {
        &self.tracker
    }
}
