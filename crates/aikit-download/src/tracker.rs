//! Download tracker.
//!
//! A thin status adapter over the external download subsystem: it issues
//! acquisition requests, reconciles the subsystem's raw state into the
//! stable progress view on every query (nothing is cached locally), and
//! handles cancellation/deletion of partial or completed artifacts.

use std::path::PathBuf;
use std::sync::Arc;

use aikit_core::domain::{AcquireReceipt, DownloadProgress, DownloadStatus, LocatedFile};
use aikit_core::error::{BridgeError, BridgeResult};
use aikit_core::paths::{destination_path, ensure_directory};
use aikit_core::ports::{DownloadQueuePort, EnqueueRequest, QueueError};

/// User agent attached to acquisition requests.
const USER_AGENT: &str = concat!("aikit/", env!("CARGO_PKG_VERSION"));

/// Tracks model-weight acquisitions through the external subsystem.
pub struct DownloadTracker {
    queue: Arc<dyn DownloadQueuePort>,
    downloads_dir: PathBuf,
}

impl DownloadTracker {
    /// Create a tracker writing into the given managed directory.
    pub fn new(queue: Arc<dyn DownloadQueuePort>, downloads_dir: impl Into<PathBuf>) -> Self {
        Self {
            queue,
            downloads_dir: downloads_dir.into(),
        }
    }

    /// The managed downloads directory.
    pub fn downloads_dir(&self) -> &std::path::Path {
        &self.downloads_dir
    }

    /// Issue an acquisition request.
    ///
    /// The destination is `downloads_dir/filename`; collisions overwrite,
    /// filenames are assumed caller-unique. Returns the subsystem-assigned
    /// identifier alongside the destination path.
    pub async fn acquire(&self, url: &str, filename: &str) -> BridgeResult<AcquireReceipt> {
        if url.trim().is_empty() {
            return Err(BridgeError::invalid_input("url is required"));
        }
        if filename.trim().is_empty() {
            return Err(BridgeError::invalid_input("filename is required"));
        }

        ensure_directory(&self.downloads_dir)?;
        let path = destination_path(&self.downloads_dir, filename);

        let request = EnqueueRequest::new(url, &self.downloads_dir, filename)
            .with_title(format!("Downloading model: {filename}"))
            .with_header("User-Agent", USER_AGENT);
        let download_id = self.queue.enqueue(request).await.map_err(subsystem_error)?;

        tracing::info!(
            id = download_id,
            filename,
            path = %path.display(),
            "acquisition enqueued"
        );
        Ok(AcquireReceipt { download_id, path })
    }

    /// Re-derive the progress view for one acquisition.
    ///
    /// Fails with `NotFound` when the identifier is unknown to the
    /// subsystem. The fraction is always within `[0, 1]`, 0 while the
    /// total is unknown.
    pub async fn progress(&self, download_id: u64) -> BridgeResult<DownloadProgress> {
        let snapshot = self
            .queue
            .query(download_id)
            .await
            .map_err(subsystem_error)?
            .ok_or_else(|| {
                BridgeError::not_found(format!("download {download_id} is unknown"))
            })?;

        let status = DownloadStatus::from_raw_code(snapshot.status_code);
        Ok(
            DownloadProgress::new(status, snapshot.bytes_downloaded, snapshot.bytes_total)
                .with_reason(snapshot.reason_code)
                .with_local_uri(snapshot.local_uri),
        )
    }

    /// Probe the managed directory for a named artifact. Never fails.
    #[must_use]
    pub fn locate(&self, filename: &str) -> LocatedFile {
        let path = destination_path(&self.downloads_dir, filename);
        let size_bytes = std::fs::metadata(&path).map(|m| m.len());
        LocatedFile {
            exists: size_bytes.is_ok(),
            size_bytes: size_bytes.unwrap_or(0),
            path,
        }
    }

    /// Delete an acquisition's artifact.
    ///
    /// When an identifier is supplied and the subsystem removes the
    /// transfer, the artifact is gone as a subsystem side effect.
    /// Otherwise falls back to deleting the file at the computed
    /// destination. Returns whether anything was deleted; deletion is
    /// advisory cleanup and never raises.
    pub async fn remove(&self, filename: &str, download_id: Option<u64>) -> bool {
        if let Some(id) = download_id {
            match self.queue.remove(id).await {
                Ok(removed) if removed > 0 => {
                    tracing::info!(id, "cancelled and removed download");
                    return true;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(id, error = %e, "subsystem removal failed, falling back to file delete");
                }
            }
        }

        let path = destination_path(&self.downloads_dir, filename);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "deleted artifact");
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "artifact deletion failed");
                false
            }
        }
    }
}

fn subsystem_error(e: QueueError) -> BridgeError {
    BridgeError::Io {
        kind: "DownloadSubsystem".to_string(),
        message: e.to_string(),
    }
}
