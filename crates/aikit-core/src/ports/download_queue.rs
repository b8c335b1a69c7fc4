//! External download subsystem port.
//!
//! The OS-level download transport is an external collaborator: transfers
//! are enqueued, queried, and removed by an opaque identifier it assigns.
//! Snapshots carry the subsystem's raw status vocabulary (see
//! [`crate::domain::download::raw_status`]); mapping into the stable
//! [`crate::domain::DownloadStatus`] enumeration happens at the tracker
//! boundary.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// Request to enqueue a transfer with the external subsystem.
#[derive(Debug, Clone)]
pub struct EnqueueRequest {
    /// Source URL.
    pub url: String,
    /// Directory the artifact lands in.
    pub destination_dir: PathBuf,
    /// Filename inside the destination directory.
    pub filename: String,
    /// Human-readable title for the subsystem's transfer UI, if it has one.
    pub title: Option<String>,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
}

impl EnqueueRequest {
    /// Create a request with no title and no extra headers.
    pub fn new(
        url: impl Into<String>,
        destination_dir: impl Into<PathBuf>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            destination_dir: destination_dir.into(),
            filename: filename.into(),
            title: None,
            headers: Vec::new(),
        }
    }

    /// Set the transfer title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Append a request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Raw per-transfer state as reported by the subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSnapshot {
    /// Bytes moved so far.
    pub bytes_downloaded: u64,
    /// Total bytes, or 0 when the subsystem does not know yet.
    pub bytes_total: u64,
    /// Raw status code (`raw_status` vocabulary).
    pub status_code: i32,
    /// Raw failure reason code; 0 when not failed.
    pub reason_code: i32,
    /// Local URI of the (partial or complete) artifact, if reported.
    pub local_uri: Option<String>,
}

/// Failure talking to the download subsystem itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueueError {
    /// The subsystem rejected or failed the request.
    #[error("download subsystem error: {0}")]
    Transport(String),
}

/// Port over the external download subsystem.
#[async_trait]
pub trait DownloadQueuePort: Send + Sync {
    /// Enqueue a transfer; returns the subsystem-assigned identifier.
    async fn enqueue(&self, request: EnqueueRequest) -> Result<u64, QueueError>;

    /// Query one transfer. `Ok(None)` when the identifier is unknown.
    async fn query(&self, id: u64) -> Result<Option<TransferSnapshot>, QueueError>;

    /// Remove a transfer (cancelling it and deleting the artifact as a
    /// subsystem side effect). Returns the number of transfers removed.
    async fn remove(&self, id: u64) -> Result<u32, QueueError>;
}
