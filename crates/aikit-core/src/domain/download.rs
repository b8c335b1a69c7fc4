//! Download status and progress view types.
//!
//! These are views re-derived from the external download subsystem on each
//! query; nothing here is cached or stored locally beyond the opaque
//! download identifier handed out at acquisition time.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Raw status codes reported by the external download subsystem.
///
/// These are the transport's wire values; they are mapped into
/// [`DownloadStatus`] at the tracker boundary and never exposed to callers.
pub mod raw_status {
    /// The transfer is waiting to start.
    pub const PENDING: i32 = 1;
    /// The transfer is actively moving bytes.
    pub const RUNNING: i32 = 2;
    /// The transfer is paused (e.g., waiting for connectivity).
    pub const PAUSED: i32 = 4;
    /// The transfer finished successfully.
    pub const SUCCESSFUL: i32 = 8;
    /// The transfer failed.
    pub const FAILED: i32 = 16;
}

/// Stable status enumeration for one acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    /// Queued, not yet transferring.
    Pending,
    /// Actively transferring.
    Running,
    /// Paused by the subsystem.
    Paused,
    /// Finished successfully.
    Succeeded,
    /// Failed; see the reason code.
    Failed,
}

impl DownloadStatus {
    /// Map a raw subsystem status code into the stable enumeration.
    ///
    /// Unrecognized codes are treated as failures rather than invented
    /// intermediate states.
    #[must_use]
    pub const fn from_raw_code(code: i32) -> Self {
        match code {
            raw_status::PENDING => Self::Pending,
            raw_status::RUNNING => Self::Running,
            raw_status::PAUSED => Self::Paused,
            raw_status::SUCCESSFUL => Self::Succeeded,
            _ => Self::Failed,
        }
    }

    /// Whether the transfer has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Receipt for an issued acquisition request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquireReceipt {
    /// Identifier assigned by the external subsystem.
    pub download_id: u64,
    /// Deterministic destination path inside the managed directory.
    pub path: PathBuf,
}

/// Progress snapshot for one acquisition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadProgress {
    /// Stable status.
    pub status: DownloadStatus,
    /// Bytes downloaded so far.
    pub bytes_downloaded: u64,
    /// Total bytes, when the subsystem knows it (0 when unknown).
    pub bytes_total: u64,
    /// Completed fraction in `[0, 1]`; 0 while the total is unknown.
    pub fraction: f64,
    /// Failure reason code from the subsystem (0 when not failed).
    pub reason_code: i32,
    /// Local URI reported by the subsystem, if any.
    pub local_uri: Option<String>,
}

impl DownloadProgress {
    /// Build a snapshot, deriving the fraction from the byte counts.
    ///
    /// A zero or unknown total yields fraction 0; the result is clamped to
    /// `[0, 1]` and can never be NaN.
    #[must_use]
    pub fn new(status: DownloadStatus, bytes_downloaded: u64, bytes_total: u64) -> Self {
        Self {
            status,
            bytes_downloaded,
            bytes_total,
            fraction: completed_fraction(bytes_downloaded, bytes_total),
            reason_code: 0,
            local_uri: None,
        }
    }

    /// Attach the subsystem's failure reason code.
    #[must_use]
    pub const fn with_reason(mut self, reason_code: i32) -> Self {
        self.reason_code = reason_code;
        self
    }

    /// Attach the local URI reported by the subsystem.
    #[must_use]
    pub fn with_local_uri(mut self, local_uri: Option<String>) -> Self {
        self.local_uri = local_uri;
        self
    }
}

/// Result of probing the managed directory for a named artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatedFile {
    /// Deterministic destination path for the filename.
    pub path: PathBuf,
    /// Whether a file exists at that path.
    pub exists: bool,
    /// Size in bytes; 0 when absent.
    pub size_bytes: u64,
}

/// Compute `downloaded / total` as a fraction in `[0, 1]`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn completed_fraction(bytes_downloaded: u64, bytes_total: u64) -> f64 {
    if bytes_total == 0 {
        return 0.0;
    }
    (bytes_downloaded as f64 / bytes_total as f64).clamp(0.0, 1.0)
}
