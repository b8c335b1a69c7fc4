//! Model handle and load request types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// File extension a model artifact must carry to be importable/loadable.
pub const MODEL_FILE_EXTENSION: &str = "gguf";

/// Default thread count for model loads, tuned for modern mobile CPUs.
pub const DEFAULT_LOAD_THREADS: u32 = 6;

/// Request to load a model file into the engine slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRequest {
    /// Absolute path to the model file.
    pub path: PathBuf,
    /// Whether the engine should memory-map the weights.
    pub use_mmap: bool,
    /// Thread count handed to the engine at load time.
    pub threads: u32,
}

impl LoadRequest {
    /// Create a load request with the default mmap and thread settings.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            use_mmap: true,
            threads: DEFAULT_LOAD_THREADS,
        }
    }

    /// Set whether to memory-map the weights.
    #[must_use]
    pub const fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Set the thread count.
    #[must_use]
    pub const fn with_threads(mut self, threads: u32) -> Self {
        self.threads = threads;
        self
    }
}

/// The in-memory representation of one loaded model.
///
/// At most one handle exists at any time; it is owned exclusively by the
/// lifecycle state machine. Created on successful load, destroyed on unload
/// or process teardown; native unload is not guaranteed to run on abnormal
/// termination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelHandle {
    /// Absolute path the model was loaded from.
    pub path: PathBuf,
    /// Whether the weights were memory-mapped.
    pub use_mmap: bool,
    /// Thread count used at load time.
    pub threads: u32,
}

impl ModelHandle {
    /// Build the handle for a load that the engine accepted.
    #[must_use]
    pub fn from_request(request: &LoadRequest) -> Self {
        Self {
            path: request.path.clone(),
            use_mmap: request.use_mmap,
            threads: request.threads,
        }
    }
}

/// Result of importing an externally selected model file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedModel {
    /// Destination path inside the managed downloads directory.
    pub path: PathBuf,
    /// Display name: the filename with the model extension stripped.
    pub display_name: String,
}

/// Check that a filename carries the model file extension.
///
/// The comparison is case-insensitive on the extension only.
pub fn validate_model_filename(filename: &str) -> Result<(), BridgeError> {
    let valid = Path::new(filename)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(MODEL_FILE_EXTENSION));
    if valid {
        Ok(())
    } else {
        Err(BridgeError::invalid_input(format!(
            "expected a .{MODEL_FILE_EXTENSION} file, got '{filename}'"
        )))
    }
}

/// Derive the display name for a model filename (extension stripped).
#[must_use]
pub fn display_name_for(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map_or_else(|| filename.to_string(), |s| s.to_string_lossy().into_owned())
}
