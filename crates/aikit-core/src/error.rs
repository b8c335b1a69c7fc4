//! Caller-facing error type.
//!
//! Every operation exposed by the workspace resolves to either a success
//! payload or one of these kinds. The type is serializable so it can cross
//! FFI/IPC boundaries without depending on non-serializable types like
//! `std::io::Error`; I/O failures capture the kind and message as strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for all caller-facing operations.
///
/// Validation and state-machine violations are detected synchronously,
/// before any native call is made. Native-layer failures are caught at the
/// adapter boundary and translated here, never propagated raw.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum BridgeError {
    /// Malformed or missing caller arguments.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input.
        message: String,
    },

    /// A referenced download or file is absent.
    #[error("Not found: {message}")]
    NotFound {
        /// What was not found.
        message: String,
    },

    /// A model load is already in progress.
    #[error("A model load is already in progress")]
    AlreadyLoading,

    /// A model is already loaded; unload it before loading another.
    #[error("A model is already loaded: {path}")]
    AlreadyLoaded {
        /// Path of the model currently occupying the slot.
        path: String,
    },

    /// A generation session is already active.
    #[error("A generation session is already active")]
    SessionBusy,

    /// The operation cannot run while a generation session is active.
    #[error("A generation is in progress")]
    GenerationInProgress,

    /// No model is loaded.
    #[error("No model is loaded")]
    NoModelLoaded,

    /// The native engine reported a load failure.
    #[error("Native load failure: {message}")]
    NativeLoadFailure {
        /// Detail reported by the engine adapter.
        message: String,
    },

    /// The native engine reported a failure mid-generation.
    #[error("Generation failure: {message}")]
    GenerationFailure {
        /// Detail reported by the engine adapter.
        message: String,
    },

    /// Filesystem copy/delete error.
    #[error("I/O error ({kind}): {message}")]
    Io {
        /// The kind of I/O error (e.g., "NotFound", "PermissionDenied").
        kind: String,
        /// Detailed error message.
        message: String,
    },
}

impl BridgeError {
    /// Create an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a native load failure.
    pub fn native_load_failure(message: impl Into<String>) -> Self {
        Self::NativeLoadFailure {
            message: message.into(),
        }
    }

    /// Create a generation failure.
    pub fn generation_failure(message: impl Into<String>) -> Self {
        Self::GenerationFailure {
            message: message.into(),
        }
    }

    /// Create an I/O error from a `std::io::Error`.
    ///
    /// Captures the error kind name and message for serialization.
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        let kind = err.kind();
        Self::Io {
            kind: format!("{kind:?}"),
            message: err.to_string(),
        }
    }

    /// Check if this error is a state-machine violation.
    ///
    /// State violations are raised before any native call; retrying after
    /// the conflicting operation finishes may succeed.
    #[must_use]
    pub const fn is_state_violation(&self) -> bool {
        matches!(
            self,
            Self::AlreadyLoading
                | Self::AlreadyLoaded { .. }
                | Self::SessionBusy
                | Self::GenerationInProgress
                | Self::NoModelLoaded
        )
    }

    /// Check if this error came from the native engine.
    #[must_use]
    pub const fn is_native_failure(&self) -> bool {
        matches!(
            self,
            Self::NativeLoadFailure { .. } | Self::GenerationFailure { .. }
        )
    }
}

/// Convenience result type for caller-facing operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
