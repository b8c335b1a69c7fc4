//! Core domain types and port definitions for aikit.
//!
//! aikit lets an embedding application acquire, load, run, and release a
//! local language-model file and stream its token output back to a caller.
//! This crate holds the pieces everything else builds on: the domain types,
//! the port traits for the external collaborators (inference engine,
//! download transport, key-value store), the caller-facing error type, and
//! managed-path resolution. No adapter-specific crates, no I/O beyond path
//! probing.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod paths;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    AcquireReceipt, DownloadProgress, DownloadStatus, GenerationOutcome, GenerationRequest,
    ImportedModel, LoadRequest, LocatedFile, ModelHandle, SamplingParams,
};
pub use error::{BridgeError, BridgeResult};
pub use ports::{
    ChannelListener, DownloadQueuePort, EngineError, EnqueueRequest, GenerationEvent,
    GenerationListener, ImportSource, InferenceEngine, KeyValueStore, MemoryKeyValueStore,
    NoopListener, QueueError, StoreError, TransferSnapshot,
};

// Re-export path utilities
pub use paths::{
    DEFAULT_DOWNLOADS_DIR_RELATIVE, DOWNLOADS_DIR_ENV, DownloadsDirResolution, DownloadsDirSource,
    PathError, default_downloads_dir, destination_path, ensure_directory, resolve_downloads_dir,
};
