//! Core domain types.
//!
//! Pure data types with no I/O dependencies.

pub mod download;
pub mod generation;
pub mod model;

pub use download::{AcquireReceipt, DownloadProgress, DownloadStatus, LocatedFile};
pub use generation::{GenerationOutcome, GenerationRequest, SamplingParams};
pub use model::{
    DEFAULT_LOAD_THREADS, ImportedModel, LoadRequest, MODEL_FILE_EXTENSION, ModelHandle,
    display_name_for, validate_model_filename,
};
