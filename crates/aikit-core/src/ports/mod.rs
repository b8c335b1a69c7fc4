//! Port definitions (trait abstractions) for external collaborators.
//!
//! Ports define the interfaces the core domain expects from the embedding
//! platform: the native inference engine, the OS download transport, the
//! key-value store, and the two seams this workspace itself exposes (import
//! sources and generation listeners). They contain no implementation
//! details and use only domain types.

pub mod download_queue;
pub mod generation_listener;
pub mod import_source;
pub mod inference_engine;
pub mod key_value_store;

pub use download_queue::{DownloadQueuePort, EnqueueRequest, QueueError, TransferSnapshot};
pub use generation_listener::{ChannelListener, GenerationEvent, GenerationListener, NoopListener};
pub use import_source::{ImportSource, resolve_filename};
pub use inference_engine::{EngineError, InferenceEngine};
pub use key_value_store::{
    KeyValueStore, MemoryKeyValueStore, StoreError, keys, mark_external_change,
};
