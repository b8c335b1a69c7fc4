//! Acquisition of model weights for aikit.
//!
//! Two ways bytes arrive in the managed downloads directory: tracked
//! transfers through the platform's download subsystem
//! ([`DownloadTracker`]) and direct import of an externally selected file
//! ([`ModelImporter`]). Both hand out paths the lifecycle manager can load
//! from.

#![deny(unused_crate_dependencies)]

mod import;
mod tracker;

pub use import::ModelImporter;
pub use tracker::DownloadTracker;
