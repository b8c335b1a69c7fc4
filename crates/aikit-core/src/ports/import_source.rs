//! Import source port.
//!
//! An externally selected file (document picker, drag-and-drop, share
//! sheet) is handed to the import adapter as an opaque source: a metadata
//! name lookup, an optional path hint, and a byte stream.

use std::io::Read;
use std::path::Path;

/// An externally selected file to import.
pub trait ImportSource: Send + Sync {
    /// Display filename from provider metadata, if known.
    fn display_name(&self) -> Option<String>;

    /// Location the source came from; the final path segment is the
    /// filename fallback when metadata is absent.
    fn source_path(&self) -> Option<&Path>;

    /// Open the byte stream for copying.
    fn open(&self) -> std::io::Result<Box<dyn Read + Send>>;
}

/// Resolve the filename for a source: metadata first, path segment second.
#[must_use]
pub fn resolve_filename(source: &dyn ImportSource) -> Option<String> {
    if let Some(name) = source.display_name() {
        if !name.is_empty() {
            return Some(name);
        }
    }
    source
        .source_path()
        .and_then(Path::file_name)
        .map(|s| s.to_string_lossy().into_owned())
}
