//! Model file import adapter.
//!
//! Copies an externally selected model file into the managed downloads
//! directory. The copy goes through a temporary file in the destination
//! directory and is atomically persisted, so the destination path is
//! either the complete artifact or absent, never a partial write.

use std::path::{Path, PathBuf};

use aikit_core::domain::{ImportedModel, display_name_for, validate_model_filename};
use aikit_core::error::{BridgeError, BridgeResult};
use aikit_core::paths::{destination_path, ensure_directory};
use aikit_core::ports::{ImportSource, resolve_filename};

/// Imports externally selected model files into managed storage.
pub struct ModelImporter {
    downloads_dir: PathBuf,
}

impl ModelImporter {
    /// Create an importer writing into the given managed directory.
    pub fn new(downloads_dir: impl Into<PathBuf>) -> Self {
        Self {
            downloads_dir: downloads_dir.into(),
        }
    }

    /// Import one source file.
    ///
    /// The filename is resolved from source metadata, falling back to the
    /// final path segment; anything without the model extension is
    /// rejected with `InvalidInput` before any bytes move. Copy errors
    /// surface as `Io` and leave no partial destination file.
    pub fn import(&self, source: &dyn ImportSource) -> BridgeResult<ImportedModel> {
        let filename = resolve_filename(source)
            .ok_or_else(|| BridgeError::invalid_input("source carries no filename"))?;
        validate_model_filename(&filename)?;

        ensure_directory(&self.downloads_dir)?;
        let destination = destination_path(&self.downloads_dir, &filename);

        self.copy_to(source, &destination)?;

        tracing::info!(
            filename = %filename,
            path = %destination.display(),
            "model imported"
        );
        Ok(ImportedModel {
            path: destination,
            display_name: display_name_for(&filename),
        })
    }

    fn copy_to(&self, source: &dyn ImportSource, destination: &Path) -> BridgeResult<()> {
        let mut reader = source.open().map_err(|e| BridgeError::from_io_error(&e))?;

        // The temp file lives in the destination directory so the final
        // rename never crosses a filesystem boundary. It is deleted on
        // drop if any step below fails.
        let mut temp = tempfile::NamedTempFile::new_in(&self.downloads_dir)
            .map_err(|e| BridgeError::from_io_error(&e))?;
        std::io::copy(&mut reader, &mut temp).map_err(|e| BridgeError::from_io_error(&e))?;
        temp.persist(destination)
            .map_err(|e| BridgeError::from_io_error(&e.error))?;
        Ok(())
    }
}
