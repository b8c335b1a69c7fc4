//! Managed downloads directory resolution.
//!
//! Model artifacts (downloaded or imported) live in one managed directory.
//! Resolution order: explicit path, `AIKIT_DOWNLOADS_DIR` environment
//! variable, platform default under the user's data directory.

use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::BridgeError;

/// Environment variable overriding the managed downloads directory.
pub const DOWNLOADS_DIR_ENV: &str = "AIKIT_DOWNLOADS_DIR";

/// Default relative location under the platform data directory.
pub const DEFAULT_DOWNLOADS_DIR_RELATIVE: &str = "aikit/models";

/// Path resolution errors.
#[derive(Debug, Error)]
pub enum PathError {
    /// The platform data directory could not be determined.
    #[error("could not determine the platform data directory")]
    NoDataDir,

    /// Directory creation failed.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateFailed {
        /// The directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl From<PathError> for BridgeError {
    fn from(e: PathError) -> Self {
        match e {
            PathError::NoDataDir => Self::Io {
                kind: "NoDataDir".to_string(),
                message: e.to_string(),
            },
            PathError::CreateFailed { ref source, .. } => Self::Io {
                kind: format!("{:?}", source.kind()),
                message: e.to_string(),
            },
        }
    }
}

/// How the downloads directory was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadsDirSource {
    /// The embedder passed an explicit path.
    Explicit,
    /// The path came from `AIKIT_DOWNLOADS_DIR`.
    EnvVar,
    /// Platform default.
    Default,
}

/// Resolution result for the downloads directory.
#[derive(Debug, Clone)]
pub struct DownloadsDirResolution {
    /// The resolved directory.
    pub path: PathBuf,
    /// How the path was determined.
    pub source: DownloadsDirSource,
}

/// Return the platform-default downloads directory.
pub fn default_downloads_dir() -> Result<PathBuf, PathError> {
    let data = dirs::data_dir().ok_or(PathError::NoDataDir)?;
    Ok(data.join(DEFAULT_DOWNLOADS_DIR_RELATIVE))
}

/// Resolve the downloads directory from an explicit override, env var, or
/// default.
pub fn resolve_downloads_dir(explicit: Option<&str>) -> Result<DownloadsDirResolution, PathError> {
    if let Some(path) = explicit {
        return Ok(DownloadsDirResolution {
            path: PathBuf::from(path),
            source: DownloadsDirSource::Explicit,
        });
    }

    if let Ok(env_path) = env::var(DOWNLOADS_DIR_ENV) {
        if !env_path.trim().is_empty() {
            return Ok(DownloadsDirResolution {
                path: PathBuf::from(env_path),
                source: DownloadsDirSource::EnvVar,
            });
        }
    }

    Ok(DownloadsDirResolution {
        path: default_downloads_dir()?,
        source: DownloadsDirSource::Default,
    })
}

/// Deterministic destination path for a named artifact.
///
/// Collisions overwrite; filenames are assumed caller-unique.
#[must_use]
pub fn destination_path(downloads_dir: &Path, filename: &str) -> PathBuf {
    downloads_dir.join(filename)
}

/// Create a directory (and parents) if it does not exist yet.
pub fn ensure_directory(path: &Path) -> Result<(), PathError> {
    if path.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(|source| PathError::CreateFailed {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "created managed directory");
    Ok(())
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;

    #[test]
    fn default_dir_contains_relative() {
        let dir = default_downloads_dir().unwrap();
        assert!(dir.to_string_lossy().contains("aikit"));
    }

    // Single test for the whole resolution order: the env var is process
    // state, so splitting these across parallel tests would race.
    #[test]
    fn resolution_order() {
        let prev = env::var(DOWNLOADS_DIR_ENV).ok();
        unsafe {
            env::set_var(DOWNLOADS_DIR_ENV, "/tmp/from-env");
        }

        let resolved = resolve_downloads_dir(Some("/tmp/explicit")).unwrap();
        assert_eq!(resolved.source, DownloadsDirSource::Explicit);
        assert!(resolved.path.ends_with("explicit"));

        let resolved = resolve_downloads_dir(None).unwrap();
        assert_eq!(resolved.source, DownloadsDirSource::EnvVar);
        assert!(resolved.path.ends_with("from-env"));

        unsafe {
            env::remove_var(DOWNLOADS_DIR_ENV);
        }
        let resolved = resolve_downloads_dir(None).unwrap();
        assert_eq!(resolved.source, DownloadsDirSource::Default);

        restore_env(DOWNLOADS_DIR_ENV, prev);
    }

    #[test]
    fn destination_joins_filename() {
        let dest = destination_path(Path::new("/data/models"), "weights.gguf");
        assert_eq!(dest, PathBuf::from("/data/models/weights.gguf"));
    }

    #[test]
    fn ensure_directory_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("a/b/c");
        ensure_directory(&target).unwrap();
        assert!(target.is_dir());
        ensure_directory(&target).unwrap();
    }

    fn restore_env(key: &str, previous: Option<String>) {
        if let Some(value) = previous {
            unsafe {
                env::set_var(key, value);
            }
        } else {
            unsafe {
                env::remove_var(key);
            }
        }
    }
}
