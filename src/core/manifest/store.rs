//! core::manifest::store
//!
//! Manifest storage in the project's metadata directory.
//!
//! # Architecture
//!
//! The manifest lives at `.linkvault/manifest.json` and is guarded by an
//! advisory lock on `.linkvault/manifest.lock`. Callers hold the lock for a
//! whole load-transition-save cycle:
//!
//! ```ignore
//! let store = ManifestStore::new(project.paths().clone());
//! let _lock = store.lock()?;
//! let mut manifest = store.load()?;
//! // ... transitions ...
//! store.save(&manifest)?;
//! ```
//!
//! `save` is an atomic replace, so a reader never observes a partially
//! written manifest. The store is cheap to clone and can be moved into a
//! signal handler thread.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use super::schema::{parse_manifest, Manifest, SchemaError};
use crate::core::ops::{write_atomic, FileLock, LockError, DEFAULT_LOCK_TIMEOUT};
use crate::core::paths::ProjectPaths;

/// Errors from manifest storage operations.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// No manifest exists for this project.
    #[error("not initialized: {} not found; run 'linkvault init' first", .0.display())]
    NotInitialized(PathBuf),

    /// A manifest already exists.
    #[error("already initialized: {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("failed to read manifest '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write manifest '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Lock(#[from] LockError),
}

/// Reads, writes and locks one project's manifest.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    paths: ProjectPaths,
    lock_timeout: Duration,
}

impl ManifestStore {
    /// Create a store for the project described by `paths`.
    pub fn new(paths: ProjectPaths) -> Self {
        Self {
            paths,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Override how long [`lock`](Self::lock) waits.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Check whether the manifest file exists.
    pub fn exists(&self) -> bool {
        self.paths.manifest_path().is_file()
    }

    /// Create the metadata directory and an empty manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::AlreadyInitialized`] if a manifest exists.
    pub fn init(&self) -> Result<Manifest, ManifestError> {
        let path = self.paths.manifest_path();
        if self.exists() {
            return Err(ManifestError::AlreadyInitialized(path));
        }

        let dir = self.paths.metadata_dir();
        fs::create_dir_all(&dir).map_err(|e| ManifestError::Write {
            path: dir.clone(),
            source: e,
        })?;

        let manifest = Manifest::new();
        self.save(&manifest)?;
        tracing::debug!(path = %path.display(), "manifest initialized");
        Ok(manifest)
    }

    /// Load and validate the manifest.
    pub fn load(&self) -> Result<Manifest, ManifestError> {
        let path = self.paths.manifest_path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ManifestError::NotInitialized(path))
            }
            Err(e) => return Err(ManifestError::Read { path, source: e }),
        };

        Ok(parse_manifest(&contents)?)
    }

    /// Atomically persist the manifest.
    pub fn save(&self, manifest: &Manifest) -> Result<(), ManifestError> {
        let path = self.paths.manifest_path();
        let json = manifest.to_json()?;
        write_atomic(&path, json.as_bytes()).map_err(|e| ManifestError::Write { path, source: e })
    }

    /// Acquire the manifest lock, waiting up to the configured timeout.
    pub fn lock(&self) -> Result<FileLock, ManifestError> {
        Ok(FileLock::acquire(
            &self.paths.manifest_lock_path(),
            self.lock_timeout,
        )?)
    }
}
