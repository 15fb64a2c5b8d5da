//! core::ops::lock
//!
//! Advisory, cross-process exclusive locks on sentinel files.
//!
//! # Architecture
//!
//! The manifest and the registry are each guarded by their own sentinel
//! file (`.linkvault/manifest.lock`, `<home>/index.lock`). A command holds
//! the lock for its whole read-modify-write cycle.
//!
//! Acquisition blocks, polling at a fixed interval until an overall timeout
//! expires. Expiry is reported as [`LockError::Timeout`] rather than retried
//! forever.
//!
//! # Invariants
//!
//! - Lock is held from before the first read until after the last write
//! - Lock is automatically released on drop (RAII pattern), including on
//!   error paths and panics
//! - The sentinel file itself is never deleted; only the OS lock on it matters
//!
//! # Example
//!
//! ```ignore
//! use linkvault::core::ops::lock::FileLock;
//! use std::time::Duration;
//!
//! let lock = FileLock::acquire(&paths.manifest_lock_path(), Duration::from_secs(30))?;
//!
//! // read manifest, mutate, save
//!
//! // Lock automatically released when dropped
//! drop(lock);
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use thiserror::Error;

/// Default timeout for lock acquisition (30 seconds).
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(30);

/// Polling interval when waiting for a lock (250ms).
pub const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// The lock could not be acquired before the timeout expired.
    #[error(
        "could not acquire lock {} within {}s; another linkvault operation may be running. \
         If no other operation is active, delete the lock file and retry",
        path.display(),
        timeout.as_secs()
    )]
    Timeout { path: PathBuf, timeout: Duration },

    /// Another process already holds the lock (non-blocking acquire).
    #[error("lock {} is held by another process", .0.display())]
    AlreadyLocked(PathBuf),

    /// Failed to create the sentinel file or its directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),

    /// Failed to release the lock.
    #[error("failed to release lock: {0}")]
    ReleaseFailed(String),
}

/// An exclusive advisory lock on a sentinel file.
///
/// The lock is released when this guard is dropped.
#[derive(Debug)]
pub struct FileLock {
    /// Path to the sentinel file.
    path: PathBuf,
    /// The open file handle with the lock held.
    /// When this is Some, we hold the lock.
    file: Option<File>,
}

impl FileLock {
    /// Acquire the lock, waiting up to `timeout`.
    ///
    /// Polls every [`LOCK_POLL_INTERVAL`]. The parent directory of `path` is
    /// created if needed.
    ///
    /// # Errors
    ///
    /// - [`LockError::Timeout`] if the lock is still held when `timeout` expires
    /// - [`LockError::CreateFailed`] if the sentinel cannot be created
    /// - [`LockError::AcquireFailed`] on any other OS error
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self, LockError> {
        Self::acquire_with_interval(path, timeout, LOCK_POLL_INTERVAL)
    }

    /// Acquire the lock with an explicit polling interval.
    pub fn acquire_with_interval(
        path: &Path,
        timeout: Duration,
        interval: Duration,
    ) -> Result<Self, LockError> {
        let deadline = Instant::now() + timeout;

        loop {
            match Self::try_acquire(path)? {
                Some(lock) => return Ok(lock),
                None => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(LockError::Timeout {
                            path: path.to_path_buf(),
                            timeout,
                        });
                    }
                    thread::sleep(interval.min(deadline - now));
                }
            }
        }
    }

    /// Try to acquire the lock without blocking.
    ///
    /// Returns `Ok(None)` if another holder has it.
    pub fn try_acquire(path: &Path) -> Result<Option<Self>, LockError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LockError::CreateFailed(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| {
                LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e))
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "lock acquired");
                Ok(Some(Self {
                    path: path.to_path_buf(),
                    file: Some(file),
                }))
            }
            Err(e) if is_contended(&e) => Ok(None),
            Err(e) => Err(LockError::AcquireFailed(e.to_string())),
        }
    }

    /// Check if the lock is currently held.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    /// Get the path to the sentinel file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock explicitly.
    ///
    /// This is called automatically on drop. Calling it twice is harmless.
    pub fn release(&mut self) -> Result<(), LockError> {
        if let Some(file) = self.file.take() {
            file.unlock()
                .map_err(|e| LockError::ReleaseFailed(e.to_string()))?;
            tracing::debug!(path = %self.path.display(), "lock released");
        }
        Ok(())
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Best-effort release on drop - ignore errors since we're dropping
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}

fn is_contended(e: &std::io::Error) -> bool {
    e.kind() == ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
