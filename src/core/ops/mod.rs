//! core::ops
//!
//! Durable writes and cross-process locking.
//!
//! # Modules
//!
//! - [`atomic`] - Temp-file-and-rename writes and link placement
//! - [`lock`] - Exclusive advisory file lock
//!
//! # Architecture
//!
//! Every mutating command:
//! 1. Acquires the manifest lock
//! 2. Loads the manifest
//! 3. Runs each file transition in sequence
//! 4. Saves the manifest with an atomic write
//! 5. Releases the lock (on drop)
//!
//! # Example
//!
//! ```ignore
//! use linkvault::core::ops::{write_atomic, FileLock};
//!
//! let lock = FileLock::acquire(&paths.manifest_lock_path(), timeout)?;
//! let bytes = serde_json::to_vec_pretty(&manifest)?;
//! write_atomic(&paths.manifest_path(), &bytes)?;
//! drop(lock);
//! ```

pub mod atomic;
pub mod lock;

pub use atomic::{copy_atomic, create_symlink, symlink_atomic, write_atomic};
pub use lock::{FileLock, LockError, DEFAULT_LOCK_TIMEOUT, LOCK_POLL_INTERVAL};
