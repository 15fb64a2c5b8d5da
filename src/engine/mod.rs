//! engine
//!
//! The vault/manifest state-transition engine.
//!
//! # Architecture
//!
//! Every managed file is in one of two states recorded in the manifest:
//!
//! ```text
//!            lock (first time)                 unlock
//! regular ─────────────────────▶ locked ─────────────────▶ unlocked
//!  file   ◀───────────────────── (placeholder) ◀─────────── (symlink to
//!                 forget                          lock        vault copy)
//! ```
//!
//! The engine moves bytes between the original location and the vault,
//! verifies them with digests, and updates the in-memory [`Manifest`].
//! Persisting the manifest and holding its lock is the caller's job.
//!
//! # Invariants
//!
//! - Before the point of no return of a lock, any failure leaves the
//!   original file and the vault as they were
//! - A regular file that is not the exact placeholder is never deleted or
//!   overwritten by unlock, forget or re-lock
//! - A directory at the original path is never removed
//! - Lock of a locked entry and unlock of an unlocked entry change nothing
//!
//! # Example
//!
//! ```ignore
//! use linkvault::engine::{lock_file, Limits, Session};
//!
//! let session = Session::new(project, vault, Limits::default());
//! let _lock = store.lock()?;
//! let mut manifest = store.load()?;
//! let outcome = lock_file(&session, &mut manifest, &rel, false)?;
//! store.save(&manifest)?;
//! ```
//!
//! [`Manifest`]: crate::core::manifest::Manifest

pub mod capabilities;
pub mod placeholder;
pub mod status;
pub mod transitions;

#[cfg(any(test, feature = "fault_injection"))]
pub mod engine_hooks;

pub use capabilities::{probe_symlink_support, SymlinkSupport};
pub use status::{file_status, FileStatus};
pub use transitions::{forget_file, lock_file, unlock_file};

use std::io;
use std::path::PathBuf;

use crate::core::config::Config;
use crate::core::project::Project;
use crate::core::registry::Vault;
use crate::core::types::{Digest, RelPath};

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

/// Size thresholds applied by lock and hashing, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Larger files are locked with a warning.
    pub size_warning: u64,
    /// Larger files need `force`.
    pub size_limit: u64,
    /// Larger files log hashing progress.
    pub progress_threshold: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Limits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            size_warning: config.size_warning_bytes(),
            size_limit: config.size_limit_bytes(),
            progress_threshold: config.progress_threshold_bytes(),
        }
    }
}

/// Everything a transition needs besides the manifest.
///
/// Owns the symlink capability cache, so each session probes at most once
/// and sessions never share a verdict.
#[derive(Debug)]
pub struct Session {
    project: Project,
    vault: Vault,
    limits: Limits,
    symlinks: SymlinkSupport,
}

impl Session {
    /// Create a session. Symlink support is probed lazily in the project's
    /// metadata directory.
    pub fn new(project: Project, vault: Vault, limits: Limits) -> Self {
        let symlinks = SymlinkSupport::new(project.paths().metadata_dir());
        Self {
            project,
            vault,
            limits,
            symlinks,
        }
    }

    /// Replace the symlink capability (for tests).
    pub fn with_symlink_support(mut self, symlinks: SymlinkSupport) -> Self {
        self.symlinks = symlinks;
        self
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn symlinks(&self) -> &SymlinkSupport {
        &self.symlinks
    }

    pub fn symlinks_mut(&mut self) -> &mut SymlinkSupport {
        &mut self.symlinks
    }
}

/// What a successful transition did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// First-time lock: content moved to the vault.
    Locked,
    /// Symlink replaced by a placeholder.
    Relocked,
    /// Entry was already locked; nothing changed.
    AlreadyLocked,
    /// Placeholder replaced by a symlink.
    Unlocked,
    /// Entry was already unlocked; nothing changed.
    AlreadyUnlocked,
    /// Content restored and the entry removed.
    Forgotten,
}

impl Transition {
    /// True if nothing on disk or in the manifest changed.
    pub fn is_noop(&self) -> bool {
        matches!(self, Transition::AlreadyLocked | Transition::AlreadyUnlocked)
    }
}

/// A non-fatal condition noticed during a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The file is above the warning size but was locked anyway.
    LargeFile { path: RelPath, size: u64 },
    /// The vault copy no longer matches the recorded digest.
    VaultHashMismatch { path: RelPath },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::LargeFile { path, size } => {
                write!(f, "large file ({} MB): {}", size / MB, path)
            }
            Warning::VaultHashMismatch { path } => {
                write!(f, "vault file hash mismatch for {}", path)
            }
        }
    }
}

/// Result of a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub transition: Transition,
    pub warnings: Vec<Warning>,
}

impl Outcome {
    pub(crate) fn new(transition: Transition) -> Self {
        Self {
            transition,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn with_warnings(transition: Transition, warnings: Vec<Warning>) -> Self {
        Self {
            transition,
            warnings,
        }
    }
}

const MB: u64 = 1024 * 1024;

/// Errors from engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A read, write, copy or link operation failed.
    #[error("{action} '{}': {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    /// The vault copy did not match the original right after copying.
    #[error("vault copy of {path} does not match the original ({actual} != {expected}); original left untouched")]
    Integrity {
        path: RelPath,
        expected: Digest,
        actual: Digest,
    },

    /// Re-lock target is not a symbolic link.
    #[error("refusing to re-lock {0}: path is not a symlink and may contain user data; move it aside and run 'linkvault unlock {0}' to restore the link")]
    AmbiguousState(RelPath),

    /// The placeholder was edited, extended or replaced.
    #[error("refusing to touch {0}: it is no longer an unmodified linkvault placeholder and may contain user data")]
    TamperedPlaceholder(RelPath),

    /// The target is a directory or otherwise ineligible.
    #[error("cannot manage {path}: {reason}")]
    NotLockable { path: RelPath, reason: String },

    /// The path has no manifest entry.
    #[error("file not managed: {0}")]
    NotManaged(RelPath),

    /// The primary vault copy is absent.
    #[error("vault copy of {0} is missing")]
    VaultMissing(RelPath),

    /// Symbolic links cannot be created here.
    #[error("{0}")]
    UnsupportedPlatform(String),

    /// The file is above the hard size limit and `force` was not given.
    #[error("{path} is {} MB, above the {} MB limit; use --force to lock large files", size / MB, limit / MB)]
    TooLarge { path: RelPath, size: u64, limit: u64 },
}

impl EngineError {
    /// True if the remaining files of a batch should not be attempted.
    ///
    /// Platform errors are machine-level; every other error concerns one file.
    pub fn aborts_batch(&self) -> bool {
        matches!(self, EngineError::UnsupportedPlatform(_))
    }

    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| EngineError::Io {
            action,
            path,
            source,
        }
    }
}
