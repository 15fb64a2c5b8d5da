//! engine::status
//!
//! Read-only classification of a managed file.

use std::fmt;
use std::fs;
use std::io;

use super::placeholder;
use super::Session;
use crate::core::hash::digest_file;
use crate::core::manifest::FileEntry;
use crate::core::types::RelPath;

/// Observed condition of a managed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileStatus {
    /// Exact placeholder at the original path, vault copy intact.
    Locked,
    /// Symlink at the original path, vault copy intact.
    Unlocked,
    /// The vault copy no longer matches the recorded digest.
    Dirty,
    /// A regular file at the original path that is not the placeholder.
    Tampered,
    /// The primary vault copy is gone.
    Missing,
    /// Anything else, including unreadable paths.
    Unknown,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Locked => "locked",
            FileStatus::Unlocked => "unlocked",
            FileStatus::Dirty => "dirty",
            FileStatus::Tampered => "tampered",
            FileStatus::Missing => "missing",
            FileStatus::Unknown => "unknown",
        }
    }

    /// True for states a user should look at.
    pub fn needs_attention(&self) -> bool {
        !matches!(self, FileStatus::Locked | FileStatus::Unlocked)
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify one manifest entry by looking at the vault and the original path.
///
/// Never modifies anything. A vault copy that cannot be hashed counts as
/// intact here; unlock and forget will report the read error themselves.
pub fn file_status(session: &Session, entry: &FileEntry, rel: &RelPath) -> FileStatus {
    let primary = session.vault().primary_path(rel);
    match fs::metadata(&primary) {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return FileStatus::Missing,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return FileStatus::Missing,
        Err(_) => return FileStatus::Unknown,
    }

    let vault_changed = || match digest_file(&primary, session.limits().progress_threshold) {
        Ok(actual) => actual != entry.hash,
        Err(e) => {
            tracing::debug!(path = %rel, error = %e, "cannot hash vault copy");
            false
        }
    };

    let abs = session.project().abs_path(rel);
    let meta = match fs::symlink_metadata(&abs) {
        Ok(meta) => meta,
        Err(_) => return FileStatus::Unknown,
    };

    if meta.file_type().is_symlink() {
        return if vault_changed() {
            FileStatus::Dirty
        } else {
            FileStatus::Unlocked
        };
    }

    if meta.is_file() {
        return match placeholder::is_placeholder(&abs, rel) {
            Ok(true) if vault_changed() => FileStatus::Dirty,
            Ok(true) => FileStatus::Locked,
            Ok(false) => FileStatus::Tampered,
            Err(_) => FileStatus::Unknown,
        };
    }

    FileStatus::Unknown
}
