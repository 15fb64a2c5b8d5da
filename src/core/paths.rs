//! core::paths
//!
//! Centralized path routing for linkvault storage locations.
//!
//! # Architecture
//!
//! All storage locations are computed here so that no other module joins
//! `.linkvault` or `vault/` by hand. There are two scopes:
//!
//! - **Project scope** ([`ProjectPaths`]) - the metadata directory inside a
//!   project root.
//! - **Home scope** ([`HomePaths`]) - the per-user area holding the registry
//!   and every project's vault.
//!
//! # Storage Layout
//!
//! ```text
//! <root>/.linkvault/manifest.json     manifest
//! <root>/.linkvault/manifest.lock     manifest lock sentinel
//! <root>/.linkvault/config.toml       project config
//! <root>/.linkvaultfiles              discovery patterns
//!
//! <home>/index.json                   registry
//! <home>/index.lock                   registry lock sentinel
//! <home>/config.toml                  global config
//! <home>/vault/<id>/                  vault primary tree
//! <home>/vault/<id>.backup/           vault backup tree
//! ```
//!
//! `<home>` is `$LINKVAULT_HOME` when set, otherwise `~/.linkvault`.
//!
//! # Example
//!
//! ```
//! use linkvault::core::paths::ProjectPaths;
//! use std::path::PathBuf;
//!
//! let paths = ProjectPaths::new(PathBuf::from("/work/app"));
//! assert_eq!(
//!     paths.manifest_path(),
//!     PathBuf::from("/work/app/.linkvault/manifest.json")
//! );
//! ```

use std::path::{Component, Path, PathBuf};

use crate::core::types::{RelPath, VaultId};

/// Name of the per-project metadata directory.
pub const METADATA_DIR: &str = ".linkvault";

/// Name of the discovery pattern file at the project root.
pub const PATTERNS_FILE: &str = ".linkvaultfiles";

/// Environment variable overriding the per-user home area.
pub const HOME_ENV: &str = "LINKVAULT_HOME";

/// Suffix appended to a vault id to name its backup tree.
pub const BACKUP_SUFFIX: &str = ".backup";

/// Path routing for a single project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    /// Absolute project root.
    pub root: PathBuf,
}

impl ProjectPaths {
    /// Create paths for a project rooted at `root`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The project's metadata directory (`<root>/.linkvault`).
    pub fn metadata_dir(&self) -> PathBuf {
        self.root.join(METADATA_DIR)
    }

    /// This is `<root>/.linkvault/manifest.json`.
    pub fn manifest_path(&self) -> PathBuf {
        self.metadata_dir().join("manifest.json")
    }

    /// This is `<root>/.linkvault/manifest.lock`.
    pub fn manifest_lock_path(&self) -> PathBuf {
        self.metadata_dir().join("manifest.lock")
    }

    /// This is `<root>/.linkvault/config.toml`.
    pub fn config_path(&self) -> PathBuf {
        self.metadata_dir().join("config.toml")
    }

    /// This is `<root>/.linkvaultfiles`.
    pub fn patterns_path(&self) -> PathBuf {
        self.root.join(PATTERNS_FILE)
    }

    /// Absolute, OS-native location of a managed file.
    pub fn abs_path(&self, rel: &RelPath) -> PathBuf {
        self.root.join(rel.to_native())
    }
}

/// Path routing for the per-user home area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomePaths {
    /// Root of the home area (normally `~/.linkvault`).
    pub root: PathBuf,
}

impl HomePaths {
    /// Create home paths rooted at an explicit directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve the home area from `$LINKVAULT_HOME` or the user's home directory.
    ///
    /// Returns `None` if neither is available.
    pub fn from_env() -> Option<Self> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Some(Self::new(PathBuf::from(dir)));
        }
        dirs::home_dir().map(|home| Self::new(home.join(METADATA_DIR)))
    }

    /// This is `<home>/index.json`.
    pub fn registry_path(&self) -> PathBuf {
        self.root.join("index.json")
    }

    /// This is `<home>/index.lock`.
    pub fn registry_lock_path(&self) -> PathBuf {
        self.root.join("index.lock")
    }

    /// This is `<home>/config.toml`.
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// Directory containing every vault tree (`<home>/vault`).
    pub fn vault_root(&self) -> PathBuf {
        self.root.join("vault")
    }

    /// Primary tree of a vault (`<home>/vault/<id>`).
    pub fn vault_dir(&self, id: &VaultId) -> PathBuf {
        self.vault_root().join(id.as_str())
    }

    /// Backup tree of a vault (`<home>/vault/<id>.backup`).
    pub fn backup_dir(&self, id: &VaultId) -> PathBuf {
        self.vault_root()
            .join(format!("{}{}", id.as_str(), BACKUP_SUFFIX))
    }
}

/// Lexically normalize a path.
///
/// Removes `.` components, resolves `..` against preceding components, and
/// upper-cases a leading drive letter. The file system is not consulted, so
/// symbolic links are not resolved.
///
/// # Example
///
/// ```
/// use linkvault::core::paths::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(
///     normalize_path(Path::new("/work/./app/../app/src")),
///     PathBuf::from("/work/app/src")
/// );
/// ```
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root or a drive prefix.
                let popped = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                ) && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }

    let text = out.to_string_lossy();
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(drive), Some(':')) if drive.is_ascii_lowercase() => {
            PathBuf::from(format!("{}{}", drive.to_ascii_uppercase(), &text[1..]))
        }
        _ => out,
    }
}

/// Resolve `path` against `base` (when relative) and normalize the result.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}
