//! core::registry
//!
//! The per-user registry mapping project roots to vaults.
//!
//! # Architecture
//!
//! The registry lives at `<home>/index.json` and follows the same
//! discipline as the manifest: an advisory lock on `<home>/index.lock`
//! around every read-modify-write, and atomic replacement on save.
//!
//! Project roots are compared after lexical normalization, so `/work/app`,
//! `/work/./app` and `/work/app/` all resolve to the same vault. There is at
//! most one entry per normalized root and entries are never removed.
//!
//! # Example
//!
//! ```no_run
//! use linkvault::core::paths::HomePaths;
//! use linkvault::core::registry::RegistryStore;
//! use std::path::Path;
//!
//! let home = HomePaths::from_env().unwrap();
//! let registry = RegistryStore::new(home);
//! let vault = registry.register(Path::new("/work/app")).unwrap();
//! println!("vault: {}", vault.primary_dir().display());
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::ops::{write_atomic, FileLock, LockError, DEFAULT_LOCK_TIMEOUT};
use crate::core::paths::{normalize_path, HomePaths};
use crate::core::types::{RelPath, UtcTimestamp, VaultId};

/// Current registry schema version.
pub const REGISTRY_VERSION: u32 = 1;

/// Errors from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The project root has no registry entry.
    #[error("project {} is not registered; run 'linkvault init' first", .0.display())]
    NotRegistered(PathBuf),

    #[error("failed to read registry '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse registry '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("unsupported registry version {0}, supported: {REGISTRY_VERSION}")]
    UnsupportedVersion(u32),

    #[error("failed to write registry '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to create vault directory '{}': {source}", path.display())]
    CreateVault { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Lock(#[from] LockError),
}

/// The registry file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub version: u32,
    #[serde(default)]
    pub projects: BTreeMap<VaultId, ProjectEntry>,
}

/// One registered project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    /// Absolute project root as registered.
    pub root: PathBuf,
    #[serde(rename = "registeredAt")]
    pub registered_at: UtcTimestamp,
}

impl Default for Index {
    fn default() -> Self {
        Self {
            version: REGISTRY_VERSION,
            projects: BTreeMap::new(),
        }
    }
}

impl Index {
    /// Find the vault id registered for `root`.
    pub fn find(&self, root: &Path) -> Option<&VaultId> {
        let wanted = normalize_path(root);
        self.projects
            .iter()
            .find(|(_, entry)| normalize_path(&entry.root) == wanted)
            .map(|(id, _)| id)
    }
}

/// A project's resolved vault.
///
/// Maps project-relative paths to their primary and backup copies. Both
/// trees use the same relative layout as the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vault {
    id: VaultId,
    primary_dir: PathBuf,
    backup_dir: PathBuf,
}

impl Vault {
    /// Build a vault from explicit directories.
    pub fn new(id: VaultId, primary_dir: PathBuf, backup_dir: PathBuf) -> Self {
        Self {
            id,
            primary_dir,
            backup_dir,
        }
    }

    /// Build the vault for `id` inside a home area.
    pub fn in_home(home: &HomePaths, id: VaultId) -> Self {
        let primary_dir = home.vault_dir(&id);
        let backup_dir = home.backup_dir(&id);
        Self::new(id, primary_dir, backup_dir)
    }

    pub fn id(&self) -> &VaultId {
        &self.id
    }

    pub fn primary_dir(&self) -> &Path {
        &self.primary_dir
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Location of the primary copy of `rel`.
    pub fn primary_path(&self, rel: &RelPath) -> PathBuf {
        self.primary_dir.join(rel.to_native())
    }

    /// Location of the backup copy of `rel`.
    pub fn backup_path(&self, rel: &RelPath) -> PathBuf {
        self.backup_dir.join(rel.to_native())
    }
}

/// Reads, writes and locks the registry in a home area.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    home: HomePaths,
    lock_timeout: Duration,
}

impl RegistryStore {
    pub fn new(home: HomePaths) -> Self {
        Self {
            home,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Override how long [`lock`](Self::lock) waits.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn home(&self) -> &HomePaths {
        &self.home
    }

    /// Load the registry. A missing file is an empty registry.
    pub fn load(&self) -> Result<Index, RegistryError> {
        let path = self.home.registry_path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Index::default()),
            Err(e) => return Err(RegistryError::Read { path, source: e }),
        };

        let index: Index = serde_json::from_str(&contents).map_err(|e| RegistryError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        if index.version != REGISTRY_VERSION {
            return Err(RegistryError::UnsupportedVersion(index.version));
        }
        Ok(index)
    }

    /// Atomically persist the registry, creating the home area if needed.
    pub fn save(&self, index: &Index) -> Result<(), RegistryError> {
        let path = self.home.registry_path();
        let write_err = |e: io::Error| RegistryError::Write {
            path: path.clone(),
            source: e,
        };

        fs::create_dir_all(&self.home.root).map_err(write_err)?;
        let mut json = serde_json::to_string_pretty(index)
            .map_err(|e| write_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        json.push('\n');
        write_atomic(&path, json.as_bytes()).map_err(write_err)
    }

    /// Acquire the registry lock.
    pub fn lock(&self) -> Result<FileLock, RegistryError> {
        Ok(FileLock::acquire(
            &self.home.registry_lock_path(),
            self.lock_timeout,
        )?)
    }

    /// Register `root`, or return its existing vault.
    ///
    /// A new registration gets a fresh id and both vault directories are
    /// created before the registry is saved.
    pub fn register(&self, root: &Path) -> Result<Vault, RegistryError> {
        let root = normalize_path(root);
        let _lock = self.lock()?;
        let mut index = self.load()?;

        if let Some(id) = index.find(&root) {
            tracing::debug!(root = %root.display(), id = %id, "project already registered");
            return Ok(Vault::in_home(&self.home, id.clone()));
        }

        let mut id = VaultId::generate();
        while index.projects.contains_key(&id) {
            id = VaultId::generate();
        }

        let vault = Vault::in_home(&self.home, id.clone());
        for dir in [vault.primary_dir(), vault.backup_dir()] {
            fs::create_dir_all(dir).map_err(|e| RegistryError::CreateVault {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        index.projects.insert(
            id.clone(),
            ProjectEntry {
                root: root.clone(),
                registered_at: UtcTimestamp::now(),
            },
        );
        self.save(&index)?;

        tracing::debug!(root = %root.display(), id = %id, "project registered");
        Ok(vault)
    }

    /// Look up the vault for `root` without modifying the registry.
    pub fn resolve(&self, root: &Path) -> Result<Vault, RegistryError> {
        let index = self.load()?;
        index
            .find(root)
            .map(|id| Vault::in_home(&self.home, id.clone()))
            .ok_or_else(|| RegistryError::NotRegistered(root.to_path_buf()))
    }
}
