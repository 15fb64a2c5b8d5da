//! core::manifest::schema
//!
//! Manifest schema (v1).
//!
//! # Schema Design
//!
//! - `version` is checked before the full body is parsed
//! - Keys are [`RelPath`]s, so a manifest that parses cannot name a file
//!   outside the project root
//! - `files` is a `BTreeMap`, so serialization and iteration are sorted
//!
//! # Example
//!
//! ```
//! use linkvault::core::manifest::schema::{parse_manifest, Manifest};
//!
//! let manifest = Manifest::new();
//! let json = manifest.to_json().unwrap();
//! let parsed = parse_manifest(&json).unwrap();
//! assert!(parsed.is_empty());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{Digest, FileState, RelPath, UtcTimestamp};

/// Current manifest schema version.
pub const MANIFEST_VERSION: u32 = 1;

/// Errors from parsing or serializing a manifest.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to parse manifest: {0}")]
    Parse(String),

    #[error("unsupported manifest version {0}, supported: {MANIFEST_VERSION}")]
    UnsupportedVersion(u32),

    #[error("failed to serialize manifest: {0}")]
    Serialize(String),
}

/// Envelope for version dispatch before full parsing.
#[derive(Debug, Deserialize)]
struct ManifestEnvelope {
    version: u32,
}

/// Parse manifest JSON.
///
/// # Errors
///
/// Returns an error if the JSON is malformed, the version is not supported,
/// or any key, timestamp, or hash is invalid.
pub fn parse_manifest(json: &str) -> Result<Manifest, SchemaError> {
    let envelope: ManifestEnvelope =
        serde_json::from_str(json).map_err(|e| SchemaError::Parse(e.to_string()))?;

    if envelope.version != MANIFEST_VERSION {
        return Err(SchemaError::UnsupportedVersion(envelope.version));
    }

    serde_json::from_str(json).map_err(|e| SchemaError::Parse(e.to_string()))
}

/// Per-project record of every managed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Schema version (always [`MANIFEST_VERSION`] when written).
    pub version: u32,

    /// Managed files keyed by project-relative path.
    #[serde(default)]
    pub files: BTreeMap<RelPath, FileEntry>,
}

/// A single managed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// What the manifest believes the original path holds.
    pub state: FileState,

    /// When the file was first locked.
    #[serde(rename = "lockedAt")]
    pub locked_at: UtcTimestamp,

    /// Digest of the original content at first lock.
    pub hash: Digest,
}

impl FileEntry {
    /// A freshly locked entry stamped with the current time.
    pub fn locked(hash: Digest) -> Self {
        Self {
            state: FileState::Locked,
            locked_at: UtcTimestamp::now(),
            hash,
        }
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

impl Manifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self {
            version: MANIFEST_VERSION,
            files: BTreeMap::new(),
        }
    }

    /// Look up an entry.
    pub fn get(&self, rel: &RelPath) -> Option<&FileEntry> {
        self.files.get(rel)
    }

    /// Look up an entry for mutation.
    pub fn get_mut(&mut self, rel: &RelPath) -> Option<&mut FileEntry> {
        self.files.get_mut(rel)
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, rel: RelPath, entry: FileEntry) {
        self.files.insert(rel, entry);
    }

    /// Remove an entry, returning it if present.
    pub fn remove(&mut self, rel: &RelPath) -> Option<FileEntry> {
        self.files.remove(rel)
    }

    /// Check whether a path is managed.
    pub fn contains(&self, rel: &RelPath) -> bool {
        self.files.contains_key(rel)
    }

    /// Iterate entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&RelPath, &FileEntry)> {
        self.files.iter()
    }

    /// Paths whose entries are in `state`, in path order.
    pub fn paths_in_state(&self, state: FileState) -> Vec<RelPath> {
        self.files
            .iter()
            .filter(|(_, entry)| entry.state == state)
            .map(|(rel, _)| rel.clone())
            .collect()
    }

    /// Number of managed files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True if no files are managed.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Serialize as pretty JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String, SchemaError> {
        let mut json =
            serde_json::to_string_pretty(self).map_err(|e| SchemaError::Serialize(e.to_string()))?;
        json.push('\n');
        Ok(json)
    }
}
