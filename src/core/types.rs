//! core::types
//!
//! Strong types used throughout linkvault.
//!
//! # Types
//!
//! - [`RelPath`] - Validated project-relative, forward-slash path
//! - [`Digest`] - Algorithm-tagged content hash (`sha256:<hex>`)
//! - [`UtcTimestamp`] - RFC3339 timestamp with whole-second precision
//! - [`VaultId`] - Opaque vault identifier
//! - [`FileState`] - Recorded state of a managed file
//!
//! # Validation
//!
//! These types enforce validity at construction time. A manifest that
//! deserializes successfully cannot contain a key that escapes the project
//! root or a hash in an unknown format.
//!
//! # Examples
//!
//! ```
//! use linkvault::core::types::{Digest, RelPath};
//!
//! let rel = RelPath::new("config/secret.env").unwrap();
//! assert_eq!(rel.as_str(), "config/secret.env");
//!
//! assert!(RelPath::new("../outside").is_err());
//! assert!(Digest::new("md5:abc").is_err());
//! ```

use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::core::paths::METADATA_DIR;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid relative path '{path}': {reason}")]
    InvalidRelPath { path: String, reason: String },

    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("invalid vault id: {0}")]
    InvalidVaultId(String),
}

/// A validated project-relative path.
///
/// Components are separated by `/` regardless of platform. A `RelPath`:
/// - is not empty and not absolute
/// - has no empty, `.` or `..` components
/// - contains no backslashes or NUL bytes
/// - does not point into the `.linkvault` metadata directory
///
/// # Example
///
/// ```
/// use linkvault::core::types::RelPath;
///
/// let rel = RelPath::new("a/secret.txt").unwrap();
/// assert_eq!(rel.file_name(), "secret.txt");
///
/// assert!(RelPath::new("").is_err());
/// assert!(RelPath::new("/etc/passwd").is_err());
/// assert!(RelPath::new("a//b").is_err());
/// assert!(RelPath::new(".linkvault/manifest.json").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelPath(String);

impl RelPath {
    /// Create a new validated relative path.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRelPath` if the path breaks any rule above.
    pub fn new(path: impl Into<String>) -> Result<Self, TypeError> {
        let path = path.into();
        Self::validate(&path)?;
        Ok(Self(path))
    }

    fn validate(path: &str) -> Result<(), TypeError> {
        let reject = |reason: &str| {
            Err(TypeError::InvalidRelPath {
                path: path.to_string(),
                reason: reason.to_string(),
            })
        };

        if path.is_empty() {
            return reject("path cannot be empty");
        }
        if path.starts_with('/') {
            return reject("path must be relative");
        }
        if path.contains('\\') {
            return reject("path must use '/' separators");
        }
        if path.contains('\0') {
            return reject("path cannot contain NUL");
        }
        // Windows drive prefixes such as "C:" would make the join absolute.
        let bytes = path.as_bytes();
        if bytes.first().is_some_and(u8::is_ascii_alphabetic) && bytes.get(1) == Some(&b':') {
            return reject("path must be relative");
        }

        for (index, component) in path.split('/').enumerate() {
            match component {
                "" => return reject("path cannot contain empty components"),
                "." | ".." => return reject("path cannot contain '.' or '..' components"),
                name if index == 0 && name == METADATA_DIR => {
                    return reject("path cannot point into the metadata directory")
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to an OS-native relative path.
    pub fn to_native(&self) -> PathBuf {
        self.0.split('/').collect()
    }

    /// The last component of the path.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl TryFrom<String> for RelPath {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RelPath> for String {
    fn from(path: RelPath) -> Self {
        path.0
    }
}

impl AsRef<str> for RelPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RelPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Algorithm tag for SHA-256 digests.
pub const SHA256_TAG: &str = "sha256";

/// An algorithm-tagged content digest.
///
/// Only SHA-256 is produced and accepted. The hex part is normalized to
/// lowercase.
///
/// # Example
///
/// ```
/// use linkvault::core::types::Digest;
///
/// let hex = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
/// let digest = Digest::new(format!("sha256:{}", hex)).unwrap();
/// assert_eq!(digest.algorithm(), "sha256");
/// assert_eq!(digest.hex(), hex);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest(String);

impl Digest {
    /// Parse a tagged digest string.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidDigest` unless the value is
    /// `sha256:` followed by 64 hex characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        let (tag, hex) = value
            .split_once(':')
            .ok_or_else(|| TypeError::InvalidDigest(format!("missing algorithm tag: {}", value)))?;

        if tag != SHA256_TAG {
            return Err(TypeError::InvalidDigest(format!(
                "unsupported algorithm '{}'",
                tag
            )));
        }
        if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidDigest(format!(
                "expected 64 hex characters, got '{}'",
                hex
            )));
        }

        Ok(Self(format!("{}:{}", SHA256_TAG, hex.to_ascii_lowercase())))
    }

    /// Build a digest from raw SHA-256 output.
    pub fn from_sha256(bytes: &[u8]) -> Self {
        Self(format!("{}:{}", SHA256_TAG, hex::encode(bytes)))
    }

    /// The algorithm tag (always `sha256`).
    pub fn algorithm(&self) -> &str {
        SHA256_TAG
    }

    /// The hex-encoded hash without the tag.
    pub fn hex(&self) -> &str {
        self.0
            .split_once(':')
            .map(|(_, hex)| hex)
            .unwrap_or(&self.0)
    }

    /// Get the full tagged string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Digest {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.0
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A UTC timestamp serialized as RFC3339 with whole seconds (`...T12:00:00Z`).
///
/// # Example
///
/// ```
/// use linkvault::core::types::UtcTimestamp;
///
/// let ts = UtcTimestamp::parse("2026-01-02T03:04:05Z").unwrap();
/// assert_eq!(ts.to_string(), "2026-01-02T03:04:05Z");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UtcTimestamp(DateTime<Utc>);

impl UtcTimestamp {
    /// Create a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(0))
    }

    /// Parse an RFC3339 timestamp, converting any offset to UTC.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| TypeError::InvalidTimestamp(format!("{}: {}", value, e)))
    }

    /// Get the underlying datetime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl TryFrom<String> for UtcTimestamp {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<UtcTimestamp> for String {
    fn from(ts: UtcTimestamp) -> Self {
        ts.to_string()
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

/// Length of freshly generated vault ids.
const VAULT_ID_LEN: usize = 12;

/// Opaque identifier of a project's vault.
///
/// Ids are lowercase hex. New ids are 12 characters taken from a random
/// UUID v4; shorter ids written by older registries are still accepted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VaultId(String);

impl VaultId {
    /// Validate an existing id.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() || id.len() > 32 {
            return Err(TypeError::InvalidVaultId(format!(
                "expected 1-32 characters, got {}",
                id.len()
            )));
        }
        if !id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')) {
            return Err(TypeError::InvalidVaultId(format!(
                "'{}' is not lowercase hex",
                id
            )));
        }
        Ok(Self(id))
    }

    /// Generate a fresh random id.
    pub fn generate() -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Self(simple.chars().take(VAULT_ID_LEN).collect())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VaultId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<VaultId> for String {
    fn from(id: VaultId) -> Self {
        id.0
    }
}

impl std::fmt::Display for VaultId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The state a manifest entry records for a managed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    /// Original path holds a placeholder.
    Locked,
    /// Original path is a symbolic link to the vault copy.
    Unlocked,
}

impl std::fmt::Display for FileState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileState::Locked => write!(f, "locked"),
            FileState::Unlocked => write!(f, "unlocked"),
        }
    }
}
