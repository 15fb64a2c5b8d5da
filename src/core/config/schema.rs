//! core::config::schema
//!
//! Configuration file schema.
//!
//! The same schema is used for the global file and the project file. Every
//! key is optional; unset keys fall through to the next scope and finally to
//! the built-in default.
//!
//! # Validation
//!
//! Values are validated after parsing: the lock timeout must be between 1
//! and 3600 seconds and the size limit may not be below the size warning.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Default manifest/registry lock timeout in seconds.
pub const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 30;

/// Default size above which locking warns, in MB.
pub const DEFAULT_SIZE_WARNING_MB: u64 = 100;

/// Default size above which locking requires `--force`, in MB.
pub const DEFAULT_SIZE_LIMIT_MB: u64 = 1024;

/// Default size above which hashing reports progress, in MB.
pub const DEFAULT_PROGRESS_THRESHOLD_MB: u64 = 10;

/// Upper bound for `lock_timeout_secs`.
pub const MAX_LOCK_TIMEOUT_SECS: u64 = 3600;

/// A configuration file (global or project scope).
///
/// # Example
///
/// ```toml
/// lock_timeout_secs = 30
/// size_warning_mb = 100
/// size_limit_mb = 1024
/// progress_threshold_mb = 10
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Seconds to wait for the manifest or registry lock
    pub lock_timeout_secs: Option<u64>,

    /// Files larger than this are locked with a warning
    pub size_warning_mb: Option<u64>,

    /// Files larger than this need `--force`
    pub size_limit_mb: Option<u64>,

    /// Files larger than this report hashing progress
    pub progress_threshold_mb: Option<u64>,
}

impl ConfigFile {
    /// All recognized keys, in display order.
    pub const KEYS: &'static [&'static str] = &[
        "lock_timeout_secs",
        "size_warning_mb",
        "size_limit_mb",
        "progress_threshold_mb",
    ];

    /// Validate the values present in this file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(secs) = self.lock_timeout_secs {
            validate_lock_timeout(secs)?;
        }
        if let (Some(warning), Some(limit)) = (self.size_warning_mb, self.size_limit_mb) {
            validate_size_pair(warning, limit)?;
        }
        Ok(())
    }

    /// Read a key's value as set in this file.
    pub fn get(&self, key: &str) -> Result<Option<u64>, ConfigError> {
        Ok(*self.slot(key)?)
    }

    /// Set a key from its string form.
    ///
    /// The file is validated after the change; on error it is left unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let parsed: u64 = value.trim().parse().map_err(|_| {
            ConfigError::InvalidValue(format!(
                "{} must be a non-negative integer, got '{}'",
                key, value
            ))
        })?;

        let mut updated = self.clone();
        *updated.slot_mut(key)? = Some(parsed);
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    fn slot(&self, key: &str) -> Result<&Option<u64>, ConfigError> {
        match key {
            "lock_timeout_secs" => Ok(&self.lock_timeout_secs),
            "size_warning_mb" => Ok(&self.size_warning_mb),
            "size_limit_mb" => Ok(&self.size_limit_mb),
            "progress_threshold_mb" => Ok(&self.progress_threshold_mb),
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    fn slot_mut(&mut self, key: &str) -> Result<&mut Option<u64>, ConfigError> {
        match key {
            "lock_timeout_secs" => Ok(&mut self.lock_timeout_secs),
            "size_warning_mb" => Ok(&mut self.size_warning_mb),
            "size_limit_mb" => Ok(&mut self.size_limit_mb),
            "progress_threshold_mb" => Ok(&mut self.progress_threshold_mb),
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }
}

pub(super) fn validate_lock_timeout(secs: u64) -> Result<(), ConfigError> {
    if secs == 0 || secs > MAX_LOCK_TIMEOUT_SECS {
        return Err(ConfigError::InvalidValue(format!(
            "lock_timeout_secs must be between 1 and {}, got {}",
            MAX_LOCK_TIMEOUT_SECS, secs
        )));
    }
    Ok(())
}

pub(super) fn validate_size_pair(warning_mb: u64, limit_mb: u64) -> Result<(), ConfigError> {
    if limit_mb < warning_mb {
        return Err(ConfigError::InvalidValue(format!(
            "size_limit_mb ({}) must not be below size_warning_mb ({})",
            limit_mb, warning_mb
        )));
    }
    Ok(())
}
