//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! linkvault has two configuration scopes:
//! - **Global**: User-level settings
//! - **Project**: Per-project overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Project config file
//!
//! # Locations
//!
//! - Global: `$LINKVAULT_CONFIG` if set, otherwise `<home>/config.toml`
//! - Project: `.linkvault/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use linkvault::core::config::Config;
//! use linkvault::core::paths::{HomePaths, ProjectPaths};
//! use std::path::PathBuf;
//!
//! let home = HomePaths::from_env();
//! let project = ProjectPaths::new(PathBuf::from("/work/app"));
//! let config = Config::load(home.as_ref(), Some(&project)).unwrap();
//! println!("lock timeout: {:?}", config.lock_timeout());
//! ```

pub mod schema;

pub use schema::ConfigFile;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::ops::write_atomic;
use crate::core::paths::{HomePaths, ProjectPaths};
use schema::{
    DEFAULT_LOCK_TIMEOUT_SECS, DEFAULT_PROGRESS_THRESHOLD_MB, DEFAULT_SIZE_LIMIT_MB,
    DEFAULT_SIZE_WARNING_MB,
};

/// Environment variable naming the global config file.
pub const CONFIG_ENV: &str = "LINKVAULT_CONFIG";

const MB: u64 = 1024 * 1024;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    ReadError { path: PathBuf, source: io::Error },

    #[error("failed to parse config file '{}': {message}", path.display())]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{}': {source}", path.display())]
    WriteError { path: PathBuf, source: io::Error },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("unknown config key '{0}'")]
    UnknownKey(String),
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence automatically: project over global over
/// default.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: ConfigFile,
    /// Project configuration (if in a project)
    pub project: Option<ConfigFile>,
    global_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// Missing files are not an error; defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or
    /// parsed, or if the merged values are invalid.
    pub fn load(
        home: Option<&HomePaths>,
        project: Option<&ProjectPaths>,
    ) -> Result<Self, ConfigError> {
        let global_path = Self::global_config_path(home);
        let global = match &global_path {
            Some(path) => Self::read_file(path)?,
            None => None,
        };

        let project_path = project.map(ProjectPaths::config_path);
        let project_file = match &project_path {
            Some(path) => Self::read_file(path)?,
            None => None,
        };

        let config = Config {
            global_path: global.as_ref().and(global_path),
            global: global.unwrap_or_default(),
            project_path: project_file.as_ref().and(project_path),
            project: project_file,
        };

        config.global.validate()?;
        if let Some(project) = &config.project {
            project.validate()?;
        }
        config.validate_merged()?;

        tracing::debug!(
            global = ?config.global_path,
            project = ?config.project_path,
            "config loaded"
        );
        Ok(config)
    }

    /// The global config location: `$LINKVAULT_CONFIG`, else `<home>/config.toml`.
    pub fn global_config_path(home: Option<&HomePaths>) -> Option<PathBuf> {
        match std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            Some(path) => Some(PathBuf::from(path)),
            None => home.map(HomePaths::config_path),
        }
    }

    fn read_file(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        toml::from_str(&contents)
            .map(Some)
            .map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    /// Read only the project config file (for editing).
    pub fn read_project(paths: &ProjectPaths) -> Result<ConfigFile, ConfigError> {
        Ok(Self::read_file(&paths.config_path())?.unwrap_or_default())
    }

    /// Write project config atomically.
    pub fn write_project(paths: &ProjectPaths, config: &ConfigFile) -> Result<PathBuf, ConfigError> {
        config.validate()?;
        let path = paths.config_path();
        let write_err = |e: io::Error| ConfigError::WriteError {
            path: path.clone(),
            source: e,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        write_atomic(&path, contents.as_bytes()).map_err(write_err)?;
        Ok(path)
    }

    /// This configuration with `project` in place of the project file,
    /// validated after merging.
    pub fn with_project(&self, project: ConfigFile) -> Result<Self, ConfigError> {
        project.validate()?;
        let config = Config {
            project: Some(project),
            ..self.clone()
        };
        config.validate_merged()?;
        Ok(config)
    }

    fn validate_merged(&self) -> Result<(), ConfigError> {
        schema::validate_size_pair(self.value("size_warning_mb")?, self.value("size_limit_mb")?)
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Effective value of `key` after precedence.
    pub fn value(&self, key: &str) -> Result<u64, ConfigError> {
        let from_project = match &self.project {
            Some(project) => project.get(key)?,
            None => None,
        };
        let configured = from_project.or(self.global.get(key)?);
        Ok(configured.unwrap_or(match key {
            "lock_timeout_secs" => DEFAULT_LOCK_TIMEOUT_SECS,
            "size_warning_mb" => DEFAULT_SIZE_WARNING_MB,
            "size_limit_mb" => DEFAULT_SIZE_LIMIT_MB,
            _ => DEFAULT_PROGRESS_THRESHOLD_MB,
        }))
    }

    /// How long to wait for the manifest or registry lock.
    ///
    /// Defaults to 30 seconds.
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.effective("lock_timeout_secs"))
    }

    /// Files above this many bytes are locked with a warning.
    ///
    /// Defaults to 100 MB.
    pub fn size_warning_bytes(&self) -> u64 {
        self.effective("size_warning_mb").saturating_mul(MB)
    }

    /// Files above this many bytes need `--force`.
    ///
    /// Defaults to 1 GB.
    pub fn size_limit_bytes(&self) -> u64 {
        self.effective("size_limit_mb").saturating_mul(MB)
    }

    /// Files above this many bytes report hashing progress.
    ///
    /// Defaults to 10 MB.
    pub fn progress_threshold_bytes(&self) -> u64 {
        self.effective("progress_threshold_mb").saturating_mul(MB)
    }

    fn effective(&self, key: &str) -> u64 {
        // Every key passed here is in ConfigFile::KEYS.
        self.value(key).unwrap_or_default()
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded project config file.
    pub fn project_config_loaded_from(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }
}
