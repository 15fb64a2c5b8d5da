//! core::project
//!
//! Project discovery and path conversion.
//!
//! A project is any directory containing a `.linkvault/` metadata
//! directory. Commands locate it by walking upward from the working
//! directory, the same way version control tools find their repository.

use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::core::manifest::ManifestStore;
use crate::core::paths::{absolutize, normalize_path, ProjectPaths};
use crate::core::types::{RelPath, TypeError};

/// Errors from project resolution.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error(
        "not a linkvault project (no .linkvault/ found in {} or any parent)",
        .0.display()
    )]
    NotFound(PathBuf),

    #[error("path {} is outside the project root", .0.display())]
    OutsideRoot(PathBuf),

    #[error("path {} is the project root, not a file", .0.display())]
    IsRoot(PathBuf),

    #[error("failed to determine current directory: {0}")]
    CurrentDir(#[source] io::Error),

    #[error(transparent)]
    InvalidPath(#[from] TypeError),
}

/// A located project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    paths: ProjectPaths,
}

impl Project {
    /// A project rooted at `root`, without checking that it exists.
    pub fn at(root: &Path) -> Self {
        Self {
            paths: ProjectPaths::new(normalize_path(root)),
        }
    }

    /// Walk upward from `start` to the nearest directory containing
    /// `.linkvault/`.
    pub fn find(start: &Path) -> Result<Self, ProjectError> {
        let start = if start.is_absolute() {
            normalize_path(start)
        } else {
            let cwd = std::env::current_dir().map_err(ProjectError::CurrentDir)?;
            absolutize(start, &cwd)
        };

        let mut dir = start.as_path();
        loop {
            let candidate = Self::at(dir);
            if candidate.paths.metadata_dir().is_dir() {
                tracing::debug!(root = %dir.display(), "project found");
                return Ok(candidate);
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => return Err(ProjectError::NotFound(start.clone())),
            }
        }
    }

    /// Absolute project root.
    pub fn root(&self) -> &Path {
        &self.paths.root
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    /// A manifest store for this project.
    pub fn manifest_store(&self) -> ManifestStore {
        ManifestStore::new(self.paths.clone())
    }

    /// Absolute, OS-native location of a managed file.
    pub fn abs_path(&self, rel: &RelPath) -> PathBuf {
        self.paths.abs_path(rel)
    }

    /// Convert a user-supplied path into a project-relative path.
    ///
    /// Relative arguments are resolved against `cwd`. The result is
    /// normalized lexically, so `a/../b` names `b` and nothing on disk is
    /// consulted.
    ///
    /// # Errors
    ///
    /// - [`ProjectError::OutsideRoot`] if the path is not under the root
    /// - [`ProjectError::IsRoot`] if the path is the root itself
    /// - [`ProjectError::InvalidPath`] if the result is not a valid
    ///   [`RelPath`] (for example it points into `.linkvault/`)
    pub fn rel_path(&self, arg: &Path, cwd: &Path) -> Result<RelPath, ProjectError> {
        let abs = absolutize(arg, cwd);
        let rest = abs
            .strip_prefix(self.root())
            .map_err(|_| ProjectError::OutsideRoot(abs.clone()))?;

        let mut parts = Vec::new();
        for component in rest.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                _ => return Err(ProjectError::OutsideRoot(abs.clone())),
            }
        }
        if parts.is_empty() {
            return Err(ProjectError::IsRoot(abs));
        }

        Ok(RelPath::new(parts.join("/"))?)
    }
}
