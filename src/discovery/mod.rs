//! discovery
//!
//! Finds unmanaged files matching the project's `.linkvaultfiles` rules.
//!
//! # Architecture
//!
//! `.linkvaultfiles` uses gitignore syntax: one pattern per line, `#`
//! comments, `!` negation, trailing `/` for directories, leading `/` to
//! anchor at the root. Patterns are compiled once into a [`PatternSet`];
//! [`discover`] then walks the project tree without following links.
//!
//! Excluded from the walk:
//! - every directory whose name starts with `.` (this covers `.linkvault/`
//!   and `.git/`)
//! - anything that is not a regular file
//! - paths already recorded in the manifest
//!
//! # Example
//!
//! ```ignore
//! use linkvault::discovery::{discover, PatternSet};
//!
//! let patterns = PatternSet::load(project.root())?;
//! for rel in discover(&project, &patterns, &manifest)? {
//!     println!("would lock {}", rel);
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use thiserror::Error;
use walkdir::WalkDir;

use crate::core::manifest::Manifest;
use crate::core::paths::PATTERNS_FILE;
use crate::core::project::Project;
use crate::core::types::RelPath;

/// Errors from loading patterns or walking the tree.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid pattern in {} line {line}: {message}", path.display())]
    Pattern {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("failed to walk project tree: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Compiled `.linkvaultfiles` rules.
#[derive(Debug, Clone)]
pub struct PatternSet {
    matcher: Gitignore,
    count: usize,
}

impl PatternSet {
    /// Load `<root>/.linkvaultfiles`. A missing file yields an empty set.
    pub fn load(root: &Path) -> Result<Self, DiscoveryError> {
        let path = root.join(PATTERNS_FILE);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no pattern file");
                return Ok(Self::empty());
            }
            Err(source) => return Err(DiscoveryError::Read { path, source }),
        };
        Self::parse(root, &text).map_err(|(line, message)| DiscoveryError::Pattern {
            path,
            line,
            message,
        })
    }

    /// Compile patterns from text, reporting the first bad line.
    fn parse(root: &Path, text: &str) -> Result<Self, (usize, String)> {
        let mut builder = GitignoreBuilder::new(root);
        let mut count = 0;
        for (index, line) in text.lines().enumerate() {
            let trimmed = line.trim_end();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            builder
                .add_line(None, trimmed)
                .map_err(|e| (index + 1, e.to_string()))?;
            count += 1;
        }
        let matcher = builder.build().map_err(|e| (0, e.to_string()))?;
        Ok(Self { matcher, count })
    }

    fn empty() -> Self {
        Self {
            matcher: Gitignore::empty(),
            count: 0,
        }
    }

    /// Number of patterns (negations included).
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// True if the rules select this file, directly or through a parent
    /// directory pattern, and no later negation excludes it.
    pub fn matches(&self, rel: &RelPath) -> bool {
        self.matcher
            .matched_path_or_any_parents(rel.to_native(), false)
            .is_ignore()
    }
}

/// Unmanaged regular files under the project root selected by `patterns`,
/// sorted by path.
pub fn discover(
    project: &Project,
    patterns: &PatternSet,
    manifest: &Manifest,
) -> Result<Vec<RelPath>, DiscoveryError> {
    if patterns.is_empty() {
        return Ok(Vec::new());
    }

    let root = project.root();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden_dir(entry));

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(rel) = to_rel_path(root, entry.path()) else {
            tracing::warn!(path = %entry.path().display(), "skipping path that cannot be managed");
            continue;
        };
        if manifest.contains(&rel) || !patterns.matches(&rel) {
            continue;
        }
        found.push(rel);
    }

    found.sort();
    tracing::debug!(count = found.len(), "discovered files");
    Ok(found)
}

fn is_hidden_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with('.')
}

fn to_rel_path(root: &Path, path: &Path) -> Option<RelPath> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
    RelPath::new(parts?.join("/")).ok()
}
