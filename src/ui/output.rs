//! ui::output
//!
//! User-facing output.
//!
//! # Design
//!
//! Results go to stdout; warnings and errors go to stderr with a
//! `warning:` / `error:` prefix. Everything except errors respects
//! `--quiet`. Paths are shown with the platform's separator.

use std::fmt::Display;

use crate::core::types::RelPath;
use crate::engine::FileStatus;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Results, warnings and errors
    Normal,
    /// Normal output plus diagnostic events
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags. Quiet wins over debug.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a per-file error (always shown).
pub fn file_error(path: impl Display, message: impl Display) {
    eprintln!("error: {}: {}", path, message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print `<label>: <path>` after a per-file action (respects quiet mode).
pub fn file_done(label: &str, rel: &RelPath, verbosity: Verbosity) {
    print(format!("{}: {}", label, display_path(rel)), verbosity);
}

/// A relative path with native separators.
pub fn display_path(rel: &RelPath) -> String {
    rel.to_native().display().to_string()
}

/// One `status` line: the status padded to 12 columns, then the path.
pub fn format_status_line(status: FileStatus, rel: &RelPath) -> String {
    format!("{:<12}{}", status.as_str(), display_path(rel))
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}
