//! linkvault - keep sensitive project files out of reach of automated tools
//!
//! linkvault moves selected files into a private per-user vault and leaves a
//! short placeholder at the original path. Unlocking swaps the placeholder
//! for a symbolic link to the vault copy; locking again swaps it back.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, runs per-file batches)
//! - [`engine`] - Lock, unlock, forget and status for a single file
//! - [`discovery`] - Pattern-based discovery of files to lock
//! - [`core`] - Domain types, manifest, registry, config, durable writes and locks
//! - [`ui`] - User-facing output
//! - [`logging`] - Diagnostic event output
//!
//! # Correctness Invariants
//!
//! linkvault maintains the following invariants:
//!
//! 1. A file's content is never deleted before a verified vault copy and a
//!    backup exist
//! 2. A regular file that is not an unmodified placeholder is never
//!    overwritten or removed
//! 3. The manifest and registry are only changed under their advisory locks
//!    and are always replaced atomically

pub mod cli;
pub mod core;
pub mod discovery;
pub mod engine;
pub mod logging;
pub mod ui;
