//! cli
//!
//! Command-line interface layer for linkvault.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the diagnostic subscriber
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to a
//! handler that resolves the project, holds the manifest lock and calls
//! [`crate::engine`] once per file.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::engine;
use crate::logging;
use crate::ui::output::Verbosity;
use anyhow::Result;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    logging::init(Verbosity::from_flags(cli.quiet, cli.debug));

    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}
