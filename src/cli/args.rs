//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// linkvault - keep sensitive project files out of reach of automated tools
#[derive(Parser, Debug)]
#[command(name = "linkvault")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if linkvault was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize linkvault in the current directory
    #[command(
        name = "init",
        long_about = "Initialize linkvault in the current directory.\n\n\
            Creates .linkvault/ with an empty manifest and registers a private vault \
            for this project under your home directory. Running init twice is harmless."
    )]
    Init,

    /// Lock files (replace them with placeholders)
    #[command(
        name = "lock",
        long_about = "Move files into the vault and leave a placeholder in their place.\n\n\
            The content is copied to the vault, verified by digest, backed up, and only \
            then replaced by a short placeholder that explains how to get it back. \
            Locking an unlocked file replaces its symlink with the placeholder again.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Protect a single file
    linkvault lock .env

    # Protect several files at once
    linkvault lock config/secrets.yaml certs/server.key

    # Lock a file above the size limit
    linkvault lock --force data/dump.sql"
    )]
    Lock {
        /// Files to lock
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        /// Allow locking files above the size limit
        #[arg(long)]
        force: bool,
    },

    /// Unlock files (replace placeholders with symlinks to the vault)
    #[command(
        name = "unlock",
        long_about = "Make locked files readable again.\n\n\
            Each placeholder is replaced by a symbolic link to the vault copy, so edits \
            made through the link land in the vault. Run 'linkvault lock' to hide the \
            file again."
    )]
    Unlock {
        /// Files to unlock
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,
    },

    /// Restore files from the vault and stop managing them
    #[command(
        name = "forget",
        long_about = "Restore the vault copy to its original location and remove the file \
            from management.\n\n\
            The vault copy and its backup are deleted afterwards."
    )]
    Forget {
        /// Files to forget
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,
    },

    /// Show managed files and their state
    #[command(
        name = "status",
        long_about = "Show every managed file with its observed state.\n\n\
            States: locked, unlocked, dirty (vault copy changed since lock), \
            tampered (placeholder was edited), missing (vault copy gone), unknown."
    )]
    Status,

    /// List managed files
    #[command(name = "list")]
    List,

    /// Lock every unlocked file and every new file matched by .linkvaultfiles
    #[command(
        name = "lock-all",
        long_about = "Lock all managed files that are currently unlocked, plus every file \
            matched by the gitignore-style rules in .linkvaultfiles that is not managed yet.",
        after_help = "\
WORKFLOW EXAMPLES:
    # See what would be locked
    linkvault lock-all --dry-run

    # Lock everything
    linkvault lock-all"
    )]
    LockAll {
        /// Show files that would be locked without locking them
        #[arg(long)]
        dry_run: bool,

        /// Allow locking files above the size limit
        #[arg(long)]
        force: bool,
    },

    /// Unlock every locked file
    #[command(name = "unlock-all")]
    UnlockAll,

    /// Get, set, or list configuration values
    #[command(
        name = "config",
        long_about = "View or modify linkvault configuration.\n\n\
            Project configuration is stored in .linkvault/config.toml and overrides the \
            global configuration in the linkvault home directory.",
        after_help = "\
WORKFLOW EXAMPLES:
    # List all configuration values
    linkvault config list

    # Get a specific value
    linkvault config get size_limit_mb

    # Set a value for this project
    linkvault config set lock_timeout_secs 60"
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell. Add the output \
            to your shell's configuration to enable tab-completion for linkvault commands.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    linkvault completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    linkvault completion zsh >> ~/.zshrc

    # Fish
    linkvault completion fish > ~/.config/fish/completions/linkvault.fish

    # PowerShell
    linkvault completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value in the project config
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
    /// List all configuration values
    List,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
