//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All user-facing output goes through this module so that quiet mode and
//! the `warning:` / `error:` prefixes are applied consistently. Diagnostic
//! events use `tracing` instead (see [`crate::logging`]).

pub mod output;
