//! logging
//!
//! Diagnostic event output using `tracing` and `tracing-subscriber`.
//!
//! Events go to stderr so they never mix with command results. `RUST_LOG`
//! overrides the level chosen from the command-line flags.

use tracing_subscriber::{fmt, util::SubscriberInitExt, EnvFilter};

use crate::ui::output::Verbosity;

/// Default filter directive for a verbosity level.
pub fn default_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "warn",
        Verbosity::Normal => "info",
        Verbosity::Debug => "debug",
    }
}

/// Initialize the global subscriber. Safe to call multiple times; subsequent
/// calls will no-op.
pub fn init(verbosity: Verbosity) {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_per_verbosity() {
        assert_eq!(default_directive(Verbosity::Quiet), "warn");
        assert_eq!(default_directive(Verbosity::Normal), "info");
        assert_eq!(default_directive(Verbosity::Debug), "debug");
    }

    #[test]
    fn init_twice_is_noop() {
        init(Verbosity::Quiet);
        init(Verbosity::Debug);
        assert!(tracing::dispatcher::has_been_set());
    }
}
