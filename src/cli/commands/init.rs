//! init command - Initialize linkvault in the working directory

use anyhow::{Context as _, Result};

use super::{home_paths, working_dir};
use crate::core::config::Config;
use crate::core::paths::ProjectPaths;
use crate::core::project::Project;
use crate::core::registry::RegistryStore;
use crate::engine::{probe_symlink_support, Context};
use crate::ui::output::{self, Verbosity};

/// Initialize linkvault in the working directory.
///
/// Creates `.linkvault/` with an empty manifest, checks symlink support
/// (warning only), and registers the project's vault. Already-initialized
/// directories get a warning and no changes.
pub fn init(ctx: &Context) -> Result<()> {
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);
    let cwd = working_dir(ctx)?;

    if ProjectPaths::new(cwd.clone()).metadata_dir().is_dir() {
        output::warn("already initialized", verbosity);
        return Ok(());
    }

    let home = home_paths(&cwd)?;
    let config = Config::load(Some(&home), None)?;

    let project = Project::at(&cwd);
    project
        .manifest_store()
        .init()
        .context("Failed to initialize project")?;

    if let Err(reason) = probe_symlink_support(&project.paths().metadata_dir()) {
        tracing::debug!(%reason, "symlink probe failed");
        output::warn(
            "symlinks not supported on this system. linkvault unlock will not work until \
             Developer Mode is enabled (Windows: Settings > Update & Security > For Developers).",
            verbosity,
        );
    }

    let vault = RegistryStore::new(home)
        .with_lock_timeout(config.lock_timeout())
        .register(project.root())
        .context("Failed to register project")?;

    output::print(
        format!("Initialized linkvault in {}", project.root().display()),
        verbosity,
    );
    output::print(format!("Vault: {}", vault.primary_dir().display()), verbosity);
    Ok(())
}
