//! config command - Get, set, or list configuration values

use anyhow::{Context as _, Result};

use super::Workspace;
use crate::core::config::{Config, ConfigFile};
use crate::engine::Context;
use crate::ui::output;

/// Print the effective value of a key.
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    println!("{}", ws.config.value(key)?);
    Ok(())
}

/// Set a key in the project configuration.
///
/// The merged result must stay valid; for example the size warning may not
/// exceed the size limit inherited from the global file.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let paths = ws.project.paths();

    let mut file = Config::read_project(paths)?;
    file.set(key, value)?;
    ws.config.with_project(file.clone())?;

    let path = Config::write_project(paths, &file).context("Failed to write config")?;
    tracing::debug!(path = %path.display(), key, value, "config updated");
    output::print(format!("Set {} = {}", key, value.trim()), ws.verbosity);
    Ok(())
}

/// List every key with its effective value and where it came from.
pub fn list(ctx: &Context) -> Result<()> {
    let ws = Workspace::open(ctx)?;

    for key in ConfigFile::KEYS {
        let in_project = match &ws.config.project {
            Some(project) => project.get(key)?.is_some(),
            None => false,
        };
        let source = if in_project {
            "project"
        } else if ws.config.global.get(key)?.is_some() {
            "global"
        } else {
            "default"
        };
        println!("{} = {}  # {}", key, ws.config.value(key)?, source);
    }
    Ok(())
}
