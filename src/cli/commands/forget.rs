//! forget command - Restore files and stop managing them

use std::path::PathBuf;

use anyhow::Result;

use super::batch::run_paths;
use super::Workspace;
use crate::engine::{forget_file, Context};

/// Forget each path, restoring its content from the vault.
pub fn forget(ctx: &Context, paths: &[PathBuf]) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let session = ws.session_or_register()?;

    let report = ws.with_manifest(|manifest| {
        run_paths(&ws, &session, manifest, paths, "forgotten", forget_file)
    })?;
    report.finish()
}
