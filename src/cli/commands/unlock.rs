//! unlock command - Replace placeholders with links to the vault

use std::path::PathBuf;

use anyhow::Result;

use super::batch::run_paths;
use super::Workspace;
use crate::engine::{unlock_file, Context};

/// Unlock each path.
pub fn unlock(ctx: &Context, paths: &[PathBuf]) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let session = ws.session_or_register()?;

    let report = ws.with_manifest(|manifest| {
        run_paths(&ws, &session, manifest, paths, "unlocked", unlock_file)
    })?;
    report.finish()
}
