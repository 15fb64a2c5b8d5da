//! lock command - Move files into the vault and leave placeholders

use std::path::PathBuf;

use anyhow::Result;

use super::batch::run_paths;
use super::Workspace;
use crate::engine::{lock_file, Context};

/// Lock each path. Already-locked files are reported and count as success.
pub fn lock(ctx: &Context, paths: &[PathBuf], force: bool) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let session = ws.session_or_register()?;

    let report = ws.with_manifest(|manifest| {
        run_paths(&ws, &session, manifest, paths, "locked", |session, manifest, rel| {
            lock_file(session, manifest, rel, force)
        })
    })?;
    report.finish()
}
