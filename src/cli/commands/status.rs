//! status command - Show managed files and their observed state

use anyhow::Result;

use super::Workspace;
use crate::engine::{file_status, Context};
use crate::ui::output;

/// Print one line per managed file, sorted by path.
///
/// Read-only: the manifest lock is not taken.
pub fn status(ctx: &Context) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let session = ws.session()?;
    let manifest = ws.manifest_store().load()?;

    if manifest.is_empty() {
        println!("no managed files");
        return Ok(());
    }

    for (rel, entry) in manifest.iter() {
        let status = file_status(&session, entry, rel);
        println!("{}", output::format_status_line(status, rel));
    }
    Ok(())
}
