//! list command - List managed files

use anyhow::Result;

use super::Workspace;
use crate::engine::Context;
use crate::ui::output;

/// Print every managed path, sorted. Read-only.
pub fn list(ctx: &Context) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let manifest = ws.manifest_store().load()?;

    if manifest.is_empty() {
        println!("no managed files");
        return Ok(());
    }

    for (rel, _) in manifest.iter() {
        println!("{}", output::display_path(rel));
    }
    Ok(())
}
