//! lock-all and unlock-all commands

use anyhow::{bail, Context as _, Result};

use super::batch::report_outcome;
use super::{lock_manifest, Workspace};
use crate::core::manifest::Manifest;
use crate::core::types::{FileState, RelPath};
use crate::discovery::{discover, PatternSet};
use crate::engine::{lock_file, unlock_file, Context, Transition};
use crate::ui::output;

/// Files lock-all would touch.
#[derive(Debug, Default)]
struct LockAllPlan {
    /// Managed files currently unlocked.
    relock: Vec<RelPath>,
    /// Unmanaged files matched by `.linkvaultfiles`.
    new: Vec<RelPath>,
}

impl LockAllPlan {
    fn build(ws: &Workspace, manifest: &Manifest) -> Result<Self> {
        let patterns =
            PatternSet::load(ws.project.root()).context("Failed to load .linkvaultfiles")?;
        let new = discover(&ws.project, &patterns, manifest).context("Failed to discover files")?;
        Ok(Self {
            relock: manifest.paths_in_state(FileState::Unlocked),
            new,
        })
    }

    fn is_empty(&self) -> bool {
        self.relock.is_empty() && self.new.is_empty()
    }

    fn paths(&self) -> impl Iterator<Item = &RelPath> {
        self.relock.iter().chain(self.new.iter())
    }
}

/// Lock every unlocked file and every newly matched file.
pub fn lock_all(ctx: &Context, dry_run: bool, force: bool) -> Result<()> {
    let ws = Workspace::open(ctx)?;

    if dry_run {
        let store = ws.manifest_store();
        let _lock = store.lock()?;
        let manifest = store.load()?;
        let plan = LockAllPlan::build(&ws, &manifest)?;
        if plan.is_empty() {
            println!("nothing to lock");
            return Ok(());
        }
        println!("files that would be locked:");
        let lines: Vec<String> = plan.paths().map(output::display_path).collect();
        println!("{}", output::format_list(&lines, "  "));
        return Ok(());
    }

    let session = ws.session_or_register()?;
    ws.with_manifest(|shared| {
        let plan = LockAllPlan::build(&ws, &*lock_manifest(shared)?)?;
        if plan.is_empty() {
            output::print("nothing to lock", ws.verbosity);
            return Ok(());
        }

        let (mut new, mut relocked, mut failed) = (0usize, 0usize, 0usize);
        for rel in plan.paths() {
            let result = {
                let mut manifest = lock_manifest(shared)?;
                lock_file(&session, &mut manifest, rel, force)
            };
            match result {
                Ok(outcome) => {
                    report_outcome(rel, &outcome, ws.verbosity);
                    match outcome.transition {
                        Transition::Locked => new += 1,
                        Transition::Relocked => relocked += 1,
                        _ => {}
                    }
                }
                Err(e) => {
                    output::file_error(output::display_path(rel), e);
                    failed += 1;
                }
            }
        }

        output::print(
            format!(
                "locked {} files ({} new, {} re-locked)",
                new + relocked,
                new,
                relocked
            ),
            ws.verbosity,
        );
        if failed > 0 {
            bail!("{} files failed", failed);
        }
        Ok(())
    })
}

/// Unlock every locked file.
pub fn unlock_all(ctx: &Context) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let session = ws.session_or_register()?;

    ws.with_manifest(|shared| {
        let targets = lock_manifest(shared)?.paths_in_state(FileState::Locked);
        if targets.is_empty() {
            output::print("nothing to unlock", ws.verbosity);
            return Ok(());
        }

        let (mut unlocked, mut failed) = (0usize, 0usize);
        for rel in &targets {
            let result = {
                let mut manifest = lock_manifest(shared)?;
                unlock_file(&session, &mut manifest, rel)
            };
            match result {
                Ok(outcome) => {
                    report_outcome(rel, &outcome, ws.verbosity);
                    unlocked += 1;
                }
                Err(e) => {
                    let aborts = e.aborts_batch();
                    output::file_error(output::display_path(rel), e);
                    failed += 1;
                    if aborts {
                        break;
                    }
                }
            }
        }

        output::print(format!("unlocked {} files", unlocked), ws.verbosity);
        if failed > 0 {
            bail!("{} files failed", failed);
        }
        Ok(())
    })
}
