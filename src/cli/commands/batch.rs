//! Per-file batch loop shared by lock, unlock and forget.

use std::fmt::Display;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};

use super::{lock_manifest, Workspace};
use crate::core::manifest::Manifest;
use crate::core::types::RelPath;
use crate::engine::{EngineError, Outcome, Session, Transition};
use crate::ui::output::{self, Verbosity};

/// Tally of a batch, printed as `"<s> of <n> files <verb>, <f> failed"`.
#[derive(Debug)]
pub(crate) struct BatchReport {
    verb: &'static str,
    total: usize,
    succeeded: usize,
    failed: usize,
}

impl BatchReport {
    pub fn new(verb: &'static str, total: usize) -> Self {
        Self {
            verb,
            total,
            succeeded: 0,
            failed: 0,
        }
    }

    pub fn success(&mut self) {
        self.succeeded += 1;
    }

    /// Record and print one failed file.
    pub fn failure(&mut self, path: impl Display, err: impl Display) {
        output::file_error(path, err);
        self.failed += 1;
    }

    pub fn summary(&self) -> String {
        format!(
            "{} of {} files {}, {} failed",
            self.succeeded, self.total, self.verb, self.failed
        )
    }

    /// Fail with the summary if anything failed.
    pub fn finish(self) -> Result<()> {
        if self.failed > 0 {
            bail!("{}", self.summary());
        }
        Ok(())
    }
}

/// Print the per-file line and any warnings for a successful transition.
pub(crate) fn report_outcome(rel: &RelPath, outcome: &Outcome, verbosity: Verbosity) {
    for warning in &outcome.warnings {
        output::warn(warning, verbosity);
    }
    match outcome.transition {
        Transition::Locked | Transition::Relocked => output::file_done("locked", rel, verbosity),
        Transition::AlreadyLocked => output::file_done("already locked", rel, verbosity),
        Transition::Unlocked => output::file_done("unlocked", rel, verbosity),
        Transition::AlreadyUnlocked => output::file_done("already unlocked", rel, verbosity),
        Transition::Forgotten => output::print(
            format!(
                "forgot: {} (restored to original location)",
                output::display_path(rel)
            ),
            verbosity,
        ),
    }
}

/// Apply `op` to each command-line path, one file at a time.
///
/// Paths that do not resolve inside the project fail individually. An error
/// that aborts the batch stops the loop; the remaining paths are neither
/// attempted nor counted as failed.
pub(crate) fn run_paths<F>(
    ws: &Workspace,
    session: &Session,
    manifest: &Arc<Mutex<Manifest>>,
    paths: &[PathBuf],
    verb: &'static str,
    mut op: F,
) -> Result<BatchReport>
where
    F: FnMut(&Session, &mut Manifest, &RelPath) -> Result<Outcome, EngineError>,
{
    let mut report = BatchReport::new(verb, paths.len());

    for (index, arg) in paths.iter().enumerate() {
        let rel = match ws.project.rel_path(arg, &ws.cwd) {
            Ok(rel) => rel,
            Err(e) => {
                report.failure(arg.display(), e);
                continue;
            }
        };

        let result = {
            let mut manifest = lock_manifest(manifest)?;
            op(session, &mut manifest, &rel)
        };

        match result {
            Ok(outcome) => {
                report_outcome(&rel, &outcome, ws.verbosity);
                report.success();
            }
            Err(e) => {
                let aborts = e.aborts_batch();
                report.failure(output::display_path(&rel), e);
                if aborts {
                    let skipped = paths.len() - index - 1;
                    if skipped > 0 {
                        output::warn(format!("skipped {} remaining files", skipped), ws.verbosity);
                    }
                    break;
                }
            }
        }
    }

    Ok(report)
}
