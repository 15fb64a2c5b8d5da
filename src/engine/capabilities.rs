//! engine::capabilities
//!
//! Platform capability probing.
//!
//! # Architecture
//!
//! Unlocking needs symbolic links. Whether they work depends on the
//! platform and the file system (Windows without Developer Mode, some
//! network mounts), so support is probed by actually creating a link.
//!
//! The result is cached in a [`SymlinkSupport`] owned by the session rather
//! than in a process global, so two sessions in one process never share a
//! verdict. [`SymlinkSupport::reset`] forgets the cached result.
//!
//! # Example
//!
//! ```
//! use linkvault::engine::capabilities::SymlinkSupport;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let support = SymlinkSupport::new(dir.path().to_path_buf());
//! assert_eq!(support.cached(), None);
//!
//! let verdict = support.ensure();
//! assert_eq!(support.cached(), Some(verdict.is_ok()));
//! ```

use std::cell::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};

use super::EngineError;
use crate::core::ops::atomic::create_symlink;

const PROBE_TARGET: &str = ".linkvault-symlink-test-target";
const PROBE_LINK: &str = ".linkvault-symlink-test-link";

const WINDOWS_HINT: &str =
    "On Windows, enable Developer Mode: Settings > Update & Security > For Developers";

/// Check whether symbolic links can be created in `dir`.
///
/// Creates a small target file and a link to it, then removes both.
pub fn probe_symlink_support(dir: &Path) -> Result<(), String> {
    let target = dir.join(PROBE_TARGET);
    let link = dir.join(PROBE_LINK);

    // Leftovers from an interrupted probe.
    let _ = fs::remove_file(&link);
    let _ = fs::remove_file(&target);

    fs::write(&target, b"test").map_err(|e| format!("creating test file: {}", e))?;
    let result = create_symlink(&target, &link);

    let _ = fs::remove_file(&link);
    let _ = fs::remove_file(&target);

    result.map_err(|e| format!("symlinks not supported: {}. {}", e, WINDOWS_HINT))
}

/// Cached symbolic-link capability for one session.
#[derive(Debug)]
pub struct SymlinkSupport {
    probe_dir: PathBuf,
    verdict: OnceCell<Result<(), String>>,
}

impl SymlinkSupport {
    /// Probe lazily inside `probe_dir` (normally the project's `.linkvault/`).
    pub fn new(probe_dir: PathBuf) -> Self {
        Self {
            probe_dir,
            verdict: OnceCell::new(),
        }
    }

    /// A capability with a fixed verdict, for tests.
    pub fn fixed(supported: bool) -> Self {
        let verdict = OnceCell::new();
        let _ = verdict.set(if supported {
            Ok(())
        } else {
            Err(format!("symlinks not supported. {}", WINDOWS_HINT))
        });
        Self {
            probe_dir: PathBuf::new(),
            verdict,
        }
    }

    /// Require symlink support, probing on first use.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnsupportedPlatform`] if links cannot be created.
    pub fn ensure(&self) -> Result<(), EngineError> {
        self.verdict
            .get_or_init(|| {
                let verdict = probe_symlink_support(&self.probe_dir);
                tracing::debug!(dir = %self.probe_dir.display(), ok = verdict.is_ok(), "symlink probe");
                verdict
            })
            .clone()
            .map_err(EngineError::UnsupportedPlatform)
    }

    /// The cached verdict, if a probe has run.
    pub fn cached(&self) -> Option<bool> {
        self.verdict.get().map(Result::is_ok)
    }

    /// Forget the cached verdict so the next [`ensure`](Self::ensure) probes again.
    pub fn reset(&mut self) {
        self.verdict.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    #[test]
    fn probe_succeeds_and_cleans_up() {
        let temp = TempDir::new().unwrap();

        probe_symlink_support(temp.path()).unwrap();

        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn probe_in_missing_dir_fails() {
        let temp = TempDir::new().unwrap();
        let err = probe_symlink_support(&temp.path().join("missing")).unwrap_err();
        assert!(err.contains("creating test file"));
    }

    #[cfg(unix)]
    #[test]
    fn verdict_is_cached_until_reset() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("meta");
        fs::create_dir(&dir).unwrap();
        let mut support = SymlinkSupport::new(dir.clone());

        assert_eq!(support.cached(), None);
        support.ensure().unwrap();
        assert_eq!(support.cached(), Some(true));

        // Removing the directory does not change the cached verdict.
        fs::remove_dir(&dir).unwrap();
        assert!(support.ensure().is_ok());

        support.reset();
        assert_eq!(support.cached(), None);
        assert!(matches!(
            support.ensure(),
            Err(EngineError::UnsupportedPlatform(_))
        ));
    }

    #[test]
    fn fixed_unsupported() {
        let support = SymlinkSupport::fixed(false);
        let err = support.ensure().unwrap_err();
        assert!(err.to_string().contains("Developer Mode"));
    }

    #[test]
    fn sessions_do_not_share_verdicts() {
        let a = SymlinkSupport::fixed(false);
        let b = SymlinkSupport::new(PathBuf::from("/nonexistent"));
        assert!(a.ensure().is_err());
        assert_eq!(b.cached(), None);
    }
}
