//! engine::transitions
//!
//! Lock, unlock and forget for a single file.
//!
//! Each function takes the session, the in-memory manifest and a relative
//! path. On success the manifest reflects the new state; on error it is
//! unchanged. The caller persists the manifest.

use std::fs;
use std::io;
use std::path::Path;

use super::placeholder::{self, render};
use super::{EngineError, Outcome, Session, Transition, Warning};
use crate::core::hash::digest_file;
use crate::core::manifest::{FileEntry, Manifest};
use crate::core::ops::{copy_atomic, symlink_atomic, write_atomic};
use crate::core::types::{FileState, RelPath};

#[cfg(any(test, feature = "fault_injection"))]
use super::engine_hooks::{self, FaultPoint};

// =============================================================================
// Lock
// =============================================================================

/// Move a file into the vault and leave a placeholder behind.
///
/// - Already locked: no-op.
/// - Unlocked: the original must be a symlink, which is replaced by the
///   placeholder. A regular file there is [`EngineError::AmbiguousState`].
/// - Unmanaged: the file is digested, copied to the primary vault tree,
///   verified, copied to the backup tree, and only then overwritten by the
///   placeholder.
///
/// Files above the size limit need `force`; files above the warning size
/// produce a [`Warning::LargeFile`].
pub fn lock_file(
    session: &Session,
    manifest: &mut Manifest,
    rel: &RelPath,
    force: bool,
) -> Result<Outcome, EngineError> {
    let abs = session.project().abs_path(rel);

    match manifest.get(rel).map(|entry| entry.state) {
        Some(FileState::Locked) => {
            tracing::debug!(path = %rel, "already locked");
            return Ok(Outcome::new(Transition::AlreadyLocked));
        }
        Some(FileState::Unlocked) => {
            relock(&abs, rel)?;
            if let Some(entry) = manifest.get_mut(rel) {
                entry.state = FileState::Locked;
            }
            return Ok(Outcome::new(Transition::Relocked));
        }
        None => {}
    }

    let meta = match fs::symlink_metadata(&abs) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(not_lockable(rel, "no such file"));
        }
        Err(e) => return Err(EngineError::io("cannot inspect", &abs)(e)),
    };
    if meta.is_dir() {
        return Err(not_lockable(rel, "is a directory"));
    }
    if meta.file_type().is_symlink() {
        return Err(not_lockable(rel, "is a symbolic link"));
    }
    if !meta.is_file() {
        return Err(not_lockable(rel, "not a regular file"));
    }
    if placeholder::has_prefix(&abs).map_err(EngineError::io("cannot read", &abs))? {
        return Err(not_lockable(rel, "is already a linkvault placeholder"));
    }

    let limits = session.limits();
    let size = meta.len();
    let mut warnings = Vec::new();
    if size > limits.size_limit && !force {
        return Err(EngineError::TooLarge {
            path: rel.clone(),
            size,
            limit: limits.size_limit,
        });
    }
    if size > limits.size_warning {
        warnings.push(Warning::LargeFile {
            path: rel.clone(),
            size,
        });
    }

    let digest = digest_file(&abs, limits.progress_threshold)
        .map_err(EngineError::io("cannot hash", &abs))?;

    // Primary copy, verified.
    let vault = session.vault();
    let primary = vault.primary_path(rel);
    create_parent(&primary)?;
    copy_atomic(&abs, &primary).map_err(EngineError::io("cannot copy to vault", &primary))?;

    #[cfg(any(test, feature = "fault_injection"))]
    if engine_hooks::fires(FaultPoint::CorruptPrimary) {
        let mut bytes = fs::read(&primary).map_err(EngineError::io("cannot read", &primary))?;
        match bytes.first_mut() {
            Some(byte) => *byte ^= 0xff,
            None => bytes.push(0),
        }
        fs::write(&primary, bytes).map_err(EngineError::io("cannot write", &primary))?;
    }

    let actual = match digest_file(&primary, limits.progress_threshold) {
        Ok(actual) => actual,
        Err(e) => {
            discard(&primary);
            return Err(EngineError::io("cannot verify vault copy", &primary)(e));
        }
    };
    if actual != digest {
        discard(&primary);
        return Err(EngineError::Integrity {
            path: rel.clone(),
            expected: digest,
            actual,
        });
    }
    tracing::debug!(path = %rel, digest = %digest, "vault copy verified");

    // Backup copy. Last reversible step.
    let backup = vault.backup_path(rel);
    if let Err(e) = copy_backup(&primary, &backup) {
        discard(&primary);
        return Err(e);
    }

    // Point of no return.
    write_atomic(&abs, render(rel).as_bytes())
        .map_err(EngineError::io("cannot write placeholder", &abs))?;

    manifest.insert(rel.clone(), FileEntry::locked(digest));
    tracing::debug!(path = %rel, "locked");
    Ok(Outcome::with_warnings(Transition::Locked, warnings))
}

fn relock(abs: &Path, rel: &RelPath) -> Result<(), EngineError> {
    let meta = fs::symlink_metadata(abs).map_err(EngineError::io("cannot inspect", abs))?;
    if !meta.file_type().is_symlink() {
        return Err(EngineError::AmbiguousState(rel.clone()));
    }
    write_atomic(abs, render(rel).as_bytes())
        .map_err(EngineError::io("cannot write placeholder", abs))?;
    tracing::debug!(path = %rel, "re-locked");
    Ok(())
}

fn copy_backup(primary: &Path, backup: &Path) -> Result<(), EngineError> {
    create_parent(backup)?;

    #[cfg(any(test, feature = "fault_injection"))]
    if engine_hooks::fires(FaultPoint::BackupCopy) {
        return Err(EngineError::io("cannot copy to backup", backup)(io::Error::other(
            "simulated backup failure",
        )));
    }

    copy_atomic(primary, backup).map_err(EngineError::io("cannot copy to backup", backup))?;
    Ok(())
}

// =============================================================================
// Unlock
// =============================================================================

/// Replace a placeholder with a symlink to the vault copy.
///
/// Requires symlink support. A digest mismatch of the vault copy is a
/// [`Warning::VaultHashMismatch`], not an error: the vault copy is what the
/// link exposes either way.
pub fn unlock_file(
    session: &Session,
    manifest: &mut Manifest,
    rel: &RelPath,
) -> Result<Outcome, EngineError> {
    session.symlinks().ensure()?;

    let entry = match manifest.get(rel) {
        Some(entry) if entry.state == FileState::Unlocked => {
            tracing::debug!(path = %rel, "already unlocked");
            return Ok(Outcome::new(Transition::AlreadyUnlocked));
        }
        Some(entry) => entry,
        None => return Err(EngineError::NotManaged(rel.clone())),
    };

    let primary = session.vault().primary_path(rel);
    require_vault_copy(&primary, rel)?;

    let mut warnings = Vec::new();
    let actual = digest_file(&primary, session.limits().progress_threshold)
        .map_err(EngineError::io("cannot verify vault copy", &primary))?;
    if actual != entry.hash {
        tracing::debug!(path = %rel, expected = %entry.hash, actual = %actual, "vault copy changed");
        warnings.push(Warning::VaultHashMismatch { path: rel.clone() });
    }

    let abs = session.project().abs_path(rel);
    check_occupant(&abs, rel)?;
    create_parent(&abs)?;
    symlink_atomic(&primary, &abs).map_err(EngineError::io("cannot create symlink", &abs))?;

    if let Some(entry) = manifest.get_mut(rel) {
        entry.state = FileState::Unlocked;
    }
    tracing::debug!(path = %rel, target = %primary.display(), "unlocked");
    Ok(Outcome::with_warnings(Transition::Unlocked, warnings))
}

// =============================================================================
// Forget
// =============================================================================

/// Restore the original content and stop managing the file.
///
/// The vault copy is checked before the original path is touched, and the
/// restore replaces the placeholder or link in a single rename, so a failure
/// never leaves the file missing from both places.
pub fn forget_file(
    session: &Session,
    manifest: &mut Manifest,
    rel: &RelPath,
) -> Result<Outcome, EngineError> {
    let entry = manifest
        .get(rel)
        .ok_or_else(|| EngineError::NotManaged(rel.clone()))?;

    let abs = session.project().abs_path(rel);
    check_occupant(&abs, rel)?;

    let vault = session.vault();
    let primary = vault.primary_path(rel);
    require_vault_copy(&primary, rel)?;

    let mut warnings = Vec::new();
    let actual = digest_file(&primary, session.limits().progress_threshold)
        .map_err(|_| EngineError::VaultMissing(rel.clone()))?;
    if actual != entry.hash {
        warnings.push(Warning::VaultHashMismatch { path: rel.clone() });
    }

    create_parent(&abs)?;
    copy_atomic(&primary, &abs).map_err(EngineError::io("cannot restore", &abs))?;

    remove_and_prune(&primary, vault.primary_dir());
    remove_and_prune(&vault.backup_path(rel), vault.backup_dir());

    manifest.remove(rel);
    tracing::debug!(path = %rel, "forgotten");
    Ok(Outcome::with_warnings(Transition::Forgotten, warnings))
}

// =============================================================================
// Helpers
// =============================================================================

fn not_lockable(rel: &RelPath, reason: &str) -> EngineError {
    EngineError::NotLockable {
        path: rel.clone(),
        reason: reason.to_string(),
    }
}

/// Refuse unless the original path is empty, a link, or the exact placeholder.
fn check_occupant(abs: &Path, rel: &RelPath) -> Result<(), EngineError> {
    let meta = match fs::symlink_metadata(abs) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(EngineError::io("cannot inspect", abs)(e)),
    };

    if meta.is_dir() {
        return Err(not_lockable(rel, "a directory occupies the original path"));
    }
    if meta.is_file()
        && !placeholder::is_placeholder(abs, rel).map_err(EngineError::io("cannot read", abs))?
    {
        return Err(EngineError::TamperedPlaceholder(rel.clone()));
    }
    Ok(())
}

fn require_vault_copy(primary: &Path, rel: &RelPath) -> Result<(), EngineError> {
    match fs::metadata(primary) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(EngineError::VaultMissing(rel.clone())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(EngineError::VaultMissing(rel.clone()))
        }
        Err(e) => Err(EngineError::io("cannot inspect", primary)(e)),
    }
}

fn create_parent(path: &Path) -> Result<(), EngineError> {
    match path.parent() {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(EngineError::io("cannot create directory", parent))
        }
        None => Ok(()),
    }
}

/// Remove a partially created vault copy. Best-effort.
fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        tracing::warn!(path = %path.display(), error = %e, "could not remove vault copy");
    }
}

/// Delete `file` and then each empty parent up to, not including, `root`.
fn remove_and_prune(file: &Path, root: &Path) {
    if let Err(e) = fs::remove_file(file) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %file.display(), error = %e, "could not remove vault copy");
        }
    }

    let mut dir = file.parent();
    while let Some(current) = dir {
        if current == root || !current.starts_with(root) {
            break;
        }
        // Fails (and stops) once a directory is not empty.
        if fs::remove_dir(current).is_err() {
            break;
        }
        dir = current.parent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::paths::HomePaths;
    use crate::core::project::Project;
    use crate::core::registry::RegistryStore;
    use crate::engine::capabilities::SymlinkSupport;
    use crate::engine::Limits;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        session: Session,
        manifest: Manifest,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("project");
        fs::create_dir_all(&root).unwrap();
        let project = Project::at(&root);
        let manifest = project.manifest_store().init().unwrap();
        let vault = RegistryStore::new(HomePaths::new(temp.path().join("home")))
            .register(project.root())
            .unwrap();
        let session = Session::new(project, vault, Limits::default());
        Fixture {
            _temp: temp,
            session,
            manifest,
        }
    }

    fn rel(s: &str) -> RelPath {
        RelPath::new(s).unwrap()
    }

    impl Fixture {
        fn write(&self, path: &str, contents: &[u8]) {
            let abs = self.session.project().abs_path(&rel(path));
            fs::create_dir_all(abs.parent().unwrap()).unwrap();
            fs::write(abs, contents).unwrap();
        }

        fn abs(&self, path: &str) -> std::path::PathBuf {
            self.session.project().abs_path(&rel(path))
        }

        fn lock(&mut self, path: &str) -> Result<Outcome, EngineError> {
            lock_file(&self.session, &mut self.manifest, &rel(path), false)
        }

        fn unlock(&mut self, path: &str) -> Result<Outcome, EngineError> {
            unlock_file(&self.session, &mut self.manifest, &rel(path))
        }

        fn forget(&mut self, path: &str) -> Result<Outcome, EngineError> {
            forget_file(&self.session, &mut self.manifest, &rel(path))
        }
    }

    mod lock {
        use super::*;

        #[test]
        fn first_lock_moves_content_to_vault() {
            let mut fx = fixture();
            fx.write("a/secret.txt", b"hello");

            let outcome = fx.lock("a/secret.txt").unwrap();

            assert_eq!(outcome.transition, Transition::Locked);
            assert!(outcome.warnings.is_empty());
            let entry = fx.manifest.get(&rel("a/secret.txt")).unwrap();
            assert_eq!(entry.state, FileState::Locked);

            let vault = fx.session.vault();
            assert_eq!(fs::read(vault.primary_path(&rel("a/secret.txt"))).unwrap(), b"hello");
            assert_eq!(fs::read(vault.backup_path(&rel("a/secret.txt"))).unwrap(), b"hello");
            assert_eq!(
                fs::read_to_string(fx.abs("a/secret.txt")).unwrap(),
                render(&rel("a/secret.txt"))
            );
        }

        #[test]
        fn lock_twice_is_noop() {
            let mut fx = fixture();
            fx.write("k.env", b"KEY=1");
            fx.lock("k.env").unwrap();
            let before = fx.manifest.clone();
            let placeholder = fs::read(fx.abs("k.env")).unwrap();

            let outcome = fx.lock("k.env").unwrap();

            assert_eq!(outcome.transition, Transition::AlreadyLocked);
            assert_eq!(fx.manifest, before);
            assert_eq!(fs::read(fx.abs("k.env")).unwrap(), placeholder);
        }

        #[test]
        fn zero_byte_file() {
            let mut fx = fixture();
            fx.write("empty", b"");

            fx.lock("empty").unwrap();

            let primary = fx.session.vault().primary_path(&rel("empty"));
            assert_eq!(fs::read(primary).unwrap(), b"");
        }

        #[test]
        fn missing_file_not_lockable() {
            let mut fx = fixture();
            assert!(matches!(
                fx.lock("nope.txt"),
                Err(EngineError::NotLockable { .. })
            ));
            assert!(fx.manifest.is_empty());
        }

        #[test]
        fn directory_not_lockable() {
            let mut fx = fixture();
            fs::create_dir_all(fx.abs("dir")).unwrap();
            assert!(matches!(fx.lock("dir"), Err(EngineError::NotLockable { .. })));
            assert!(fx.abs("dir").is_dir());
        }

        #[cfg(unix)]
        #[test]
        fn symlink_not_lockable() {
            let mut fx = fixture();
            fx.write("real", b"x");
            std::os::unix::fs::symlink(fx.abs("real"), fx.abs("link")).unwrap();

            assert!(matches!(fx.lock("link"), Err(EngineError::NotLockable { .. })));
        }

        #[test]
        fn placeholder_text_not_lockable() {
            let mut fx = fixture();
            fx.write("copy.txt", render(&rel("other.txt")).as_bytes());

            assert!(matches!(
                fx.lock("copy.txt"),
                Err(EngineError::NotLockable { .. })
            ));
        }

        #[test]
        fn size_policy() {
            let mut fx = fixture();
            fx.session.limits = Limits {
                size_warning: 4,
                size_limit: 8,
                progress_threshold: 0,
            };
            fx.write("medium", b"123456");
            fx.write("large", b"1234567890");

            let outcome = fx.lock("medium").unwrap();
            assert_eq!(
                outcome.warnings,
                vec![Warning::LargeFile {
                    path: rel("medium"),
                    size: 6
                }]
            );

            assert!(matches!(fx.lock("large"), Err(EngineError::TooLarge { .. })));
            assert_eq!(fs::read(fx.abs("large")).unwrap(), b"1234567890");

            let forced = lock_file(&fx.session, &mut fx.manifest, &rel("large"), true).unwrap();
            assert_eq!(forced.transition, Transition::Locked);
        }

        #[test]
        fn integrity_failure_leaves_original_and_vault_clean() {
            let mut fx = fixture();
            fx.write("s.txt", b"secret");
            engine_hooks::arm(FaultPoint::CorruptPrimary);

            let result = fx.lock("s.txt");
            engine_hooks::reset();

            assert!(matches!(result, Err(EngineError::Integrity { .. })));
            assert_eq!(fs::read(fx.abs("s.txt")).unwrap(), b"secret");
            assert!(!fx.session.vault().primary_path(&rel("s.txt")).exists());
            assert!(fx.manifest.is_empty());
        }

        #[test]
        fn backup_failure_removes_primary() {
            let mut fx = fixture();
            fx.write("s.txt", b"secret");
            engine_hooks::arm(FaultPoint::BackupCopy);

            let result = fx.lock("s.txt");
            engine_hooks::reset();

            assert!(matches!(result, Err(EngineError::Io { .. })));
            assert_eq!(fs::read(fx.abs("s.txt")).unwrap(), b"secret");
            assert!(!fx.session.vault().primary_path(&rel("s.txt")).exists());
            assert!(!fx.session.vault().backup_path(&rel("s.txt")).exists());
            assert!(fx.manifest.is_empty());
        }

        #[cfg(unix)]
        #[test]
        fn relock_replaces_link_with_placeholder() {
            let mut fx = fixture();
            fx.write("s.txt", b"secret");
            fx.lock("s.txt").unwrap();
            fx.unlock("s.txt").unwrap();

            let outcome = fx.lock("s.txt").unwrap();

            assert_eq!(outcome.transition, Transition::Relocked);
            let meta = fs::symlink_metadata(fx.abs("s.txt")).unwrap();
            assert!(meta.is_file());
            assert!(placeholder::is_placeholder(&fx.abs("s.txt"), &rel("s.txt")).unwrap());
            assert_eq!(
                fx.manifest.get(&rel("s.txt")).unwrap().state,
                FileState::Locked
            );
        }

        #[cfg(unix)]
        #[test]
        fn relock_over_regular_file_is_ambiguous() {
            let mut fx = fixture();
            fx.write("s.txt", b"secret");
            fx.lock("s.txt").unwrap();
            fx.unlock("s.txt").unwrap();
            fs::remove_file(fx.abs("s.txt")).unwrap();
            fx.write("s.txt", b"user edits");

            assert!(matches!(
                fx.lock("s.txt"),
                Err(EngineError::AmbiguousState(_))
            ));
            assert_eq!(fs::read(fx.abs("s.txt")).unwrap(), b"user edits");
            assert_eq!(
                fx.manifest.get(&rel("s.txt")).unwrap().state,
                FileState::Unlocked
            );
        }
    }

    #[cfg(unix)]
    mod unlock {
        use super::*;

        #[test]
        fn unlock_links_to_vault() {
            let mut fx = fixture();
            fx.write("a/secret.txt", b"hello");
            fx.lock("a/secret.txt").unwrap();

            let outcome = fx.unlock("a/secret.txt").unwrap();

            assert_eq!(outcome.transition, Transition::Unlocked);
            assert!(outcome.warnings.is_empty());
            let abs = fx.abs("a/secret.txt");
            assert!(fs::symlink_metadata(&abs).unwrap().file_type().is_symlink());
            assert_eq!(
                fs::read_link(&abs).unwrap(),
                fx.session.vault().primary_path(&rel("a/secret.txt"))
            );
            assert_eq!(fs::read(&abs).unwrap(), b"hello");
        }

        #[test]
        fn unlock_twice_is_noop() {
            let mut fx = fixture();
            fx.write("s", b"x");
            fx.lock("s").unwrap();
            fx.unlock("s").unwrap();
            let before = fx.manifest.clone();

            assert_eq!(
                fx.unlock("s").unwrap().transition,
                Transition::AlreadyUnlocked
            );
            assert_eq!(fx.manifest, before);
        }

        #[test]
        fn unmanaged_is_not_managed() {
            let mut fx = fixture();
            assert!(matches!(fx.unlock("s"), Err(EngineError::NotManaged(_))));
        }

        #[test]
        fn vault_missing() {
            let mut fx = fixture();
            fx.write("s", b"x");
            fx.lock("s").unwrap();
            fs::remove_file(fx.session.vault().primary_path(&rel("s"))).unwrap();

            assert!(matches!(fx.unlock("s"), Err(EngineError::VaultMissing(_))));
            assert!(placeholder::is_placeholder(&fx.abs("s"), &rel("s")).unwrap());
        }

        #[test]
        fn changed_vault_copy_is_a_warning() {
            let mut fx = fixture();
            fx.write("s", b"x");
            fx.lock("s").unwrap();
            fs::write(fx.session.vault().primary_path(&rel("s")), b"y").unwrap();

            let outcome = fx.unlock("s").unwrap();

            assert_eq!(outcome.transition, Transition::Unlocked);
            assert_eq!(
                outcome.warnings,
                vec![Warning::VaultHashMismatch { path: rel("s") }]
            );
            assert_eq!(fs::read(fx.abs("s")).unwrap(), b"y");
        }

        #[test]
        fn tampered_placeholder_is_refused() {
            let mut fx = fixture();
            fx.write("s", b"x");
            fx.lock("s").unwrap();
            let tampered = format!("{}appended", render(&rel("s")));
            fs::write(fx.abs("s"), &tampered).unwrap();

            assert!(matches!(
                fx.unlock("s"),
                Err(EngineError::TamperedPlaceholder(_))
            ));
            assert_eq!(fs::read_to_string(fx.abs("s")).unwrap(), tampered);
            assert_eq!(fx.manifest.get(&rel("s")).unwrap().state, FileState::Locked);
        }

        #[test]
        fn directory_is_refused() {
            let mut fx = fixture();
            fx.write("s", b"x");
            fx.lock("s").unwrap();
            fs::remove_file(fx.abs("s")).unwrap();
            fs::create_dir(fx.abs("s")).unwrap();
            fs::write(fx.abs("s").join("inner"), b"keep").unwrap();

            assert!(matches!(fx.unlock("s"), Err(EngineError::NotLockable { .. })));
            assert_eq!(fs::read(fx.abs("s").join("inner")).unwrap(), b"keep");
        }

        #[test]
        fn missing_placeholder_is_recreated_as_link() {
            let mut fx = fixture();
            fx.write("deep/s", b"x");
            fx.lock("deep/s").unwrap();
            fs::remove_dir_all(fx.abs("deep")).unwrap();

            fx.unlock("deep/s").unwrap();

            assert_eq!(fs::read(fx.abs("deep/s")).unwrap(), b"x");
        }

        #[test]
        fn unsupported_platform() {
            let fx = fixture();
            let Fixture {
                _temp,
                session,
                mut manifest,
            } = fx;
            let session = session.with_symlink_support(SymlinkSupport::fixed(false));

            let err = unlock_file(&session, &mut manifest, &rel("anything")).unwrap_err();
            assert!(err.aborts_batch());
        }
    }

    mod forget {
        use super::*;

        #[test]
        fn forget_locked_restores_content() {
            let mut fx = fixture();
            fx.write("a/b/secret.txt", b"hello");
            fx.lock("a/b/secret.txt").unwrap();

            let outcome = fx.forget("a/b/secret.txt").unwrap();

            assert_eq!(outcome.transition, Transition::Forgotten);
            assert!(!fx.manifest.contains(&rel("a/b/secret.txt")));
            assert_eq!(fs::read(fx.abs("a/b/secret.txt")).unwrap(), b"hello");

            let vault = fx.session.vault();
            assert!(!vault.primary_path(&rel("a/b/secret.txt")).exists());
            assert!(!vault.backup_path(&rel("a/b/secret.txt")).exists());
            // Empty parents pruned, roots kept.
            assert!(!vault.primary_dir().join("a").exists());
            assert!(!vault.backup_dir().join("a").exists());
            assert!(vault.primary_dir().is_dir());
            assert!(vault.backup_dir().is_dir());
        }

        #[test]
        fn prune_keeps_non_empty_parents() {
            let mut fx = fixture();
            fx.write("a/one", b"1");
            fx.write("a/two", b"2");
            fx.lock("a/one").unwrap();
            fx.lock("a/two").unwrap();

            fx.forget("a/one").unwrap();

            assert!(fx.session.vault().primary_path(&rel("a/two")).exists());
        }

        #[cfg(unix)]
        #[test]
        fn forget_unlocked_replaces_link_with_file() {
            let mut fx = fixture();
            fx.write("s", b"hello");
            fx.lock("s").unwrap();
            fx.unlock("s").unwrap();

            fx.forget("s").unwrap();

            let meta = fs::symlink_metadata(fx.abs("s")).unwrap();
            assert!(meta.is_file());
            assert_eq!(fs::read(fx.abs("s")).unwrap(), b"hello");
        }

        #[test]
        fn tampered_placeholder_is_refused() {
            let mut fx = fixture();
            fx.write("s", b"x");
            fx.lock("s").unwrap();
            fs::write(fx.abs("s"), b"my own notes").unwrap();

            assert!(matches!(
                fx.forget("s"),
                Err(EngineError::TamperedPlaceholder(_))
            ));
            assert_eq!(fs::read(fx.abs("s")).unwrap(), b"my own notes");
            assert!(fx.session.vault().primary_path(&rel("s")).exists());
            assert!(fx.manifest.contains(&rel("s")));
        }

        #[test]
        fn directory_is_refused() {
            let mut fx = fixture();
            fx.write("s", b"x");
            fx.lock("s").unwrap();
            fs::remove_file(fx.abs("s")).unwrap();
            fs::create_dir(fx.abs("s")).unwrap();

            assert!(matches!(fx.forget("s"), Err(EngineError::NotLockable { .. })));
            assert!(fx.abs("s").is_dir());
        }

        #[test]
        fn missing_vault_copy_keeps_placeholder() {
            let mut fx = fixture();
            fx.write("s", b"x");
            fx.lock("s").unwrap();
            fs::remove_file(fx.session.vault().primary_path(&rel("s"))).unwrap();

            assert!(matches!(fx.forget("s"), Err(EngineError::VaultMissing(_))));
            assert!(placeholder::is_placeholder(&fx.abs("s"), &rel("s")).unwrap());
            assert!(fx.manifest.contains(&rel("s")));
        }

        #[test]
        fn unmanaged_is_not_managed() {
            let mut fx = fixture();
            fx.write("s", b"x");
            assert!(matches!(fx.forget("s"), Err(EngineError::NotManaged(_))));
            assert_eq!(fs::read(fx.abs("s")).unwrap(), b"x");
        }
    }
}
