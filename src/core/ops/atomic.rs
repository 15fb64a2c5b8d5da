//! core::ops::atomic
//!
//! Crash-safe file replacement.
//!
//! Every durable write in linkvault (manifest, registry, config, placeholder,
//! restored file) goes through this module. Content is written to a sibling
//! temporary file, flushed with `sync_all`, and renamed over the target. The
//! rename is the only visible mutation of the target path: a crash before it
//! leaves the previous version, a crash after it leaves the new one.
//!
//! Symbolic links are placed the same way: the link is created under a
//! temporary name and renamed over the target, so the target path always
//! holds either the old entry or the new link.
//!
//! Temporary names carry a random suffix so two writers targeting the same
//! file (for example a signal handler and the main thread) never share a
//! temporary file. The last rename wins.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Atomically replace `path` with `contents`.
///
/// The parent directory must exist. If `path` is a symbolic link, the link
/// itself is replaced, not its target.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let temp_path = temp_path_for(path)?;

    let result = (|| {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    finish(result, &temp_path, path)
}

/// Atomically replace `dst` with a copy of `src`.
///
/// Permissions of `src` are carried over (as with [`std::fs::copy`]).
/// Returns the number of bytes copied.
pub fn copy_atomic(src: &Path, dst: &Path) -> io::Result<u64> {
    let temp_path = temp_path_for(dst)?;

    let result = (|| {
        let bytes = fs::copy(src, &temp_path)?;
        File::open(&temp_path)?.sync_all()?;
        fs::rename(&temp_path, dst)?;
        Ok(bytes)
    })();

    finish(result, &temp_path, dst)
}

/// Create a symbolic link at `link` pointing to the file `target`.
pub fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)
    }
    #[cfg(windows)]
    {
        std::os::windows::fs::symlink_file(target, link)
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = (target, link);
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "symbolic links are not available on this platform",
        ))
    }
}

/// Atomically replace `link` with a symbolic link to `target`.
///
/// Whatever `link` held before (a file or another link) is replaced by the
/// rename. `link` must not be a directory.
pub fn symlink_atomic(target: &Path, link: &Path) -> io::Result<()> {
    let temp_path = temp_path_for(link)?;

    let result = (|| {
        create_symlink(target, &temp_path)?;
        fs::rename(&temp_path, link)
    })();

    finish(result, &temp_path, link)
}

fn temp_path_for(path: &Path) -> io::Result<PathBuf> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no parent directory", path.display()),
        )
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(parent.join(format!(".{}.{}.tmp", name, Uuid::new_v4().simple())))
}

fn finish<T>(result: io::Result<T>, temp_path: &Path, target: &Path) -> io::Result<T> {
    match result {
        Ok(value) => {
            sync_parent(target);
            Ok(value)
        }
        Err(e) => {
            let _ = fs::remove_file(temp_path);
            Err(e)
        }
    }
}

/// Flush the directory entry for the rename. Best-effort.
#[cfg(unix)]
fn sync_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) {}
