//! Save the manifest when a batch is interrupted.
//!
//! SIGINT and SIGTERM are caught on a helper thread. The thread waits for
//! the manifest mutex, which the batch loop holds for exactly one file, so
//! the file in progress finishes first. It then saves and exits with 130.

use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::core::manifest::{Manifest, ManifestStore};

#[cfg(unix)]
use anyhow::Context as _;
#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Exit code after an interrupt.
pub(crate) const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Keeps the interrupt handler installed until dropped.
pub(crate) struct ManifestSaveGuard {
    #[cfg(unix)]
    handle: signal_hook::iterator::Handle,
    #[cfg(unix)]
    thread: Option<std::thread::JoinHandle<()>>,
}

impl ManifestSaveGuard {
    #[cfg(unix)]
    pub(crate) fn install(store: ManifestStore, manifest: Arc<Mutex<Manifest>>) -> Result<Self> {
        let mut signals =
            Signals::new([SIGINT, SIGTERM]).context("failed to register signal handlers")?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            if signals.forever().next().is_some() {
                eprintln!("\ninterrupted, saving manifest...");
                save_and_exit(&store, &manifest);
            }
        });

        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }

    #[cfg(not(unix))]
    pub(crate) fn install(_store: ManifestStore, _manifest: Arc<Mutex<Manifest>>) -> Result<Self> {
        Ok(Self {})
    }
}

#[cfg(unix)]
fn save_and_exit(store: &ManifestStore, manifest: &Mutex<Manifest>) -> ! {
    let saved = match manifest.lock() {
        Ok(manifest) => store.save(&manifest),
        Err(poisoned) => store.save(&poisoned.into_inner()),
    };
    if let Err(e) = saved {
        eprintln!("error: failed to save manifest: {}", e);
    }
    std::process::exit(INTERRUPTED_EXIT_CODE);
}

impl Drop for ManifestSaveGuard {
    #[cfg(unix)]
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    #[cfg(not(unix))]
    fn drop(&mut self) {}
}
