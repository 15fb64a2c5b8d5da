//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each mutating handler follows the same sequence:
//! 1. Resolve the project from the working directory
//! 2. Resolve (or register) its vault
//! 3. Acquire the manifest lock and load the manifest
//! 4. Run the engine once per file, reporting each result
//! 5. Save the manifest, whatever happened to individual files
//! 6. Release the lock and fail if any file failed
//!
//! Steps 3 and 5 live in [`Workspace::with_manifest`]; an interrupt between
//! them still saves (see [`signal`]). Read-only handlers skip the lock.

mod batch;
mod bulk;
mod completion;
mod config_cmd;
mod forget;
mod init;
mod list;
mod lock;
mod signal;
mod status;
mod unlock;

// Re-export command functions for testing and direct invocation
pub use bulk::{lock_all, unlock_all};
pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, set as config_set};
pub use forget::forget;
pub use init::init;
pub use list::list;
pub use lock::lock;
pub use status::status;
pub use unlock::unlock;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Context as _, Result};

use crate::cli::args::{Command, ConfigAction};
use crate::core::config::Config;
use crate::core::manifest::{Manifest, ManifestStore};
use crate::core::paths::{absolutize, normalize_path, HomePaths};
use crate::core::project::Project;
use crate::core::registry::{RegistryError, RegistryStore};
use crate::engine::{Context, Limits, Session};
use crate::ui::output::{self, Verbosity};

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Init => init(ctx),
        Command::Lock { paths, force } => lock(ctx, &paths, force),
        Command::Unlock { paths } => unlock(ctx, &paths),
        Command::Forget { paths } => forget(ctx, &paths),
        Command::Status => status(ctx),
        Command::List => list(ctx),
        Command::LockAll { dry_run, force } => lock_all(ctx, dry_run, force),
        Command::UnlockAll => unlock_all(ctx),
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_get(ctx, &key),
            ConfigAction::Set { key, value } => config_set(ctx, &key, &value),
            ConfigAction::List => config_list(ctx),
        },
        Command::Completion { shell } => completion(shell),
    }
}

/// The effective working directory: `--cwd` resolved against the process
/// directory, lexically normalized.
pub(crate) fn working_dir(ctx: &Context) -> Result<PathBuf> {
    let process_cwd = std::env::current_dir().context("Failed to determine current directory")?;
    Ok(match &ctx.cwd {
        Some(dir) => absolutize(dir, &process_cwd),
        None => normalize_path(&process_cwd),
    })
}

/// The home area, made absolute against `cwd` so vault paths (and therefore
/// symlink targets) never depend on the working directory.
pub(crate) fn home_paths(cwd: &std::path::Path) -> Result<HomePaths> {
    let home = HomePaths::from_env()
        .ok_or_else(|| anyhow!("cannot determine home directory; set LINKVAULT_HOME"))?;
    Ok(HomePaths::new(absolutize(&home.root, cwd)))
}

/// A resolved project with its configuration.
pub(crate) struct Workspace {
    pub cwd: PathBuf,
    pub project: Project,
    pub home: HomePaths,
    pub config: Config,
    pub verbosity: Verbosity,
}

impl Workspace {
    /// Find the enclosing project and load configuration.
    pub fn open(ctx: &Context) -> Result<Self> {
        let cwd = working_dir(ctx)?;
        let project = Project::find(&cwd)?;
        let home = home_paths(&cwd)?;
        let config = Config::load(Some(&home), Some(project.paths()))?;
        tracing::debug!(root = %project.root().display(), "project resolved");
        Ok(Self {
            cwd,
            project,
            home,
            config,
            verbosity: Verbosity::from_flags(ctx.quiet, ctx.debug),
        })
    }

    pub fn manifest_store(&self) -> ManifestStore {
        self.project
            .manifest_store()
            .with_lock_timeout(self.config.lock_timeout())
    }

    pub fn registry(&self) -> RegistryStore {
        RegistryStore::new(self.home.clone()).with_lock_timeout(self.config.lock_timeout())
    }

    /// A session on the project's registered vault.
    pub fn session(&self) -> Result<Session> {
        let vault = self.registry().resolve(self.project.root())?;
        Ok(self.session_for(vault))
    }

    /// Like [`Workspace::session`], but registers the project if the
    /// registry has no entry for it.
    pub fn session_or_register(&self) -> Result<Session> {
        let registry = self.registry();
        let vault = match registry.resolve(self.project.root()) {
            Ok(vault) => vault,
            Err(RegistryError::NotRegistered(root)) => {
                output::warn(
                    format!("project {} was not registered; created a new vault", root.display()),
                    self.verbosity,
                );
                registry.register(self.project.root())?
            }
            Err(e) => return Err(e.into()),
        };
        Ok(self.session_for(vault))
    }

    fn session_for(&self, vault: crate::core::registry::Vault) -> Session {
        Session::new(
            self.project.clone(),
            vault,
            Limits::from_config(&self.config),
        )
    }

    /// Run `f` with the manifest loaded under its lock, then save it.
    ///
    /// The manifest is saved even when `f` fails, so successful per-file
    /// transitions are never lost. An interrupt while `f` runs saves the
    /// manifest after the current file and exits.
    pub fn with_manifest<T>(
        &self,
        f: impl FnOnce(&Arc<Mutex<Manifest>>) -> Result<T>,
    ) -> Result<T> {
        let store = self.manifest_store();
        let _lock = store.lock()?;
        let manifest = Arc::new(Mutex::new(store.load()?));

        let guard = signal::ManifestSaveGuard::install(store.clone(), Arc::clone(&manifest))?;
        let result = f(&manifest);
        drop(guard);

        let manifest = lock_manifest(&manifest)?;
        store.save(&manifest).context("Failed to save manifest")?;
        result
    }
}

/// Lock the shared manifest for one step.
pub(crate) fn lock_manifest(shared: &Mutex<Manifest>) -> Result<MutexGuard<'_, Manifest>> {
    shared
        .lock()
        .map_err(|_| anyhow!("manifest state was poisoned by a panic"))
}
