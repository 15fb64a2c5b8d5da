//! Integration tests for the linkvault binary.
//!
//! Every test gets its own project directory and its own home area via
//! `LINKVAULT_HOME`, so nothing touches the real user's vault.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Test Fixtures
// =============================================================================

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        fs::create_dir_all(dir.path().join("project")).unwrap();
        Self { dir }
    }

    /// A sandbox with `linkvault init` already run.
    fn initialized() -> Self {
        let sandbox = Self::new();
        sandbox.cmd().arg("init").assert().success();
        sandbox
    }

    fn root(&self) -> PathBuf {
        self.dir.path().join("project")
    }

    fn home(&self) -> PathBuf {
        self.dir.path().join("home")
    }

    fn cmd(&self) -> Command {
        self.cmd_in(&self.root())
    }

    fn cmd_in(&self, dir: &Path) -> Command {
        let mut cmd = Command::cargo_bin("linkvault").unwrap();
        cmd.current_dir(dir)
            .env("LINKVAULT_HOME", self.home())
            .env_remove("LINKVAULT_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }

    fn write(&self, rel: &str, contents: &str) {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root().join(rel)).unwrap()
    }

    fn manifest(&self) -> String {
        fs::read_to_string(self.root().join(".linkvault/manifest.json")).unwrap()
    }
}

// =============================================================================
// Basics
// =============================================================================

#[test]
fn version_flag_works() {
    Command::cargo_bin("linkvault")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("linkvault"));
}

#[test]
fn completion_generates_script() {
    Command::cargo_bin("linkvault")
        .unwrap()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("linkvault"));
}

#[test]
fn init_creates_metadata_and_vault() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized linkvault in"))
        .stdout(predicate::str::contains("Vault: "));

    assert!(sandbox.root().join(".linkvault/manifest.json").is_file());
    assert!(sandbox.home().join("index.json").is_file());
    // The symlink probe cleans up after itself.
    let leftovers: Vec<_> = fs::read_dir(sandbox.root().join(".linkvault"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains("symlink-test"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn init_twice_warns() {
    let sandbox = Sandbox::initialized();
    sandbox
        .cmd()
        .arg("init")
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: already initialized"));
}

#[test]
fn commands_outside_project_fail() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a linkvault project"));
}

// =============================================================================
// Lock / unlock / forget
// =============================================================================

#[test]
fn lock_replaces_file_with_placeholder() {
    let sandbox = Sandbox::initialized();
    sandbox.write("secret.env", "API_KEY=123\n");

    sandbox
        .cmd()
        .args(["lock", "secret.env"])
        .assert()
        .success()
        .stdout(predicate::str::contains("locked: secret.env"));

    let placeholder = sandbox.read("secret.env");
    assert!(placeholder.starts_with("[linkvault:protected]"));
    assert!(placeholder.contains("linkvault unlock secret.env"));
    assert!(!placeholder.contains("API_KEY"));
    assert!(sandbox.manifest().contains("\"secret.env\""));

    sandbox
        .cmd()
        .args(["lock", "secret.env"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already locked: secret.env"));
}

#[test]
fn lock_partial_failure_saves_successes() {
    let sandbox = Sandbox::initialized();
    sandbox.write("good.env", "ok");

    sandbox
        .cmd()
        .args(["lock", "good.env", "missing.env"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("locked: good.env"))
        .stderr(predicate::str::contains("error: missing.env"))
        .stderr(predicate::str::contains("1 of 2 files locked, 1 failed"));

    assert!(sandbox.manifest().contains("\"good.env\""));
    assert!(!sandbox.manifest().contains("missing.env"));
}

#[test]
fn lock_rejects_paths_outside_project() {
    let sandbox = Sandbox::initialized();
    fs::write(sandbox.dir.path().join("outside.txt"), "x").unwrap();

    sandbox
        .cmd()
        .args(["lock", "../outside.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the project root"))
        .stderr(predicate::str::contains("0 of 1 files locked, 1 failed"));

    assert_eq!(
        fs::read_to_string(sandbox.dir.path().join("outside.txt")).unwrap(),
        "x"
    );
}

#[test]
fn lock_from_subdirectory_and_with_cwd_flag() {
    let sandbox = Sandbox::initialized();
    sandbox.write("conf/a.env", "a");
    sandbox.write("conf/b.env", "b");

    sandbox
        .cmd_in(&sandbox.root().join("conf"))
        .args(["lock", "a.env"])
        .assert()
        .success()
        .stdout(predicate::str::contains("locked: conf"));

    sandbox
        .cmd_in(sandbox.dir.path())
        .arg("--cwd")
        .arg(sandbox.root())
        .args(["lock", "conf/b.env"])
        .assert()
        .success();

    let manifest = sandbox.manifest();
    assert!(manifest.contains("\"conf/a.env\""));
    assert!(manifest.contains("\"conf/b.env\""));
}

#[cfg(unix)]
#[test]
fn unlock_creates_symlink_to_vault() {
    let sandbox = Sandbox::initialized();
    sandbox.write("secret.env", "API_KEY=123\n");
    sandbox.cmd().args(["lock", "secret.env"]).assert().success();

    sandbox
        .cmd()
        .args(["unlock", "secret.env"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unlocked: secret.env"));

    let path = sandbox.root().join("secret.env");
    assert!(fs::symlink_metadata(&path).unwrap().file_type().is_symlink());
    assert!(fs::read_link(&path).unwrap().ends_with("secret.env"));
    assert_eq!(sandbox.read("secret.env"), "API_KEY=123\n");

    sandbox
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("unlocked    secret.env"));
}

#[test]
fn forget_restores_content() {
    let sandbox = Sandbox::initialized();
    sandbox.write("secret.env", "API_KEY=123\n");
    sandbox.cmd().args(["lock", "secret.env"]).assert().success();

    sandbox
        .cmd()
        .args(["forget", "secret.env"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "forgot: secret.env (restored to original location)",
        ));

    assert_eq!(sandbox.read("secret.env"), "API_KEY=123\n");
    sandbox
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("no managed files"));
}

#[test]
fn forget_refuses_edited_placeholder() {
    let sandbox = Sandbox::initialized();
    sandbox.write("secret.env", "API_KEY=123\n");
    sandbox.cmd().args(["lock", "secret.env"]).assert().success();
    sandbox.write("secret.env", "replaced by an editor");

    sandbox
        .cmd()
        .args(["forget", "secret.env"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no longer an unmodified linkvault placeholder"));

    assert_eq!(sandbox.read("secret.env"), "replaced by an editor");
    sandbox
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("tampered    secret.env"));
}

// =============================================================================
// Listing and bulk operations
// =============================================================================

#[test]
fn status_and_list_are_sorted() {
    let sandbox = Sandbox::initialized();
    sandbox.write("b.env", "b");
    sandbox.write("a.env", "a");
    sandbox
        .cmd()
        .args(["lock", "b.env", "a.env"])
        .assert()
        .success();

    sandbox
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout("locked      a.env\nlocked      b.env\n");

    sandbox
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout("a.env\nb.env\n");
}

#[test]
fn lock_all_dry_run_then_lock() {
    let sandbox = Sandbox::initialized();
    sandbox.write(".linkvaultfiles", "*.env\n!example.env\n");
    sandbox.write("prod.env", "p");
    sandbox.write("conf/dev.env", "d");
    sandbox.write("example.env", "e");
    sandbox.write("README.md", "r");

    sandbox
        .cmd()
        .args(["lock-all", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("files that would be locked:"))
        .stdout(predicate::str::contains("prod.env"))
        .stdout(predicate::str::contains("example.env").not());
    assert_eq!(sandbox.read("prod.env"), "p");

    sandbox
        .cmd()
        .arg("lock-all")
        .assert()
        .success()
        .stdout(predicate::str::contains("locked 2 files (2 new, 0 re-locked)"));

    assert!(sandbox.read("prod.env").starts_with("[linkvault:protected]"));
    assert_eq!(sandbox.read("example.env"), "e");

    sandbox
        .cmd()
        .arg("lock-all")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to lock"));
}

#[cfg(unix)]
#[test]
fn unlock_all_then_lock_all_relocks() {
    let sandbox = Sandbox::initialized();
    sandbox.write("a.env", "a");
    sandbox.write("b.env", "b");
    sandbox
        .cmd()
        .args(["lock", "a.env", "b.env"])
        .assert()
        .success();

    sandbox
        .cmd()
        .arg("unlock-all")
        .assert()
        .success()
        .stdout(predicate::str::contains("unlocked 2 files"));

    sandbox
        .cmd()
        .arg("lock-all")
        .assert()
        .success()
        .stdout(predicate::str::contains("locked 2 files (0 new, 2 re-locked)"));

    sandbox
        .cmd()
        .arg("unlock-all")
        .assert()
        .success()
        .stdout(predicate::str::contains("unlocked 2 files"));
    sandbox
        .cmd()
        .arg("unlock-all")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to unlock"));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn config_set_get_list() {
    let sandbox = Sandbox::initialized();

    sandbox
        .cmd()
        .args(["config", "get", "size_limit_mb"])
        .assert()
        .success()
        .stdout("1024\n");

    sandbox
        .cmd()
        .args(["config", "set", "lock_timeout_secs", "60"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set lock_timeout_secs = 60"));

    sandbox
        .cmd()
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lock_timeout_secs = 60  # project"))
        .stdout(predicate::str::contains("size_limit_mb = 1024  # default"));

    assert!(sandbox.root().join(".linkvault/config.toml").is_file());
}

#[test]
fn config_rejects_bad_values() {
    let sandbox = Sandbox::initialized();

    sandbox
        .cmd()
        .args(["config", "set", "no_such_key", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown config key"));

    sandbox
        .cmd()
        .args(["config", "set", "size_warning_mb", "5000"])
        .assert()
        .failure();

    assert!(!sandbox.root().join(".linkvault/config.toml").exists());
}

#[test]
fn size_limit_requires_force() {
    let sandbox = Sandbox::initialized();
    sandbox
        .cmd()
        .args(["config", "set", "size_warning_mb", "0"])
        .assert()
        .success();
    sandbox
        .cmd()
        .args(["config", "set", "size_limit_mb", "0"])
        .assert()
        .success();
    sandbox.write("big.bin", "more than zero bytes");

    sandbox
        .cmd()
        .args(["lock", "big.bin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    assert_eq!(sandbox.read("big.bin"), "more than zero bytes");

    sandbox
        .cmd()
        .args(["lock", "--force", "big.bin"])
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: large file"));
}

// =============================================================================
// Interrupts
// =============================================================================

/// Whether the file starts with the placeholder prefix, reading only the
/// first few bytes.
#[cfg(unix)]
fn holds_placeholder(path: &Path) -> bool {
    use std::io::Read;

    const PREFIX: &[u8] = b"[linkvault:protected]";
    let mut head = [0u8; PREFIX.len()];
    fs::File::open(path)
        .and_then(|mut file| file.read_exact(&mut head))
        .map(|()| head == PREFIX)
        .unwrap_or(false)
}

#[cfg(unix)]
#[test]
fn interrupt_saves_locked_files_to_manifest() {
    use std::process::{Command as StdCommand, Stdio};
    use std::thread;
    use std::time::{Duration, Instant};

    let sandbox = Sandbox::initialized();
    let content = vec![b'x'; 4 * 1024 * 1024];
    let names: Vec<String> = (0..80).map(|i| format!("data/file{:03}.bin", i)).collect();
    fs::create_dir_all(sandbox.root().join("data")).unwrap();
    for name in &names {
        fs::write(sandbox.root().join(name), &content).unwrap();
    }

    let mut child = StdCommand::new(assert_cmd::cargo::cargo_bin("linkvault"))
        .current_dir(sandbox.root())
        .env("LINKVAULT_HOME", sandbox.home())
        .env_remove("LINKVAULT_CONFIG")
        .env_remove("RUST_LOG")
        .arg("lock")
        .args(&names)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // The handler is installed before the first file, so wait for one
    // placeholder before interrupting.
    let deadline = Instant::now() + Duration::from_secs(30);
    while !names
        .iter()
        .any(|name| holds_placeholder(&sandbox.root().join(name)))
    {
        assert!(Instant::now() < deadline, "no file was locked in time");
        thread::sleep(Duration::from_millis(5));
    }

    let killed = StdCommand::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(killed.success());

    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(130));

    let manifest: serde_json::Value = serde_json::from_str(&sandbox.manifest()).unwrap();
    let files = manifest["files"].as_object().unwrap();
    let locked: Vec<&String> = names
        .iter()
        .filter(|name| holds_placeholder(&sandbox.root().join(name.as_str())))
        .collect();

    assert!(!locked.is_empty());
    for name in &locked {
        assert_eq!(files[name.as_str()]["state"], "locked", "{} not saved", name);
    }
    assert_eq!(files.len(), locked.len());
}
