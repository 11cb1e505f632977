//! Integration tests for the `lw` binary.
//!
//! Each test gets its own repository and an isolated config home so the
//! user's real configuration never leaks in.

use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct TestEnv {
    repo: TempDir,
    home: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        let repo = TempDir::new().expect("failed to create temp dir");
        run_git(repo.path(), &["init", "-q"]);
        Self {
            repo,
            home: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn path(&self) -> &Path {
        self.repo.path()
    }

    fn config_path(&self) -> PathBuf {
        self.home.path().join("config.toml")
    }

    /// `lw` running in the repository with non-interactive defaults.
    fn lw(&self) -> Command {
        let mut cmd = Command::cargo_bin("lw").unwrap();
        cmd.current_dir(self.path())
            .env("LOCKWORK_CONFIG", self.config_path())
            .env("XDG_CONFIG_HOME", self.home.path())
            .env("HOME", self.home.path())
            .env_remove("LOCKWORK_LOG")
            .env_remove("RUST_LOG")
            .arg("--no-interactive");
        cmd
    }

    /// Point `lw` at a fake git-lfs executable with the given body.
    #[cfg(unix)]
    fn fake_lfs(&self, body: &str) {
        use std::os::unix::fs::PermissionsExt;

        let script = self.home.path().join("fake-lfs");
        std::fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        std::fs::write(
            self.config_path(),
            format!("lfs = {:?}\n", script.to_string_lossy()),
        )
        .unwrap();
    }
}

fn run_git(dir: &Path, args: &[&str]) {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(output.status.success(), "git {:?} failed", args);
}

// =============================================================================
// General
// =============================================================================

#[test]
fn help_lists_commands() {
    Command::cargo_bin("lw")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("lock"))
        .stdout(predicate::str::contains("attributes"));
}

#[test]
fn completion_script_is_generated() {
    Command::cargo_bin("lw")
        .unwrap()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_lw"));
}

#[test]
fn invalid_config_fails() {
    let env = TestEnv::new();
    std::fs::write(env.config_path(), "command_timeout_secs = 0\n").unwrap();

    env.lw()
        .arg("root")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

// =============================================================================
// root / remotes
// =============================================================================

#[test]
fn root_from_subdirectory() {
    let env = TestEnv::new();
    let sub = env.path().join("art/characters");
    std::fs::create_dir_all(&sub).unwrap();
    let root = env.path().canonicalize().unwrap();

    env.lw()
        .arg("--cwd")
        .arg(&sub)
        .arg("root")
        .assert()
        .success()
        .stdout(format!("{}\n", root.display()));
}

#[test]
fn root_name() {
    let env = TestEnv::new();
    let name = env
        .path()
        .canonicalize()
        .unwrap()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();

    env.lw()
        .args(["root", "--name"])
        .assert()
        .success()
        .stdout(format!("{}\n", name));
}

#[test]
fn root_outside_repository_fails() {
    let env = TestEnv::new();
    let outside = TempDir::new().unwrap();

    env.lw()
        .arg("--cwd")
        .arg(outside.path())
        .arg("root")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn remotes_in_order() {
    let env = TestEnv::new();
    run_git(env.path(), &["remote", "add", "origin", "https://example.com/a.git"]);
    run_git(env.path(), &["remote", "add", "upstream", "https://example.com/b.git"]);

    env.lw()
        .arg("remotes")
        .assert()
        .success()
        .stdout("origin\nupstream\n");
}

// =============================================================================
// attributes
// =============================================================================

#[test]
fn attributes_add_list_remove() {
    let env = TestEnv::new();

    env.lw().args(["attributes", "comment", "art"]).assert().success();
    env.lw().args(["attributes", "add", "*.psd"]).assert().success();
    env.lw()
        .args(["attributes", "add", "*.txt", "--no-lfs"])
        .assert()
        .success();

    let written = std::fs::read_to_string(env.path().join(".gitattributes")).unwrap();
    assert_eq!(
        written,
        "# art\n*.psd filter=lfs diff=lfs merge=lfs -text lockable\n*.txt lockable\n"
    );

    env.lw()
        .args(["attributes", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("*.psd filter=lfs"));

    env.lw()
        .args(["attributes", "remove", "*.txt"])
        .assert()
        .success();
    env.lw()
        .args(["attributes", "remove", "*.txt"])
        .assert()
        .failure();
}

#[test]
fn attributes_defaults() {
    let env = TestEnv::new();

    env.lw().args(["attributes", "defaults"]).assert().success();
    let written = std::fs::read_to_string(env.path().join(".gitattributes")).unwrap();
    assert!(written.contains("# 3D models\n"));
    assert!(written.contains("*.blend filter=lfs diff=lfs merge=lfs -text lockable\n"));
}

// =============================================================================
// lfsconfig
// =============================================================================

#[test]
fn lfsconfig_set_show_clear() {
    let env = TestEnv::new();

    env.lw()
        .args(["lfsconfig", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No lock server"));

    env.lw()
        .args([
            "lfsconfig",
            "set",
            "--remote",
            "origin",
            "--url",
            "https://lfs.example.com/team",
            "--auth",
        ])
        .assert()
        .success();

    env.lw()
        .args(["lfsconfig", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://lfs.example.com/team"))
        .stdout(predicate::str::contains("basic"));

    env.lw().args(["lfsconfig", "clear"]).assert().success();
    env.lw().args(["lfsconfig", "clear"]).assert().success();
    assert!(!env.path().join(".lfsconfig").exists());
}

#[test]
fn lfsconfig_set_defaults_to_first_remote() {
    let env = TestEnv::new();
    run_git(env.path(), &["remote", "add", "origin", "https://example.com/a.git"]);

    env.lw()
        .args(["lfsconfig", "set", "--url", "https://lfs.example.com/x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("'origin'"));
}

#[test]
fn lfsconfig_set_without_remotes_fails() {
    let env = TestEnv::new();

    env.lw()
        .args(["lfsconfig", "set", "--url", "https://lfs.example.com/x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--remote"));
}

#[test]
fn lfsconfig_rejects_relative_url() {
    let env = TestEnv::new();

    env.lw()
        .args(["lfsconfig", "set", "--remote", "origin", "--url", "not a url"])
        .assert()
        .failure();
    assert!(!env.path().join(".lfsconfig").exists());
}

// =============================================================================
// ls / lock / unlock
// =============================================================================

#[cfg(unix)]
#[test]
fn ls_json_includes_missing_locks() {
    let env = TestEnv::new();
    std::fs::write(env.path().join(".gitattributes"), "*.psd lockable\n").unwrap();
    std::fs::write(env.path().join("a.psd"), "a").unwrap();
    run_git(env.path(), &["add", "."]);
    env.fake_lfs(
        r#"echo '[{"id":"9","path":"gone.psd","owner":{"name":"bob"},"locked_at":"2021-01-01T00:00:00Z"}]'"#,
    );

    let output = env.lw().args(["ls", "--json"]).output().unwrap();
    assert!(output.status.success());
    let views: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let views = views.as_array().unwrap();
    assert_eq!(views.len(), 2);
    assert_eq!(views[0]["path"], "a.psd");
    assert_eq!(views[0]["lock"], serde_json::Value::Null);
    assert_eq!(views[1]["path"], "gone.psd");
    assert_eq!(views[1]["is_missing"], true);

    env.lw()
        .args(["ls", "--filter", "missing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gone.psd"))
        .stdout(predicate::str::contains("a.psd").not());
}

#[cfg(unix)]
#[test]
fn lock_converts_paths_relative_to_cwd() {
    let env = TestEnv::new();
    let sub = env.path().join("art");
    std::fs::create_dir_all(&sub).unwrap();
    env.fake_lfs(
        r#"[ "$3" = "art/hero.psd" ] || { echo "unexpected path $3" >&2; exit 4; }
echo '{"id":"1","path":"art/hero.psd","owner":{"name":"me"},"locked_at":"2021-01-01T00:00:00Z"}'"#,
    );

    env.lw()
        .arg("--cwd")
        .arg(&sub)
        .args(["lock", "hero.psd"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Locked art/hero.psd"));
}

#[cfg(unix)]
#[test]
fn lock_reports_each_failure() {
    let env = TestEnv::new();
    env.fake_lfs(
        r#"if [ "$3" = "taken.psd" ]; then echo "Lock exists" >&2; exit 2; fi
echo "{\"id\":\"1\",\"path\":\"$3\",\"owner\":{\"name\":\"me\"},\"locked_at\":\"2021-01-01T00:00:00Z\"}""#,
    );

    env.lw()
        .args(["lock", "free.psd", "taken.psd"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Locked free.psd"))
        .stderr(predicate::str::contains("taken.psd"))
        .stderr(predicate::str::contains("1 of 2"));
}

#[test]
fn lock_outside_repository_path_fails() {
    let env = TestEnv::new();

    env.lw()
        .args(["lock", "../elsewhere.psd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the repository"));
}

#[test]
fn forced_unlock_needs_confirmation() {
    let env = TestEnv::new();

    env.lw()
        .args(["unlock", "--force", "a.psd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
}

#[cfg(unix)]
#[test]
fn forced_unlock_with_yes() {
    let env = TestEnv::new();
    env.fake_lfs(
        r#"[ "$3" = "--force" ] || exit 5
echo '{"id":"1","path":"a.psd","owner":{"name":"bob"},"locked_at":"2021-01-01T00:00:00Z"}'"#,
    );

    env.lw()
        .args(["unlock", "--force", "--yes", "a.psd"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unlocked a.psd (held by bob)"));
}
