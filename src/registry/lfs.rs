//! registry::lfs
//!
//! Lock registry backed by the git-lfs command line.
//!
//! # Protocol
//!
//! | Operation | Command |
//! |-----------|---------|
//! | list      | `git lfs locks --json` |
//! | acquire   | `git lfs lock --json <path>` |
//! | release   | `git lfs unlock --json [--force] <path>` |
//!
//! Locks are exchanged as
//! `{"id": "...", "path": "...", "owner": {"name": "..."}, "locked_at": "..."}`.
//! Unlock answers with either the released lock or `{"unlocked": true}`
//! depending on the git-lfs version.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::traits::{LockRecord, LockRegistry, RegistryError, Released};
use crate::core::types::{RepoPath, UtcTimestamp};
use crate::git::RepoRoot;
use crate::process::{CommandError, CommandRunner, CommandSpec};

#[derive(Debug, Deserialize)]
struct WireLock {
    id: String,
    path: String,
    #[serde(default)]
    owner: Option<WireOwner>,
    locked_at: String,
}

#[derive(Debug, Deserialize)]
struct WireOwner {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireUnlock {
    Lock(WireLock),
    Ack {
        #[allow(dead_code)]
        unlocked: bool,
    },
}

impl TryFrom<WireLock> for LockRecord {
    type Error = RegistryError;

    fn try_from(wire: WireLock) -> Result<Self, Self::Error> {
        let path = RepoPath::new(wire.path.as_str()).map_err(|e| {
            RegistryError::Decode(format!("lock {} on {:?}: {}", wire.id, wire.path, e))
        })?;
        let locked_at = UtcTimestamp::parse(&wire.locked_at).map_err(|e| {
            RegistryError::Decode(format!("lock {} on {:?}: {}", wire.id, wire.path, e))
        })?;
        Ok(LockRecord {
            path,
            locked_at,
            owner: wire.owner.map(|o| o.name).unwrap_or_default(),
            id: wire.id,
        })
    }
}

fn decode<'a, T: Deserialize<'a>>(stdout: &'a [u8], what: &str) -> Result<T, RegistryError> {
    serde_json::from_slice(stdout)
        .map_err(|e| RegistryError::Decode(format!("{}: {}", what, e)))
}

fn is_blank(stdout: &[u8]) -> bool {
    stdout.iter().all(u8::is_ascii_whitespace)
}

/// Whether a failed lock attempt means someone already holds the lock.
fn is_conflict(err: &CommandError) -> bool {
    err.stderr().is_some_and(|stderr| {
        let stderr = stderr.to_ascii_lowercase();
        stderr.contains("lock exists") || stderr.contains("already")
    })
}

/// The git-lfs client.
///
/// Every command runs in the repository root with terminal prompts
/// disabled, so a missing credential fails instead of hanging.
#[derive(Debug, Clone)]
pub struct LfsCli {
    runner: CommandRunner,
    base: CommandSpec,
}

impl LfsCli {
    /// Run lock commands as `<git> lfs ...`.
    pub fn via_git(runner: CommandRunner, git: impl Into<String>) -> Self {
        Self {
            runner,
            base: CommandSpec::new(git).arg("lfs"),
        }
    }

    /// Run lock commands through a git-lfs executable directly.
    pub fn with_program(runner: CommandRunner, program: impl Into<String>) -> Self {
        Self::with_command(runner, CommandSpec::new(program))
    }

    /// Run lock commands as `base` followed by the subcommand arguments.
    pub fn with_command(runner: CommandRunner, base: CommandSpec) -> Self {
        Self { runner, base }
    }

    fn spec<const N: usize>(&self, args: [&str; N]) -> CommandSpec {
        self.base
            .clone()
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
    }
}

#[async_trait]
impl LockRegistry for LfsCli {
    fn name(&self) -> &'static str {
        "git-lfs"
    }

    async fn list_locks(&self, root: &RepoRoot) -> Result<Vec<LockRecord>, RegistryError> {
        let output = self
            .runner
            .run(&self.spec(["locks", "--json"]), root.path())
            .await?;
        if is_blank(&output.stdout) {
            return Ok(Vec::new());
        }

        let wire: Vec<WireLock> = decode(&output.stdout, "lock list")?;
        let locks = wire
            .into_iter()
            .map(LockRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = locks.len(), "listed locks");
        Ok(locks)
    }

    async fn acquire_lock(
        &self,
        root: &RepoRoot,
        path: &RepoPath,
    ) -> Result<LockRecord, RegistryError> {
        let spec = self.spec(["lock", "--json", path.as_str()]);
        let output = match self.runner.run(&spec, root.path()).await {
            Ok(output) => output,
            Err(err) if is_conflict(&err) => {
                return Err(RegistryError::Conflict {
                    path: path.clone(),
                    message: err.stderr().unwrap_or_default().trim().to_string(),
                })
            }
            Err(err) => return Err(err.into()),
        };

        let wire: WireLock = decode(&output.stdout, "lock")?;
        let lock = LockRecord::try_from(wire)?;
        debug!(path = %lock.path, id = %lock.id, "acquired lock");
        Ok(lock)
    }

    async fn release_lock(
        &self,
        root: &RepoRoot,
        path: &RepoPath,
        force: bool,
    ) -> Result<Released, RegistryError> {
        let spec = if force {
            self.spec(["unlock", "--json", "--force", path.as_str()])
        } else {
            self.spec(["unlock", "--json", path.as_str()])
        };
        let output = self.runner.run(&spec, root.path()).await?;

        let lock = if is_blank(&output.stdout) {
            None
        } else {
            match decode::<WireUnlock>(&output.stdout, "unlock")? {
                WireUnlock::Lock(wire) => Some(LockRecord::try_from(wire)?),
                WireUnlock::Ack { .. } => None,
            }
        };
        debug!(path = %path, force, "released lock");
        Ok(Released {
            path: path.clone(),
            lock,
        })
    }
}
