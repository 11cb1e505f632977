//! git::interface
//!
//! Subprocess-backed access to the `git` command line.
//!
//! Lockwork asks git two questions: which files are lockable (by piping
//! `git ls-files -z` into `git check-attr --stdin -z lockable`) and which
//! remotes are configured. Both run in the repository root through the
//! shared [`CommandRunner`].

use async_trait::async_trait;
use tracing::debug;

use super::classify::{parse_check_attr, ClassifyError, Classifier};
use super::RepoRoot;
use crate::core::types::RepoPath;
use crate::process::{CommandError, CommandRunner, CommandSpec};

/// The `git` executable, driven through a [`CommandRunner`].
///
/// # Example
///
/// ```no_run
/// use lockwork::git::{resolve_root, Classifier, Git};
/// use std::path::Path;
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let root = resolve_root(Path::new("."))?;
/// let git = Git::new();
/// for path in git.lockable_paths(&root).await? {
///     println!("{}", path);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Git {
    runner: CommandRunner,
    program: String,
}

impl Default for Git {
    fn default() -> Self {
        Self::new()
    }
}

impl Git {
    /// Use `git` from `PATH` with no deadline.
    pub fn new() -> Self {
        Self::with_runner(CommandRunner::new(), "git")
    }

    /// Use a specific runner and executable.
    pub fn with_runner(runner: CommandRunner, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    fn spec<const N: usize>(&self, args: [&str; N]) -> CommandSpec {
        CommandSpec::new(&self.program)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
    }

    /// Names of the configured remotes, in git's order.
    pub async fn remotes(&self, root: &RepoRoot) -> Result<Vec<String>, CommandError> {
        let output = self.runner.run(&self.spec(["remote"]), root.path()).await?;
        Ok(output
            .stdout_lossy()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }
}

#[async_trait]
impl Classifier for Git {
    fn name(&self) -> &'static str {
        "git"
    }

    async fn lockable_paths(&self, root: &RepoRoot) -> Result<Vec<RepoPath>, ClassifyError> {
        let listing = self.spec(["ls-files", "-z"]);
        let resolver = self.spec(["check-attr", "--stdin", "-z", "lockable"]);

        let output = self.runner.pipe(&listing, &resolver, root.path()).await?;
        let paths = parse_check_attr(&output)?;
        debug!(root = %root, count = paths.len(), "classified lockable files");
        Ok(paths)
    }
}
