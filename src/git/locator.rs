//! git::locator
//!
//! Repository root discovery.
//!
//! # Discovery
//!
//! libgit2 walks up from the starting directory looking for a `.git`
//! directory, or a `.git` file (`gitdir: <path>`, written for linked
//! worktrees and submodules). A discovered repository only counts as a
//! root when it has a working tree and its common git dir holds a readable
//! `config` file. Bare repositories are never roots.
//!
//! Discovery never caches: a repository that moved or was renamed between
//! calls is found at its new location.

use std::fs;
use std::path::{Path, PathBuf};

use git2::Repository;
use thiserror::Error;
use tracing::debug;

/// Errors from repository discovery.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocateError {
    /// No ancestor of the path is a repository root, or the path does not
    /// exist.
    #[error("not inside a git repository: {path}")]
    NotFound {
        /// The path that was searched from
        path: PathBuf,
    },
}

/// An absolute path confirmed to be a repository root.
///
/// Obtained only through [`resolve_root`]. The path is canonical.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRoot(PathBuf);

impl RepoRoot {
    /// The root directory.
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// The repository's display name: the root directory's name.
    pub fn name(&self) -> String {
        self.0
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.0.display().to_string())
    }
}

impl AsRef<Path> for RepoRoot {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for RepoRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Find the nearest ancestor of `start` (inclusive) that is a repository root.
///
/// `start` may be a directory or a file; a file starts the search at its
/// parent directory.
///
/// # Errors
///
/// Returns [`LocateError::NotFound`] when the filesystem root is reached
/// without finding a repository, and also when `start` does not exist or
/// cannot be resolved.
///
/// # Example
///
/// ```no_run
/// use lockwork::git::resolve_root;
/// use std::path::Path;
///
/// let root = resolve_root(Path::new("art/characters"))?;
/// println!("repository: {} at {}", root.name(), root);
/// # Ok::<(), lockwork::git::LocateError>(())
/// ```
pub fn resolve_root(start: &Path) -> Result<RepoRoot, LocateError> {
    let not_found = || LocateError::NotFound {
        path: start.to_path_buf(),
    };

    let canonical = fs::canonicalize(start).map_err(|_| not_found())?;
    let dir = if canonical.is_dir() {
        canonical
    } else {
        canonical.parent().map(Path::to_path_buf).ok_or_else(not_found)?
    };

    let repo = Repository::discover(&dir).map_err(|e| {
        debug!(start = %dir.display(), error = %e, "repository discovery failed");
        not_found()
    })?;
    let workdir = repo.workdir().ok_or_else(not_found)?;
    if !has_readable_config(repo.commondir()) {
        debug!(git_dir = %repo.commondir().display(), "git dir has no readable config");
        return Err(not_found());
    }

    fs::canonicalize(workdir).map(RepoRoot).map_err(|_| not_found())
}

fn has_readable_config(git_dir: &Path) -> bool {
    fs::File::open(git_dir.join("config"))
        .and_then(|f| f.metadata())
        .map(|m| m.is_file())
        .unwrap_or(false)
}
