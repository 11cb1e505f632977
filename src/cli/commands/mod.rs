//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Calls the engine to execute the command
//! 3. Formats and displays output
//!
//! Handlers do NOT edit repository files directly.
//!
//! # Async Commands
//!
//! Commands that talk to git or git-lfs (ls, lock, unlock, remotes) are
//! async underneath. Each handler builds a `tokio::runtime::Runtime` and
//! blocks on its async body, so dispatch stays synchronous.

mod attributes;
mod completion;
mod lfsconfig;
mod lock;
mod ls;
mod remotes;
mod root;
mod unlock;

// Re-export command functions for testing and direct invocation
pub use attributes::attributes;
pub use completion::completion;
pub use lfsconfig::lfsconfig;
pub use lock::lock;
pub use ls::ls;
pub use remotes::remotes;
pub use root::root;
pub use unlock::unlock;

use std::path::{Path, PathBuf};

use crate::cli::args::Command;
use crate::core::types::RepoPath;
use crate::engine::Context;
use crate::git::RepoRoot;
use crate::ui::output::Verbosity;
use anyhow::{Context as _, Result};

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Root { name } => root::root(ctx, name),
        Command::Remotes => remotes::remotes(ctx),
        Command::Ls { json, filter, sort } => ls::ls(ctx, json, filter, sort),
        Command::Lock { paths } => lock::lock(ctx, &paths),
        Command::Unlock { paths, force, yes } => unlock::unlock(ctx, &paths, force, yes),
        Command::Lfsconfig { action } => lfsconfig::lfsconfig(ctx, action),
        Command::Attributes { action } => attributes::attributes(ctx, action),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// The directory commands run in: `--cwd`, or the process working directory.
fn working_dir(ctx: &Context) -> Result<PathBuf> {
    match &ctx.cwd {
        Some(cwd) => Ok(cwd.clone()),
        None => std::env::current_dir().context("Failed to determine current directory"),
    }
}

fn verbosity(ctx: &Context) -> Verbosity {
    Verbosity::from_flags(ctx.quiet, ctx.debug)
}

/// Convert a command-line path to a repository path.
///
/// Relative paths are taken from `cwd`, made absolute against the process
/// directory first when `cwd` itself is relative.
fn repo_path(root: &RepoRoot, cwd: &Path, path: &Path) -> Result<RepoPath> {
    let base = cwd
        .canonicalize()
        .with_context(|| format!("Failed to resolve '{}'", cwd.display()))?;
    RepoPath::from_fs_path(root.path(), &base, path)
        .with_context(|| format!("Invalid path '{}'", path.display()))
}
