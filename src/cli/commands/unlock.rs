//! unlock command - Release locks on the lock server

use std::path::{Path, PathBuf};

use super::{repo_path, verbosity, working_dir};
use crate::engine::{Context, LockEngine};
use crate::git::RepoRoot;
use crate::ui::{output, prompts};
use anyhow::{bail, Result};

/// Unlock each path, reporting failures per path.
///
/// `force` releases other users' locks and must be confirmed, either
/// interactively or with `yes`.
pub fn unlock(ctx: &Context, paths: &[PathBuf], force: bool, yes: bool) -> Result<()> {
    if force && !yes {
        if !ctx.interactive {
            bail!("--force releases locks held by others; pass --yes to confirm");
        }
        let question = format!(
            "Force-release {} lock(s), including locks held by other users?",
            paths.len()
        );
        if !prompts::confirm(&question, false, ctx.interactive)? {
            output::print("Aborted.", verbosity(ctx));
            return Ok(());
        }
    }

    let cwd = working_dir(ctx)?;
    let engine = LockEngine::from_config(&ctx.config);
    let root = engine.resolve_root(&cwd)?;

    let rt = tokio::runtime::Runtime::new()?;
    let failed = rt.block_on(unlock_async(ctx, &engine, &root, &cwd, paths, force));

    if failed > 0 {
        bail!("{} of {} unlock(s) failed", failed, paths.len());
    }
    Ok(())
}

async fn unlock_async(
    ctx: &Context,
    engine: &LockEngine,
    root: &RepoRoot,
    cwd: &Path,
    paths: &[PathBuf],
    force: bool,
) -> usize {
    let mut failed = 0;
    for path in paths {
        let target = match repo_path(root, cwd, path) {
            Ok(target) => target,
            Err(e) => {
                output::error(format!("{:#}", e));
                failed += 1;
                continue;
            }
        };

        match engine.unlock(cwd, &target, force).await {
            Ok(released) => {
                let message = match released.lock {
                    Some(lock) if !lock.owner.is_empty() => {
                        format!("Unlocked {} (held by {})", released.path, lock.owner)
                    }
                    _ => format!("Unlocked {}", released.path),
                };
                output::success(message, verbosity(ctx));
            }
            Err(e) => {
                output::error(format!("{}: {}", target, e));
                failed += 1;
            }
        }
    }
    failed
}
