//! lock command - Lock files on the lock server

use std::path::{Path, PathBuf};

use super::{repo_path, verbosity, working_dir};
use crate::engine::{Context, LockEngine};
use crate::git::RepoRoot;
use crate::ui::output;
use anyhow::{bail, Result};

/// Lock each path, reporting failures per path.
pub fn lock(ctx: &Context, paths: &[PathBuf]) -> Result<()> {
    let cwd = working_dir(ctx)?;
    let engine = LockEngine::from_config(&ctx.config);
    let root = engine.resolve_root(&cwd)?;

    let rt = tokio::runtime::Runtime::new()?;
    let failed = rt.block_on(lock_async(ctx, &engine, &root, &cwd, paths));

    if failed > 0 {
        bail!("{} of {} lock(s) failed", failed, paths.len());
    }
    Ok(())
}

async fn lock_async(
    ctx: &Context,
    engine: &LockEngine,
    root: &RepoRoot,
    cwd: &Path,
    paths: &[PathBuf],
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

        match engine.lock(cwd, &target).await {
            Ok(record) => output::success(
                format!("Locked {} (id {})", record.path, record.id),
                verbosity(ctx),
            ),
            Err(e) => {
                output::error(format!("{}: {}", target, e));
                failed += 1;
            }
        }
    }
    failed
}
