//! remotes command - List git remotes

use super::working_dir;
use crate::engine::{command_runner, Context};
use crate::git::{resolve_root, Git};
use anyhow::{Context as _, Result};

/// List git remotes, one per line.
pub fn remotes(ctx: &Context) -> Result<()> {
    let cwd = working_dir(ctx)?;
    let root = resolve_root(&cwd)?;
    let git = Git::with_runner(
        command_runner(&ctx.config),
        ctx.config.git_program(),
    );

    let rt = tokio::runtime::Runtime::new()?;
    let names = rt
        .block_on(git.remotes(&root))
        .context("Failed to list remotes")?;

    for name in names {
        println!("{}", name);
    }
    Ok(())
}
