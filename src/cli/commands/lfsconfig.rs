//! lfsconfig command - Show or edit the lock server override

use super::{verbosity, working_dir};
use crate::cli::args::LfsconfigAction;
use crate::core::lfsconfig::LockServerConfig;
use crate::engine::{command_runner, Context, LockEngine};
use crate::git::Git;
use crate::ui::output;
use anyhow::{Context as _, Result};

/// Run an lfsconfig subcommand.
pub fn lfsconfig(ctx: &Context, action: LfsconfigAction) -> Result<()> {
    let cwd = working_dir(ctx)?;
    let engine = LockEngine::from_config(&ctx.config);

    match action {
        LfsconfigAction::Show => match engine.read_lock_server_config(&cwd)? {
            Some(config) => {
                println!("remote: {}", config.remote);
                println!("url:    {}", config.url);
                println!("auth:   {}", if config.auth { "basic" } else { "none" });
            }
            None => output::print("No lock server configured.", verbosity(ctx)),
        },
        LfsconfigAction::Set { url, remote, auth } => {
            let remote = match remote {
                Some(remote) => remote,
                None => default_remote(ctx, &engine, &cwd)?,
            };
            let config = LockServerConfig { remote, url, auth };
            engine.write_lock_server_config(&cwd, Some(&config))?;
            output::success(
                format!("Lock server for '{}' set to {}", config.remote, config.url),
                verbosity(ctx),
            );
        }
        LfsconfigAction::Clear => {
            engine.write_lock_server_config(&cwd, None)?;
            output::success("Lock server override removed.", verbosity(ctx));
        }
    }
    Ok(())
}

/// The first git remote, used when `--remote` is not given.
fn default_remote(ctx: &Context, engine: &LockEngine, cwd: &std::path::Path) -> Result<String> {
    let root = engine.resolve_root(cwd)?;
    let git = Git::with_runner(
        command_runner(&ctx.config),
        ctx.config.git_program(),
    );

    let rt = tokio::runtime::Runtime::new()?;
    let remotes = rt
        .block_on(git.remotes(&root))
        .context("Failed to list remotes")?;
    remotes
        .into_iter()
        .next()
        .context("No git remote found; pass --remote")
}
