//! root command - Print the repository root

use super::working_dir;
use crate::engine::{Context, LockEngine};
use anyhow::Result;

/// Print the repository root, or just its directory name.
pub fn root(ctx: &Context, name: bool) -> Result<()> {
    let cwd = working_dir(ctx)?;
    let engine = LockEngine::from_config(&ctx.config);
    let root = engine.resolve_root(&cwd)?;

    if name {
        println!("{}", root.name());
    } else {
        println!("{}", root);
    }
    Ok(())
}
