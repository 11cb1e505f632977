//! cli
//!
//! Command-line interface layer for lockwork.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Delegate to command handlers
//! - Filter, sort and format what the engine returns
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to the
//! [`crate::engine`] for execution. Lock decisions are made by the lock
//! server and file edits go through the engine's config store.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::core::config::Config;
use crate::engine;
use anyhow::{Context as _, Result};

/// Run the CLI application with already-parsed arguments.
///
/// This is the main entry point called from `main.rs`.
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load().context("Failed to load config")?;

    // CLI flags take precedence over the configured prompt default.
    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        interactive: cli.interactive(config.interactive()),
        config,
    };

    commands::dispatch(cli.command, &ctx)
}
