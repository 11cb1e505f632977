//! registry::factory
//!
//! Registry selection from configuration.
//!
//! Commands use [`create_registry`] instead of constructing a client, so the
//! choice between `git lfs` and a standalone git-lfs executable lives in
//! one place.

use super::lfs::LfsCli;
use super::traits::LockRegistry;
use crate::core::config::Config;
use crate::process::CommandRunner;

/// Create the lock registry client described by `config`.
///
/// Uses the configured `lfs` executable when set, otherwise `<git> lfs`.
pub fn create_registry(config: &Config, runner: CommandRunner) -> Box<dyn LockRegistry> {
    match config.lfs_program() {
        Some(program) => Box::new(LfsCli::with_program(runner, program)),
        None => Box::new(LfsCli::via_git(runner, config.git_program())),
    }
}
