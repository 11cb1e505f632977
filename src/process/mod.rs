//! process
//!
//! External command execution.
//!
//! # Architecture
//!
//! Every subprocess lockwork starts goes through [`CommandRunner`]. Git and
//! git-lfs are treated as opaque command-line protocols: the runner knows
//! nothing about what it runs, it only spawns, streams, and reports.
//!
//! # Invariants
//!
//! - Output is streamed into growable buffers, never fixed-size ones
//! - In a pipe, the second process's stdin closes only after the first
//!   process exited and all of its output was forwarded
//! - A failed pipe never exposes partial output
//! - Children are killed when the future driving them is dropped
//!
//! # Example
//!
//! ```no_run
//! use lockwork::process::{CommandRunner, CommandSpec};
//! use std::path::Path;
//!
//! # async fn demo() -> Result<(), lockwork::process::CommandError> {
//! let runner = CommandRunner::new();
//! let out = runner
//!     .pipe(
//!         &CommandSpec::new("git").args(["ls-files", "-z"]),
//!         &CommandSpec::new("git").args(["check-attr", "--stdin", "-z", "lockable"]),
//!         Path::new("."),
//!     )
//!     .await?;
//! println!("{} bytes", out.len());
//! # Ok(())
//! # }
//! ```

mod runner;

pub use runner::{CommandError, CommandOutput, CommandRunner, CommandSpec};
