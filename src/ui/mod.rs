//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Interactive prompts and confirmations
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All human-facing output and prompts go through this module so quiet
//! and non-interactive modes are handled in one place. Diagnostics go
//! through `tracing` instead.

pub mod output;
pub mod prompts;
