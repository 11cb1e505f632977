//! Lockwork - coordinate Git LFS file locks across collaborators
//!
//! Lockwork answers one question for a repository: which files can be
//! locked, and who holds each lock right now. It joins the repository's
//! `lockable` attribute with the lock server's registry, and manages the
//! two committed files that configure locking (`.gitattributes` and
//! `.lfsconfig`).
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Reconciles classification with registry locks
//! - [`core`] - Domain types, config files and user configuration
//! - [`git`] - Repository location and git invocation
//! - [`registry`] - Abstraction over the lock server (git-lfs)
//! - [`process`] - Subprocess execution
//! - [`ui`] - User interaction utilities
//!
//! # Correctness Invariants
//!
//! 1. Lock conflicts are decided by the lock server, never locally
//! 2. A listing is all or nothing: both sources succeed or the call fails
//! 3. Every lock the server reports appears in a listing
//! 4. Config file writes are atomic

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod process;
pub mod registry;
pub mod ui;
