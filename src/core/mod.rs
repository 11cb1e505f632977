//! core
//!
//! Core domain types, file grammars, and configuration for lockwork.
//!
//! # Modules
//!
//! - [`types`] - Strong types: RepoPath, UtcTimestamp
//! - [`paths`] - Centralized path routing for repository files
//! - [`lfsconfig`] - `.lfsconfig` grammar and lock server settings
//! - [`attributes`] - `.gitattributes` rule grammar and editing helpers
//! - [`store`] - Atomic reads and writes of both files
//! - [`config`] - User configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - File grammars are explicit and preserve what they do not understand
//! - Nothing here spawns processes

pub mod attributes;
pub mod config;
pub mod lfsconfig;
pub mod paths;
pub mod store;
pub mod types;
