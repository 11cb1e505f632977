//! registry
//!
//! Abstraction for the remote lock registry.
//!
//! # Architecture
//!
//! The `LockRegistry` trait defines list, acquire and release. Commands
//! use the [`create_registry`] factory rather than importing a specific
//! client.
//!
//! - The registry is the only authority on lock ownership
//! - Registry failures never touch local files
//! - Nothing is cached between calls
//!
//! # Modules
//!
//! - `traits`: Core `LockRegistry` trait and `LockRecord`
//! - [`lfs`]: git-lfs command line client
//! - [`mock`]: In-memory implementation for deterministic testing
//! - `factory`: Client selection from configuration

mod factory;
pub mod lfs;
pub mod mock;
mod traits;

pub use factory::create_registry;
pub use traits::*;
