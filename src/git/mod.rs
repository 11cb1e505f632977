//! git
//!
//! Everything lockwork knows about git repositories.
//!
//! # Architecture
//!
//! - [`resolve_root`] finds the repository root by walking up the
//!   filesystem; it never runs git.
//! - [`Git`] drives the `git` executable as a subprocess for attribute
//!   classification and remote listing.
//! - [`Classifier`] is the seam the engine depends on. [`Git`] is the
//!   production implementation, [`StaticClassifier`] the test double.
//!
//! # Invariants
//!
//! - Every git subprocess runs with the repository root as its working
//!   directory
//! - Classification output is decoded as NUL-delimited triples; paths are
//!   never unquoted or split on whitespace

mod classify;
mod interface;
mod locator;

pub use classify::{ClassifyError, Classifier, StaticClassifier};
pub use interface::Git;
pub use locator::{resolve_root, LocateError, RepoRoot};
