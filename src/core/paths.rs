//! core::paths
//!
//! Centralized path routing for the repository files lockwork edits.
//!
//! # Storage Layout
//!
//! Both files live at the repository root and are committed with the
//! repository, so every collaborator sees the same settings:
//! - `.lfsconfig` - lock server override (INI-like)
//! - `.gitattributes` - file classification rules
//!
//! **Hard rule:** No code outside this module joins these names onto a
//! root. All paths go through `RepoPaths`.
//!
//! # Example
//!
//! ```
//! use lockwork::core::paths::RepoPaths;
//! use std::path::PathBuf;
//!
//! let paths = RepoPaths::new(PathBuf::from("/repo"));
//! assert_eq!(paths.lfsconfig_path(), PathBuf::from("/repo/.lfsconfig"));
//! ```

use std::path::{Path, PathBuf};

use crate::git::RepoRoot;

/// File name of the lock server configuration.
pub const LFSCONFIG_FILE: &str = ".lfsconfig";

/// File name of the attribute rules.
pub const GITATTRIBUTES_FILE: &str = ".gitattributes";

/// Path routing for one repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPaths {
    root: PathBuf,
}

impl RepoPaths {
    /// Route paths under `root`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Route paths under a resolved repository root.
    pub fn for_root(root: &RepoRoot) -> Self {
        Self::new(root.path().to_path_buf())
    }

    /// The repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/.lfsconfig`
    pub fn lfsconfig_path(&self) -> PathBuf {
        self.root.join(LFSCONFIG_FILE)
    }

    /// `<root>/.gitattributes`
    pub fn gitattributes_path(&self) -> PathBuf {
        self.root.join(GITATTRIBUTES_FILE)
    }
}
