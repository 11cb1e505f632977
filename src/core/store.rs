//! core::store
//!
//! Reading and writing the repository's `.lfsconfig` and `.gitattributes`.
//!
//! # Architecture
//!
//! `ConfigStore` owns file I/O; the grammars live in
//! [`lfsconfig`](super::lfsconfig) and [`attributes`](super::attributes).
//! Every write replaces the whole file through a temp file and a rename, so
//! readers never observe a half-written file. There is no locking between
//! writers: the last rename wins.
//!
//! # Example
//!
//! ```no_run
//! use lockwork::core::store::ConfigStore;
//! use lockwork::git::resolve_root;
//! use std::path::Path;
//!
//! let root = resolve_root(Path::new("."))?;
//! let store = ConfigStore::new(&root);
//!
//! let mut rules = store.read_attribute_rules()?;
//! for rule in &mut rules {
//!     rule.set_lockable(true);
//! }
//! store.write_attribute_rules(&rules)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::attributes::{self, AttributeRule};
use super::lfsconfig::{self, LockServerConfig};
use super::paths::RepoPaths;
use crate::git::RepoRoot;

/// Errors from config file operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file exists but does not follow its grammar.
    #[error("{}:{}: {}", .path.display(), .line, .message)]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("invalid attribute rule: {0}")]
    InvalidRule(String),

    #[error("invalid lock server config: {0}")]
    InvalidConfig(String),
}

/// Config file access for one repository.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    paths: RepoPaths,
}

impl ConfigStore {
    /// Create a store for the files at `root`.
    pub fn new(root: &RepoRoot) -> Self {
        Self {
            paths: RepoPaths::for_root(root),
        }
    }

    /// Read the lock server override.
    ///
    /// Returns `None` when `.lfsconfig` is absent or names no remote URL.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Parse`] if the file is malformed
    /// - [`StoreError::Read`] if it exists but cannot be read
    pub fn read_lock_server_config(&self) -> Result<Option<LockServerConfig>, StoreError> {
        let path = self.paths.lfsconfig_path();
        let Some(text) = read_optional(&path)? else {
            debug!(path = %path.display(), "no lfsconfig");
            return Ok(None);
        };

        lfsconfig::parse(&text).map_err(|e| StoreError::Parse {
            path,
            line: e.line,
            message: e.message,
        })
    }

    /// Write the lock server override, or delete it with `None`.
    ///
    /// Deleting an absent file succeeds.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidConfig`] if the remote or URL cannot be written
    /// - [`StoreError::Write`] on I/O failure
    pub fn write_lock_server_config(
        &self,
        config: Option<&LockServerConfig>,
    ) -> Result<(), StoreError> {
        let path = self.paths.lfsconfig_path();
        match config {
            Some(config) => {
                let text = lfsconfig::render(config).map_err(StoreError::InvalidConfig)?;
                write_atomic(&path, &text)
            }
            None => match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StoreError::Write { path, source: e }),
            },
        }
    }

    /// Read the attribute rules in file order.
    ///
    /// Returns an empty list when `.gitattributes` is absent.
    pub fn read_attribute_rules(&self) -> Result<Vec<AttributeRule>, StoreError> {
        let path = self.paths.gitattributes_path();
        match read_optional(&path)? {
            Some(text) => Ok(attributes::parse_rules(&text)),
            None => Ok(Vec::new()),
        }
    }

    /// Replace `.gitattributes` with `rules`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidRule`] before touching the file if any
    /// rule cannot be written as a single line.
    pub fn write_attribute_rules(&self, rules: &[AttributeRule]) -> Result<(), StoreError> {
        let text = attributes::render_rules(rules).map_err(StoreError::InvalidRule)?;
        write_atomic(&self.paths.gitattributes_path(), &text)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::Read {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Write a file atomically: temp file in the same directory, then rename.
fn write_atomic(path: &Path, contents: &str) -> Result<(), StoreError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!("{}.lockwork.tmp", file_name));

    let write_err = |p: &Path| {
        let p = p.to_path_buf();
        move |e| StoreError::Write { path: p, source: e }
    };

    let mut file = fs::File::create(&temp_path).map_err(write_err(&temp_path))?;
    file.write_all(contents.as_bytes())
        .map_err(write_err(&temp_path))?;
    file.sync_all().map_err(write_err(&temp_path))?;
    drop(file);

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::Write {
            path: path.to_path_buf(),
            source: e,
        });
    }

    debug!(path = %path.display(), bytes = contents.len(), "wrote config file");
    Ok(())
}
