//! engine
//!
//! Lock state reconciliation: one view of which files are lockable and who
//! holds them.
//!
//! # Architecture
//!
//! [`LockEngine`] joins two independent sources:
//!
//! ```text
//! path -> resolve_root -> [classifier.lockable_paths] || [registry.list_locks]
//!                                        \                  /
//!                                         reconcile::merge
//! ```
//!
//! Both fetches run concurrently and are always awaited together. Either
//! failing fails the listing with an [`AggregateError`]; there is no partial
//! result. Mutations (lock, unlock, config writes) go straight to the
//! registry or the config store, and callers list again to see the effect.
//!
//! # Invariants
//!
//! - Every operation takes a path and resolves the repository root anew
//! - The engine holds no mutable state and caches nothing
//! - Conflicts are decided by the registry, never locally
//!
//! # Example
//!
//! ```no_run
//! use lockwork::core::config::Config;
//! use lockwork::engine::LockEngine;
//! use std::path::Path;
//!
//! # async fn demo() -> Result<(), lockwork::engine::EngineError> {
//! let engine = LockEngine::from_config(&Config::default());
//! for view in engine.list_lockable_files(Path::new(".")).await? {
//!     match view.owner() {
//!         Some(owner) => println!("{} (locked by {})", view.path, owner),
//!         None => println!("{}", view.path),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod error;
pub mod reconcile;

pub use error::{AggregateError, EngineError};
pub use reconcile::FileLockView;

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::attributes::AttributeRule;
use crate::core::config::Config;
use crate::core::lfsconfig::LockServerConfig;
use crate::core::store::ConfigStore;
use crate::core::types::RepoPath;
use crate::git::{resolve_root, Classifier, Git, RepoRoot};
use crate::process::CommandRunner;
use crate::registry::{create_registry, LockRecord, LockRegistry, Released};

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive mode enabled.
    pub interactive: bool,
    /// Loaded user configuration.
    pub config: Config,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cwd: None,
            debug: false,
            quiet: false,
            interactive: true,
            config: Config::default(),
        }
    }
}

/// Build the command runner described by `config`.
pub fn command_runner(config: &Config) -> CommandRunner {
    match config.command_timeout() {
        Some(timeout) => CommandRunner::new().with_timeout(timeout),
        None => CommandRunner::new(),
    }
}

/// The reconciliation engine.
pub struct LockEngine {
    classifier: Box<dyn Classifier>,
    registry: Box<dyn LockRegistry>,
}

impl std::fmt::Debug for LockEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockEngine")
            .field("classifier", &self.classifier.name())
            .field("registry", &self.registry.name())
            .finish()
    }
}

impl LockEngine {
    /// Create an engine over explicit collaborators.
    pub fn new(classifier: Box<dyn Classifier>, registry: Box<dyn LockRegistry>) -> Self {
        Self {
            classifier,
            registry,
        }
    }

    /// Create the production engine: git classification and git-lfs locks.
    pub fn from_config(config: &Config) -> Self {
        let runner = command_runner(config);
        let git = Git::with_runner(runner.clone(), config.git_program());
        Self::new(Box::new(git), create_registry(config, runner))
    }

    /// Resolve the repository root containing `path`.
    pub fn resolve_root(&self, path: &Path) -> Result<RepoRoot, EngineError> {
        Ok(resolve_root(path)?)
    }

    /// List every lockable file with its lock, plus orphaned locks.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Locate`] if `path` is not inside a repository
    /// - [`EngineError::Aggregate`] if classification, lock listing, or both
    ///   failed
    pub async fn list_lockable_files(&self, path: &Path) -> Result<Vec<FileLockView>, EngineError> {
        let root = resolve_root(path)?;
        debug!(
            root = %root,
            classifier = self.classifier.name(),
            registry = self.registry.name(),
            "listing lockable files"
        );

        let (classified, locks) = tokio::join!(
            self.classifier.lockable_paths(&root),
            self.registry.list_locks(&root),
        );

        match (classified, locks) {
            (Ok(classified), Ok(locks)) => {
                let views = reconcile::merge(classified, locks);
                debug!(count = views.len(), "reconciled lock views");
                Ok(views)
            }
            (classified, locks) => {
                let err = AggregateError {
                    classification: classified.err(),
                    registry: locks.err(),
                };
                warn!(root = %root, error = %err, "lock listing failed");
                Err(err.into())
            }
        }
    }

    /// Lock `file` in the repository containing `path`.
    pub async fn lock(&self, path: &Path, file: &RepoPath) -> Result<LockRecord, EngineError> {
        let root = resolve_root(path)?;
        Ok(self.registry.acquire_lock(&root, file).await?)
    }

    /// Unlock `file` in the repository containing `path`.
    ///
    /// `force` releases someone else's lock; confirming that is the
    /// caller's job.
    pub async fn unlock(
        &self,
        path: &Path,
        file: &RepoPath,
        force: bool,
    ) -> Result<Released, EngineError> {
        let root = resolve_root(path)?;
        Ok(self.registry.release_lock(&root, file, force).await?)
    }

    /// Read `.gitattributes` rules.
    pub fn read_attribute_rules(&self, path: &Path) -> Result<Vec<AttributeRule>, EngineError> {
        Ok(self.store(path)?.read_attribute_rules()?)
    }

    /// Replace `.gitattributes` rules.
    pub fn write_attribute_rules(
        &self,
        path: &Path,
        rules: &[AttributeRule],
    ) -> Result<(), EngineError> {
        Ok(self.store(path)?.write_attribute_rules(rules)?)
    }

    /// Read the `.lfsconfig` lock server override.
    pub fn read_lock_server_config(
        &self,
        path: &Path,
    ) -> Result<Option<LockServerConfig>, EngineError> {
        Ok(self.store(path)?.read_lock_server_config()?)
    }

    /// Write the `.lfsconfig` lock server override, or remove it with `None`.
    pub fn write_lock_server_config(
        &self,
        path: &Path,
        config: Option<&LockServerConfig>,
    ) -> Result<(), EngineError> {
        Ok(self.store(path)?.write_lock_server_config(config)?)
    }

    fn store(&self, path: &Path) -> Result<ConfigStore, EngineError> {
        Ok(ConfigStore::new(&resolve_root(path)?))
    }
}
