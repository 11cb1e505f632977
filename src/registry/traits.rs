//! registry::traits
//!
//! Lock registry trait definition and the records it returns.
//!
//! # Design
//!
//! The `LockRegistry` trait is async because registry operations reach a
//! remote server through a subprocess. Conflicts are never detected
//! locally: the registry is the only authority on who holds a lock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{RepoPath, UtcTimestamp};
use crate::git::RepoRoot;
use crate::process::CommandError;

/// Errors from lock registry operations.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// The registry command could not run or refused the request.
    #[error("lock registry command failed: {0}")]
    Command(#[from] CommandError),

    /// Another lock already covers the path.
    #[error("'{path}' is already locked: {message}")]
    Conflict {
        /// The path that could not be locked
        path: RepoPath,
        /// The registry's explanation
        message: String,
    },

    /// The registry answered with output that could not be decoded.
    #[error("unexpected lock registry output: {0}")]
    Decode(String),
}

/// One lock held in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// Opaque registry identifier
    pub id: String,
    /// The locked path
    pub path: RepoPath,
    /// Display name of the holder
    pub owner: String,
    /// When the lock was taken
    pub locked_at: UtcTimestamp,
}

/// Outcome of a successful release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Released {
    /// The path that was unlocked
    pub path: RepoPath,
    /// The released lock, when the registry echoes it back
    pub lock: Option<LockRecord>,
}

/// The lock registry for a repository.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so the engine can query the
/// registry concurrently with attribute classification.
///
/// # Example
///
/// ```
/// use lockwork::core::types::RepoPath;
/// use lockwork::registry::mock::MockRegistry;
/// use lockwork::registry::{LockRegistry, RegistryError};
///
/// # let dir = tempfile::TempDir::new().unwrap();
/// # git2::Repository::init(dir.path()).unwrap();
/// # let root = lockwork::git::resolve_root(dir.path()).unwrap();
/// # tokio_test::block_on(async {
/// let registry = MockRegistry::new().with_lock("art/hero.psd", "alice");
/// let path = RepoPath::new("art/hero.psd").unwrap();
///
/// let result = registry.acquire_lock(&root, &path).await;
/// assert!(matches!(result, Err(RegistryError::Conflict { .. })));
/// # });
/// ```
#[async_trait]
pub trait LockRegistry: Send + Sync {
    /// Name of this registry for logging (e.g., "git-lfs").
    fn name(&self) -> &'static str;

    /// Every lock currently held, in registry order.
    async fn list_locks(&self, root: &RepoRoot) -> Result<Vec<LockRecord>, RegistryError>;

    /// Take the lock on `path`.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the path is already locked
    /// - `Command` for any other refusal or failure to run
    async fn acquire_lock(&self, root: &RepoRoot, path: &RepoPath)
        -> Result<LockRecord, RegistryError>;

    /// Release the lock on `path`.
    ///
    /// With `force`, the registry releases a lock held by someone else.
    async fn release_lock(
        &self,
        root: &RepoRoot,
        path: &RepoPath,
        force: bool,
    ) -> Result<Released, RegistryError>;
}
