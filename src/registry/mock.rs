//! registry::mock
//!
//! Mock lock registry for deterministic testing.
//!
//! # Design
//!
//! The mock registry keeps locks in memory, in insertion order, and acts as
//! a single user (the "current owner"). It mirrors the git-lfs server rules:
//! acquiring a held path conflicts, and releasing someone else's lock needs
//! `force`. Failures can be injected per operation, and every call is
//! recorded for verification.
//!
//! # Example
//!
//! ```
//! use lockwork::core::types::RepoPath;
//! use lockwork::registry::mock::MockRegistry;
//! use lockwork::registry::LockRegistry;
//!
//! # let dir = tempfile::TempDir::new().unwrap();
//! # git2::Repository::init(dir.path()).unwrap();
//! # let root = lockwork::git::resolve_root(dir.path()).unwrap();
//! # tokio_test::block_on(async {
//! let registry = MockRegistry::new();
//! let path = RepoPath::new("art/hero.psd").unwrap();
//!
//! let lock = registry.acquire_lock(&root, &path).await.unwrap();
//! assert_eq!(lock.owner, "mock-user");
//! assert_eq!(registry.list_locks(&root).await.unwrap().len(), 1);
//! # });
//! ```

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::traits::{LockRecord, LockRegistry, RegistryError, Released};
use crate::core::types::{RepoPath, UtcTimestamp};
use crate::git::RepoRoot;
use crate::process::CommandError;

/// Mock registry for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockRegistry {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockRegistryInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockRegistryInner {
    /// Held locks in registry order.
    locks: Vec<LockRecord>,
    /// Owner name used for new locks.
    owner: String,
    /// Next lock id to assign.
    next_id: u64,
    /// Operation to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail list_locks with the given error.
    ListLocks(RegistryError),
    /// Fail acquire_lock with the given error.
    AcquireLock(RegistryError),
    /// Fail release_lock with the given error.
    ReleaseLock(RegistryError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    ListLocks,
    AcquireLock { path: RepoPath },
    ReleaseLock { path: RepoPath, force: bool },
}

fn refused(command: &str, message: String) -> RegistryError {
    RegistryError::Command(CommandError::Failed {
        command: command.to_string(),
        exit_code: Some(2),
        stderr: message,
    })
}

impl MockRegistry {
    /// Create an empty registry acting as "mock-user".
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockRegistryInner {
                locks: Vec::new(),
                owner: "mock-user".to_string(),
                next_id: 1,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Act as `owner` for subsequent acquisitions.
    pub fn with_owner(self, owner: impl Into<String>) -> Self {
        self.inner.lock().unwrap().owner = owner.into();
        self
    }

    /// Add a lock held by `owner`.
    ///
    /// Panics if `path` is not a valid repository path.
    pub fn with_lock(self, path: &str, owner: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.locks.push(LockRecord {
                id: id.to_string(),
                path: RepoPath::new(path).unwrap(),
                owner: owner.to_string(),
                locked_at: UtcTimestamp::now(),
            });
        }
        self
    }

    /// Add an existing lock record as-is.
    pub fn with_record(self, record: LockRecord) -> Self {
        self.inner.lock().unwrap().locks.push(record);
        self
    }

    /// Configure the mock to fail on a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Snapshot of held locks (for test verification).
    pub fn locks(&self) -> Vec<LockRecord> {
        let inner = self.inner.lock().unwrap();
        inner.locks.clone()
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, expected: &str) -> Option<RegistryError> {
        let inner = self.inner.lock().unwrap();
        match &inner.fail_on {
            Some(FailOn::ListLocks(e)) if expected == "list_locks" => Some(e.clone()),
            Some(FailOn::AcquireLock(e)) if expected == "acquire_lock" => Some(e.clone()),
            Some(FailOn::ReleaseLock(e)) if expected == "release_lock" => Some(e.clone()),
            _ => None,
        }
    }
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LockRegistry for MockRegistry {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn list_locks(&self, _root: &RepoRoot) -> Result<Vec<LockRecord>, RegistryError> {
        self.record(MockOperation::ListLocks);

        if let Some(err) = self.check_fail("list_locks") {
            return Err(err);
        }

        Ok(self.locks())
    }

    async fn acquire_lock(
        &self,
        _root: &RepoRoot,
        path: &RepoPath,
    ) -> Result<LockRecord, RegistryError> {
        self.record(MockOperation::AcquireLock { path: path.clone() });

        if let Some(err) = self.check_fail("acquire_lock") {
            return Err(err);
        }

        let mut inner = self.inner.lock().unwrap();
        if let Some(held) = inner.locks.iter().find(|l| &l.path == path) {
            return Err(RegistryError::Conflict {
                path: path.clone(),
                message: format!("Lock exists (held by {})", held.owner),
            });
        }

        let id = inner.next_id;
        inner.next_id += 1;
        let lock = LockRecord {
            id: id.to_string(),
            path: path.clone(),
            owner: inner.owner.clone(),
            locked_at: UtcTimestamp::now(),
        };
        inner.locks.push(lock.clone());
        Ok(lock)
    }

    async fn release_lock(
        &self,
        _root: &RepoRoot,
        path: &RepoPath,
        force: bool,
    ) -> Result<Released, RegistryError> {
        self.record(MockOperation::ReleaseLock {
            path: path.clone(),
            force,
        });

        if let Some(err) = self.check_fail("release_lock") {
            return Err(err);
        }

        let mut inner = self.inner.lock().unwrap();
        let idx = inner
            .locks
            .iter()
            .position(|l| &l.path == path)
            .ok_or_else(|| refused("mock unlock", format!("no matching locks found for {}", path)))?;

        if !force && inner.locks[idx].owner != inner.owner {
            return Err(refused(
                "mock unlock",
                format!("{} is locked by {}", path, inner.locks[idx].owner),
            ));
        }

        let lock = inner.locks.remove(idx);
        Ok(Released {
            path: path.clone(),
            lock: Some(lock),
        })
    }
}
