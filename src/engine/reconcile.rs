//! engine::reconcile
//!
//! Merge of classified lockable paths with registry locks.
//!
//! # Algorithm
//!
//! 1. Index locks by path, keeping registry order within each path.
//! 2. For each classified path (first occurrence only), take the first
//!    unconsumed lock with that path.
//! 3. Append every lock nobody claimed as a missing entry, in registry
//!    order.
//!
//! The merge is pure and linear in the input sizes.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::core::types::{RepoPath, UtcTimestamp};
use crate::registry::LockRecord;

/// One file's merged lock state.
///
/// `is_missing` is true only for a lock whose path is not currently
/// classified lockable (an orphaned lock); such a view always carries its
/// lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileLockView {
    pub path: RepoPath,
    pub lock: Option<LockRecord>,
    pub is_missing: bool,
}

impl FileLockView {
    /// Whether anyone holds a lock on this path.
    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    /// Display name of the lock holder.
    pub fn owner(&self) -> Option<&str> {
        self.lock.as_ref().map(|l| l.owner.as_str())
    }

    /// When the lock was taken.
    pub fn locked_at(&self) -> Option<UtcTimestamp> {
        self.lock.as_ref().map(|l| l.locked_at)
    }
}

/// Merge classified paths with registry locks.
///
/// Classified entries come first, in classification order, followed by
/// orphaned locks.
pub fn merge(classified: Vec<RepoPath>, locks: Vec<LockRecord>) -> Vec<FileLockView> {
    let mut by_path: HashMap<RepoPath, VecDeque<usize>> = HashMap::new();
    for (idx, lock) in locks.iter().enumerate() {
        by_path.entry(lock.path.clone()).or_default().push_back(idx);
    }
    let mut slots: Vec<Option<LockRecord>> = locks.into_iter().map(Some).collect();

    let mut seen = HashSet::new();
    let mut views = Vec::with_capacity(classified.len());
    for path in classified {
        if !seen.insert(path.clone()) {
            continue;
        }
        let lock = by_path
            .get_mut(&path)
            .and_then(VecDeque::pop_front)
            .and_then(|idx| slots[idx].take());
        views.push(FileLockView {
            path,
            lock,
            is_missing: false,
        });
    }

    views.extend(slots.into_iter().flatten().map(|lock| FileLockView {
        path: lock.path.clone(),
        lock: Some(lock),
        is_missing: true,
    }));
    views
}
