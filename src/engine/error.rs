//! engine::error
//!
//! Errors surfaced by engine operations.

use thiserror::Error;

use crate::core::store::StoreError;
use crate::git::{ClassifyError, LocateError};
use crate::registry::RegistryError;

/// Errors from engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No repository contains the given path.
    #[error(transparent)]
    Locate(#[from] LocateError),

    /// The concurrent listing failed on one or both sides.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// A lock or unlock request failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Reading or writing a config file failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One or both failures from listing lockable files.
///
/// At least one side is always present. Both sides are awaited before this
/// error is built, so it reports everything that went wrong.
#[derive(Debug, Clone)]
pub struct AggregateError {
    /// Attribute classification failure, if any
    pub classification: Option<ClassifyError>,
    /// Lock listing failure, if any
    pub registry: Option<RegistryError>,
}

impl AggregateError {
    /// Number of failed sides (1 or 2).
    pub fn failure_count(&self) -> usize {
        usize::from(self.classification.is_some()) + usize::from(self.registry.is_some())
    }
}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "could not list lockable files")?;
        let mut sep = ": ";
        if let Some(e) = &self.classification {
            write!(f, "{}{}", sep, e)?;
            sep = "; ";
        }
        if let Some(e) = &self.registry {
            write!(f, "{}{}", sep, e)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_both_failures() {
        let err = AggregateError {
            classification: Some(ClassifyError::Decode("bad".into())),
            registry: Some(RegistryError::Decode("worse".into())),
        };
        assert_eq!(err.failure_count(), 2);

        let msg = err.to_string();
        assert!(msg.contains("bad; "), "{}", msg);
        assert!(msg.contains("worse"), "{}", msg);
    }

    #[test]
    fn single_failure() {
        let err = AggregateError {
            classification: None,
            registry: Some(RegistryError::Decode("x".into())),
        };
        assert_eq!(err.failure_count(), 1);
        assert!(!err.to_string().contains(';'));
    }
}
