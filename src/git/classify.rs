//! git::classify
//!
//! The classification seam: which tracked files are lockable.
//!
//! A file is lockable when its resolved `lockable` attribute is set. The
//! engine depends only on the [`Classifier`] trait, so tests can substitute
//! a [`StaticClassifier`] for the subprocess-backed [`Git`](super::Git).

use async_trait::async_trait;
use thiserror::Error;

use super::RepoRoot;
use crate::core::types::RepoPath;
use crate::process::CommandError;

/// Errors from attribute classification.
#[derive(Debug, Clone, Error)]
pub enum ClassifyError {
    /// Listing files or resolving attributes failed.
    #[error("attribute classification failed: {0}")]
    Command(#[from] CommandError),

    /// The attribute resolver produced output that could not be decoded.
    #[error("malformed check-attr output: {0}")]
    Decode(String),
}

/// Source of the lockable file set for a repository.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Name of this classifier for logging.
    fn name(&self) -> &'static str;

    /// Every tracked file whose `lockable` attribute is set.
    ///
    /// Paths are unique and in the order the file listing produced them.
    async fn lockable_paths(&self, root: &RepoRoot) -> Result<Vec<RepoPath>, ClassifyError>;
}

/// Decode NUL-delimited `check-attr -z` output into the set paths.
///
/// The stream is a sequence of `path NUL attribute NUL value NUL` triples.
/// Only triples whose value is exactly `set` are kept; duplicates keep
/// their first position.
pub(crate) fn parse_check_attr(output: &[u8]) -> Result<Vec<RepoPath>, ClassifyError> {
    let mut fields: Vec<&[u8]> = output.split(|b| *b == 0).collect();
    // A well-formed stream ends with a NUL, leaving one empty trailer.
    if fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }

    if fields.len() % 3 != 0 {
        return Err(ClassifyError::Decode(format!(
            "expected path/attribute/value triples, got {} fields",
            fields.len()
        )));
    }

    let mut seen = std::collections::HashSet::new();
    let mut paths = Vec::new();
    for triple in fields.chunks_exact(3) {
        if triple[2] != b"set" {
            continue;
        }
        let raw = std::str::from_utf8(triple[0]).map_err(|e| {
            ClassifyError::Decode(format!(
                "path {:?} is not UTF-8: {}",
                String::from_utf8_lossy(triple[0]),
                e
            ))
        })?;
        let path = RepoPath::new(raw)
            .map_err(|e| ClassifyError::Decode(format!("path {:?}: {}", raw, e)))?;
        if seen.insert(path.clone()) {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// A classifier with a fixed answer.
///
/// Used in tests and for driving the engine without a working tree.
///
/// # Example
///
/// ```
/// use lockwork::core::types::RepoPath;
/// use lockwork::git::StaticClassifier;
///
/// let classifier = StaticClassifier::new(vec![RepoPath::new("a.psd").unwrap()]);
/// ```
#[derive(Debug, Clone)]
pub struct StaticClassifier {
    answer: Result<Vec<RepoPath>, ClassifyError>,
}

impl StaticClassifier {
    /// Always answer with `paths`.
    pub fn new(paths: Vec<RepoPath>) -> Self {
        Self { answer: Ok(paths) }
    }

    /// Always fail with `error`.
    pub fn failing(error: ClassifyError) -> Self {
        Self { answer: Err(error) }
    }
}

#[async_trait]
impl Classifier for StaticClassifier {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn lockable_paths(&self, _root: &RepoRoot) -> Result<Vec<RepoPath>, ClassifyError> {
        self.answer.clone()
    }
}
