//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`RepoPath`] - Validated repository-relative file path
//! - [`UtcTimestamp`] - RFC3339 timestamp
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use lockwork::core::types::RepoPath;
//!
//! let path = RepoPath::new("art/hero.psd").unwrap();
//! assert_eq!(path.file_name(), "hero.psd");
//!
//! assert!(RepoPath::new("/etc/passwd").is_err());
//! assert!(RepoPath::new("../outside.psd").is_err());
//! ```

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid repository path: {0}")]
    InvalidRepoPath(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// A validated path relative to the repository root.
///
/// This is the natural key shared by the attribute classification and the
/// lock registry, so both sides must agree on its spelling:
/// - Cannot be empty
/// - Cannot be absolute
/// - Uses `/` as the separator
/// - Cannot contain `.` or `..` segments, empty segments, or NUL bytes
///
/// # Example
///
/// ```
/// use lockwork::core::types::RepoPath;
///
/// let path = RepoPath::new("models/ship.blend").unwrap();
/// assert_eq!(path.as_str(), "models/ship.blend");
///
/// assert!(RepoPath::new("").is_err());
/// assert!(RepoPath::new("a//b").is_err());
/// assert!(RepoPath::new("a/./b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoPath(String);

impl RepoPath {
    /// Create a new validated repository path.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRepoPath` if the path is not a clean
    /// repository-relative path.
    pub fn new(path: impl Into<String>) -> Result<Self, TypeError> {
        let path = path.into();
        Self::validate(&path)?;
        Ok(Self(path))
    }

    fn validate(path: &str) -> Result<(), TypeError> {
        if path.is_empty() {
            return Err(TypeError::InvalidRepoPath("path cannot be empty".into()));
        }
        if path.starts_with('/') {
            return Err(TypeError::InvalidRepoPath(format!(
                "'{}' is absolute",
                path
            )));
        }
        if path.contains('\0') {
            return Err(TypeError::InvalidRepoPath(
                "path cannot contain NUL bytes".into(),
            ));
        }
        for segment in path.split('/') {
            match segment {
                "" => {
                    return Err(TypeError::InvalidRepoPath(format!(
                        "'{}' contains an empty segment",
                        path
                    )))
                }
                "." | ".." => {
                    return Err(TypeError::InvalidRepoPath(format!(
                        "'{}' contains a relative segment",
                        path
                    )))
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Build a repository path from a filesystem path inside `root`.
    ///
    /// `path` may be absolute or relative to `cwd`. It is normalized
    /// lexically (no filesystem access), so it does not need to exist;
    /// a file that was deleted locally can still be unlocked.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRepoPath` if the path escapes `root` or
    /// names the root itself.
    ///
    /// # Example
    ///
    /// ```
    /// use lockwork::core::types::RepoPath;
    /// use std::path::Path;
    ///
    /// let p = RepoPath::from_fs_path(
    ///     Path::new("/work/repo"),
    ///     Path::new("/work/repo/art"),
    ///     Path::new("../models/ship.blend"),
    /// ).unwrap();
    /// assert_eq!(p.as_str(), "models/ship.blend");
    /// ```
    pub fn from_fs_path(root: &Path, cwd: &Path, path: &Path) -> Result<Self, TypeError> {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            cwd.join(path)
        };

        let mut parts: Vec<String> = Vec::new();
        for component in joined.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => parts.clear(),
                Component::CurDir => {}
                Component::ParentDir => {
                    parts.pop();
                }
                Component::Normal(s) => parts.push(s.to_string_lossy().into_owned()),
            }
        }

        let mut root_parts: Vec<String> = Vec::new();
        for component in root.components() {
            if let Component::Normal(s) = component {
                root_parts.push(s.to_string_lossy().into_owned());
            }
        }

        if parts.len() <= root_parts.len() || parts[..root_parts.len()] != root_parts[..] {
            return Err(TypeError::InvalidRepoPath(format!(
                "'{}' is outside the repository at '{}'",
                path.display(),
                root.display()
            )));
        }

        Self::new(parts[root_parts.len()..].join("/"))
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final path segment.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl TryFrom<String> for RepoPath {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RepoPath> for String {
    fn from(path: RepoPath) -> Self {
        path.0
    }
}

impl AsRef<str> for RepoPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RepoPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A UTC timestamp, serialized as RFC3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UtcTimestamp(chrono::DateTime<chrono::Utc>);

impl UtcTimestamp {
    /// Create a timestamp for the current moment.
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }

    /// Create a timestamp from a chrono DateTime.
    pub fn from_datetime(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self(dt)
    }

    /// Parse an RFC3339 timestamp with any offset, normalizing to UTC.
    ///
    /// # Example
    ///
    /// ```
    /// use lockwork::core::types::UtcTimestamp;
    ///
    /// let ts = UtcTimestamp::parse("2016-05-17T15:49:06+02:00").unwrap();
    /// assert_eq!(ts.to_string(), "2016-05-17T13:49:06+00:00");
    /// ```
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        chrono::DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&chrono::Utc)))
            .map_err(|e| TypeError::InvalidTimestamp(format!("'{}': {}", s, e)))
    }

    /// Get the underlying datetime.
    pub fn as_datetime(&self) -> &chrono::DateTime<chrono::Utc> {
        &self.0
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod repo_path {
        use super::*;

        #[test]
        fn accepts_nested_paths() {
            let p = RepoPath::new("a/b/c.psd").unwrap();
            assert_eq!(p.as_str(), "a/b/c.psd");
            assert_eq!(p.file_name(), "c.psd");
        }

        #[test]
        fn accepts_names_with_spaces_and_dots() {
            assert!(RepoPath::new("my art/.hidden file.psd").is_ok());
            assert!(RepoPath::new("v1..2.psd").is_ok());
        }

        #[test]
        fn rejects_bad_paths() {
            for bad in ["", "/abs", "a//b", "a/", "./a", "a/../b", "a\0b"] {
                assert!(RepoPath::new(bad).is_err(), "{:?} should be rejected", bad);
            }
        }

        #[test]
        fn serde_roundtrip() {
            let p = RepoPath::new("art/hero.psd").unwrap();
            let json = serde_json::to_string(&p).unwrap();
            assert_eq!(json, "\"art/hero.psd\"");
            let parsed: RepoPath = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, p);
        }

        #[test]
        fn serde_rejects_invalid() {
            let result: Result<RepoPath, _> = serde_json::from_str("\"../x\"");
            assert!(result.is_err());
        }

        #[test]
        fn from_fs_path_relative_to_cwd() {
            let p = RepoPath::from_fs_path(
                Path::new("/r"),
                Path::new("/r/sub"),
                Path::new("file.psd"),
            )
            .unwrap();
            assert_eq!(p.as_str(), "sub/file.psd");
        }

        #[test]
        fn from_fs_path_absolute() {
            let p = RepoPath::from_fs_path(
                Path::new("/r"),
                Path::new("/elsewhere"),
                Path::new("/r/a/b.psd"),
            )
            .unwrap();
            assert_eq!(p.as_str(), "a/b.psd");
        }

        #[test]
        fn from_fs_path_rejects_escape() {
            let result = RepoPath::from_fs_path(
                Path::new("/r"),
                Path::new("/r"),
                Path::new("../other/b.psd"),
            );
            assert!(result.is_err());
        }

        #[test]
        fn from_fs_path_rejects_root_itself() {
            let result = RepoPath::from_fs_path(Path::new("/r"), Path::new("/r"), Path::new("."));
            assert!(result.is_err());
        }

        #[test]
        fn from_fs_path_rejects_sibling_with_common_prefix() {
            let result = RepoPath::from_fs_path(
                Path::new("/r"),
                Path::new("/"),
                Path::new("/rr/file.psd"),
            );
            assert!(result.is_err());
        }
    }

    mod timestamp {
        use super::*;

        #[test]
        fn parse_normalizes_offset() {
            let ts = UtcTimestamp::parse("2021-01-01T10:00:00-05:00").unwrap();
            assert_eq!(ts.to_string(), "2021-01-01T15:00:00+00:00");
        }

        #[test]
        fn parse_rejects_garbage() {
            assert!(matches!(
                UtcTimestamp::parse("yesterday"),
                Err(TypeError::InvalidTimestamp(_))
            ));
        }

        #[test]
        fn ordering_follows_time() {
            let a = UtcTimestamp::parse("2021-01-01T00:00:00Z").unwrap();
            let b = UtcTimestamp::parse("2021-01-02T00:00:00Z").unwrap();
            assert!(a < b);
        }
    }
}
