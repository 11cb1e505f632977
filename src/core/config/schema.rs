//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing so that a bad value fails at
//! load time rather than when the first command runs.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// git = "/usr/local/bin/git"
/// lfs = "git-lfs"
/// command_timeout_secs = 30
/// interactive = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Git executable (default: "git")
    pub git: Option<String>,

    /// git-lfs executable to run directly instead of `git lfs`
    pub lfs: Option<String>,

    /// Deadline for each external command
    pub command_timeout_secs: Option<u64>,

    /// Default interactive mode
    pub interactive: Option<bool>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, program) in [("git", &self.git), ("lfs", &self.lfs)] {
            if let Some(program) = program {
                if program.trim().is_empty() {
                    return Err(ConfigError::InvalidValue(format!(
                        "'{}' cannot be empty",
                        key
                    )));
                }
            }
        }

        if self.command_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "command_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
