//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! Lockwork has one configuration scope: the user. Repository-scoped
//! settings are the committed `.lfsconfig` and `.gitattributes` files,
//! which are handled by [`store`](crate::core::store), not here.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order, first existing file wins:
//! 1. `$LOCKWORK_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/lockwork/config.toml`
//! 3. `~/.lockwork/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use lockwork::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("git: {}", config.git_program());
//! println!("interactive: {}", config.interactive());
//! ```

pub mod schema;

pub use schema::GlobalConfig;

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded configuration with defaults applied through accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated. A missing config file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let candidates = search_paths(
            std::env::var_os("LOCKWORK_CONFIG"),
            std::env::var_os("XDG_CONFIG_HOME"),
            dirs::home_dir(),
        );

        match candidates.into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Configuration with the given values and no backing file.
    pub fn from_global(global: GlobalConfig) -> Self {
        Self {
            global,
            global_path: None,
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let global: GlobalConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        global.validate()?;

        debug!(path = %path.display(), "loaded config");
        Ok(Self {
            global,
            global_path: Some(path.to_path_buf()),
        })
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// The git executable.
    ///
    /// Defaults to "git".
    pub fn git_program(&self) -> &str {
        self.global.git.as_deref().unwrap_or("git")
    }

    /// A git-lfs executable to run directly, if configured.
    ///
    /// When `None`, lock commands run as `git lfs ...`.
    pub fn lfs_program(&self) -> Option<&str> {
        self.global.lfs.as_deref()
    }

    /// Deadline for each external command, if configured.
    pub fn command_timeout(&self) -> Option<Duration> {
        self.global.command_timeout_secs.map(Duration::from_secs)
    }

    /// Check if interactive mode is enabled by default.
    ///
    /// Defaults to `true` if not configured.
    pub fn interactive(&self) -> bool {
        self.global.interactive.unwrap_or(true)
    }

    /// Get the path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }
}

/// Candidate config file locations, most specific first.
fn search_paths(
    explicit: Option<OsString>,
    xdg_config_home: Option<OsString>,
    home: Option<PathBuf>,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(path) = explicit.filter(|p| !p.is_empty()) {
        paths.push(PathBuf::from(path));
    }
    if let Some(xdg) = xdg_config_home.filter(|p| !p.is_empty()) {
        paths.push(PathBuf::from(xdg).join("lockwork/config.toml"));
    }
    if let Some(home) = home {
        paths.push(home.join(".lockwork/config.toml"));
    }
    paths
}
