//! core::config
//!
//! Project configuration loading.
//!
//! # Locations
//!
//! Searched in order at the workspace root:
//! 1. `monoguard.toml` (canonical)
//! 2. `.commonality/config.json` (compatibility, warns)
//!
//! A missing config is not an error: the rule set is empty and every
//! registered check applies to every package. A config that exists but
//! cannot be parsed is fatal for the run.
//!
//! # Example
//!
//! ```no_run
//! use monoguard::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Path::new("/path/to/workspace")).unwrap();
//! for warning in &result.warnings {
//!     eprintln!("warning: {}", warning.message);
//! }
//! println!("{} constraint rule(s)", result.config.project.constraints.len());
//! ```

pub mod schema;

pub use schema::ProjectConfig;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Canonical config file name.
pub const CONFIG_FILE: &str = "monoguard.toml";

/// Compatibility config location.
pub const COMPAT_CONFIG_FILE: &str = ".commonality/config.json";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{}': {message}", path.display())]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("unknown check '{name}' bound to '{tag}'")]
    UnknownCheck { name: String, tag: String },
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Loaded configuration for one run.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,
    /// Path of the file the config was read from (if any)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the workspace root.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read,
    /// parsed, or validated.
    pub fn load(root: &Path) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let canonical = root.join(CONFIG_FILE);
        if canonical.exists() {
            let project = Self::read_toml(&canonical)?;
            project.validate()?;
            return Ok(ConfigLoadResult {
                config: Config {
                    project,
                    path: Some(canonical),
                },
                warnings,
            });
        }

        let compat = root.join(COMPAT_CONFIG_FILE);
        if compat.exists() {
            warnings.push(ConfigWarning {
                message: format!(
                    "Using compatibility config location. Consider moving it to '{}'",
                    canonical.display()
                ),
                path: compat.clone(),
            });
            let project = Self::read_json(&compat)?;
            project.validate()?;
            return Ok(ConfigLoadResult {
                config: Config {
                    project,
                    path: Some(compat),
                },
                warnings,
            });
        }

        log::debug!("no project config under {}", root.display());
        Ok(ConfigLoadResult {
            config: Config::default(),
            warnings,
        })
    }

    fn read_toml(path: &Path) -> Result<ProjectConfig, ConfigError> {
        let contents = Self::read(path)?;
        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn read_json(path: &Path) -> Result<ProjectConfig, ConfigError> {
        let contents = Self::read(path)?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn read(path: &Path) -> Result<String, ConfigError> {
        fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Path of the loaded config file, if one was found.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_is_default() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(dir.path()).unwrap();

        assert!(result.warnings.is_empty());
        assert!(result.config.path().is_none());
        assert!(result.config.project.constraints.is_empty());
    }

    #[test]
    fn loads_canonical_toml() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[constraints.\"*\"]\nallow = \"*\"\n",
        )
        .unwrap();

        let result = Config::load(dir.path()).unwrap();
        assert!(result.warnings.is_empty());
        assert_eq!(result.config.project.constraints.len(), 1);
    }

    #[test]
    fn compat_location_warns() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".commonality")).unwrap();
        fs::write(
            dir.path().join(COMPAT_CONFIG_FILE),
            r#"{"constraints": {"ui": {"disallow": ["data"]}}}"#,
        )
        .unwrap();

        let result = Config::load(dir.path()).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.config.project.constraints.len(), 1);
    }

    #[test]
    fn canonical_wins_over_compat() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".commonality")).unwrap();
        fs::write(dir.path().join(COMPAT_CONFIG_FILE), "{ broken").unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "").unwrap();

        let result = Config::load(dir.path()).unwrap();
        assert!(result.config.path().unwrap().ends_with(CONFIG_FILE));
    }

    #[test]
    fn unparsable_config_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[constraints.ui]\nallow = 3\n").unwrap();

        let err = Config::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
