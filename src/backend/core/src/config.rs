//! Configuration management.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file
//! 3. Environment variables prefixed `SUBSCORE`, nested with `__`
//!    (e.g. `SUBSCORE__PATHS__WORKING_DIR=/srv/subs`)

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::telemetry::LoggingConfig;

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Input and output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Directory the file names below are relative to
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    /// Collector output (subscribers and comments)
    #[serde(default = "default_primary_log")]
    pub primary_log: PathBuf,

    /// Hand-maintained supporter list
    #[serde(default = "default_manual_log")]
    pub manual_log: PathBuf,

    /// Report destination
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            primary_log: default_primary_log(),
            manual_log: default_manual_log(),
            output: default_output(),
        }
    }
}

/// Concrete file locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub primary_log: PathBuf,
    pub manual_log: PathBuf,
    pub output: PathBuf,
}

impl PathsConfig {
    /// Join each file name onto the working directory. Absolute file names
    /// are kept as they are.
    pub fn resolve(&self) -> ResolvedPaths {
        ResolvedPaths {
            primary_log: self.working_dir.join(&self.primary_log),
            manual_log: self.working_dir.join(&self.manual_log),
            output: self.working_dir.join(&self.output),
        }
    }
}

// Default value functions
fn default_working_dir() -> PathBuf { PathBuf::from(".") }
fn default_primary_log() -> PathBuf { PathBuf::from("results.csv") }
fn default_manual_log() -> PathBuf { PathBuf::from("manual-sub-list.csv") }
fn default_output() -> PathBuf { PathBuf::from("subscribers.json") }

const ENV_PREFIX: &str = "SUBSCORE";

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        Ok(cfg)
    }

    /// Load from a specific file path, with the environment layered on top.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        Ok(cfg)
    }

    /// `from_file` when a path is given, otherwise `load`.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Loading for the batch binary. A named file must load; without one, an
    /// environment that fails to deserialize falls back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::load().unwrap_or_else(|e| {
                eprintln!("Warning: Could not load config: {}. Using defaults.", e);
                Self::default()
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::telemetry::LogFormat;

    #[test]
    fn test_default_paths() {
        let resolved = PathsConfig::default().resolve();
        assert_eq!(resolved.primary_log, Path::new(".").join("results.csv"));
        assert_eq!(resolved.manual_log, Path::new(".").join("manual-sub-list.csv"));
        assert_eq!(resolved.output, Path::new(".").join("subscribers.json"));
    }

    #[test]
    fn test_resolve_joins_working_dir() {
        let paths = PathsConfig {
            working_dir: PathBuf::from("data"),
            output: PathBuf::from("out/report.json"),
            ..PathsConfig::default()
        };
        let resolved = paths.resolve();
        assert_eq!(resolved.primary_log, Path::new("data").join("results.csv"));
        assert_eq!(resolved.output, Path::new("data").join("out/report.json"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subscore.toml");
        std::fs::write(
            &path,
            r#"
[paths]
working_dir = "/srv/subs"
manual_log = "extra.csv"

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.paths.working_dir, PathBuf::from("/srv/subs"));
        assert_eq!(config.paths.manual_log, PathBuf::from("extra.csv"));
        assert_eq!(config.paths.primary_log, PathBuf::from("results.csv"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_missing_config_file_is_configuration_error() {
        let err = Config::from_file("/no/such/subscore.toml").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ConfigurationError);
    }

    #[test]
    fn test_named_config_file_never_falls_back() {
        let err = Config::load_or_default(Some(Path::new("/no/such/subscore.toml"))).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ConfigurationError);
        assert_eq!(err.code().exit_code(), 78);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subscore.toml");
        std::fs::write(&path, "[paths\nworking_dir = ").unwrap();
        let err = Config::load_or_default(Some(&path)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ConfigurationError);
    }
}
