//! YAML configuration.

use crate::datastore::TableNames;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "FACEGATE_CONFIG";

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub tables: TableNames,
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite file. Relative paths resolve against the data directory.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("facegate.sqlite")
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VisionConfig {
    /// File the capture process writes encodings to.
    #[serde(default = "default_encoding_file")]
    pub encoding_file: PathBuf,
    /// Minimum similarity in percent.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            encoding_file: default_encoding_file(),
            tolerance: default_tolerance(),
        }
    }
}

fn default_encoding_file() -> PathBuf {
    PathBuf::from("capture.txt")
}

fn default_tolerance() -> f64 {
    60.0
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RuntimeConfig {
    /// Upper bound for one CLI command, in seconds.
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    /// Where the JSONL audit log goes. Defaults to `<data dir>/logs`.
    #[serde(default)]
    pub audit_log_dir: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: default_command_timeout_secs(),
            audit_log_dir: None,
        }
    }
}

fn default_command_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidTolerance { value: f64 },
    ZeroTimeout,
    EmptyPath { field: &'static str },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTolerance { value } => {
                write!(f, "vision.tolerance must be within 0..=100, got {}", value)
            }
            Self::ZeroTimeout => write!(f, "runtime.command_timeout_secs must be positive"),
            Self::EmptyPath { field } => write!(f, "{} must not be empty", field),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Application data directory, e.g. `~/.local/share/facegate`.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("facegate")
}

/// Default config file location, e.g. `~/.config/facegate/config.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("facegate").join("config.yaml"))
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file as YAML: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads from `--config`, then `FACEGATE_CONFIG`, then the platform
    /// config dir. Only the last source may be absent, in which case the
    /// defaults apply.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            return Self::load(Path::new(&path));
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                tracing::debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let tolerance = self.vision.tolerance;
        if !(0.0..=100.0).contains(&tolerance) {
            return Err(ConfigError::InvalidTolerance { value: tolerance });
        }
        if self.runtime.command_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath { field: "database.path" });
        }
        if self.vision.encoding_file.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath {
                field: "vision.encoding_file",
            });
        }
        Ok(())
    }

    /// Absolute database path, relative ones placed under `base`.
    pub fn database_path(&self, base: &Path) -> PathBuf {
        base.join(&self.database.path)
    }

    pub fn encoding_file(&self, base: &Path) -> PathBuf {
        base.join(&self.vision.encoding_file)
    }

    pub fn audit_log_dir(&self, base: &Path) -> PathBuf {
        match &self.runtime.audit_log_dir {
            Some(dir) => base.join(dir),
            None => base.join("logs"),
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
