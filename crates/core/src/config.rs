//! Application configuration
//!
//! Loaded from `config.toml` in the platform config directory. Every field
//! has a default, so a missing file or a partial file is fine.

use std::path::{Path, PathBuf};

use chrono::Duration;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "qrattend.db";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub sessions: SessionConfig,
    pub dashboard: DashboardConfig,
    pub log: LogConfig,
}

/// Where the database lives
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform data directory
    pub database: Option<PathBuf>,
}

/// Session defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub default_duration_minutes: u32,
    /// Scans later than this after a session opens count as late
    pub late_after_minutes: u32,
    /// Recorded as the creator of generated sessions
    pub created_by: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_duration_minutes: 60,
            late_after_minutes: 15,
            created_by: None,
        }
    }
}

impl SessionConfig {
    pub fn late_after(&self) -> Duration {
        Duration::minutes(i64::from(self.late_after_minutes))
    }
}

/// Dashboard list sizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub recent_sessions: u32,
    pub recent_activity: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_sessions: 4,
            recent_activity: 4,
        }
    }
}

/// Logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a file, falling back to defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                info!(path = %path.display(), "Loaded configuration");
                Self::from_toml(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No configuration file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load from the platform config directory
    pub fn load_default() -> Result<Self> {
        Self::load(&project_dirs()?.config_dir().join(CONFIG_FILE))
    }

    /// Resolve the database path, preferring the configured override
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.storage.database {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.data_dir().join(DATABASE_FILE)),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "qrattend", "qrattend").ok_or_else(|| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine data directory",
        ))
    })
}
