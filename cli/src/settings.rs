//! User settings for the db CLI
//!
//! Handles loading `~/.db/settings.yml`. Every field has a default, so a
//! partial file only overrides what it names.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output;
use crate::pg::Operation;

pub const SETTINGS_DIR: &str = ".db";
pub const SETTINGS_FILE: &str = "settings.yml";

// ============================================================================
// Client
// ============================================================================

/// Database client driving the create/drop/dump/restore commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Client {
    #[default]
    #[serde(alias = "postgres", alias = "postgresql")]
    Pg,
}

impl Client {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pg => "pg",
        }
    }
}

impl std::fmt::Display for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Main settings structure
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub current_database: Client,
    pub databases: Databases,
    pub rails: RailsSettings,
}

/// Per-client settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Databases {
    pub pg: PgSettings,
}

/// PostgreSQL client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PgSettings {
    pub options: PgOptions,
    pub archive_file: PathBuf,
}

impl Default for PgSettings {
    fn default() -> Self {
        Self {
            options: PgOptions::default(),
            archive_file: PathBuf::from("db/archive.dump"),
        }
    }
}

/// Default option strings, one per PostgreSQL binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PgOptions {
    pub create: String,
    pub drop: String,
    pub dump: String,
    pub restore: String,
}

impl Default for PgOptions {
    fn default() -> Self {
        Self {
            create: "-w".into(),
            drop: "-w".into(),
            dump: "-Fc -w".into(),
            restore: "-O -w".into(),
        }
    }
}

impl PgOptions {
    /// Option string configured for `op`
    pub fn get(&self, op: Operation) -> &str {
        match op {
            Operation::Create => &self.create,
            Operation::Drop => &self.drop,
            Operation::Dump => &self.dump,
            Operation::Restore => &self.restore,
        }
    }
}

/// Rails integration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RailsSettings {
    pub enabled: bool,
    pub env: String,
}

impl Default for RailsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            env: "development".into(),
        }
    }
}

// ============================================================================
// Settings implementation
// ============================================================================

impl Settings {
    /// `~/.db/settings.yml`, if a home directory can be determined
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(SETTINGS_DIR).join(SETTINGS_FILE))
    }

    /// Load from specific path
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SettingsError::NotFound(path.into())
            } else {
                SettingsError::Io(path.into(), e)
            }
        })?;

        // An empty file deserializes to unit, not a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| SettingsError::Parse(path.into(), e))
    }

    /// Load from `path`, reporting problems and falling back to defaults
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(settings) => {
                tracing::debug!(path = %path.display(), client = %settings.current_database, "loaded settings");
                settings
            }
            Err(SettingsError::NotFound(_)) => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                Self::default()
            }
            Err(e) => {
                eprintln!("{}", output::warn_line(&format!("{e}. Using default settings.")));
                Self::default()
            }
        }
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String, SettingsError> {
        serde_yaml::to_string(self).map_err(SettingsError::Serialize)
    }

    /// Write to `path`, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::Io(parent.into(), e))?;
        }
        std::fs::write(path, self.to_yaml()?).map_err(|e| SettingsError::Io(path.into(), e))
    }

    /// Settings of the selected database client
    #[inline]
    pub fn pg(&self) -> &PgSettings {
        match self.current_database {
            Client::Pg => &self.databases.pg,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse {}: {}", .0.display(), .1)]
    Parse(PathBuf, #[source] serde_yaml::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

// ============================================================================
// Tests
// ============================================================================
