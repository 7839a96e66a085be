//! Rails integration
//!
//! Reads `config/database.yml` for the configured environment and builds the
//! `rake`/`rails` commands used by migrate, seed and remigrate.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::command::CommandLine;
use crate::error::CliError;
use crate::output;
use crate::settings::RailsSettings;

pub const DATABASE_FILE: &str = "config/database.yml";

/// Connection values of one `database.yml` environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DatabaseEnv {
    pub encoding: Option<String>,
    pub username: Option<String>,
    pub host: Option<String>,
    pub database: Option<String>,
}

/// Rails support state for one CLI invocation
#[derive(Debug, Clone)]
pub struct Rails {
    env: String,
    database: Option<DatabaseEnv>,
}

impl Rails {
    /// Rails support switched off
    pub fn disabled(env: impl Into<String>) -> Self {
        Self {
            env: env.into(),
            database: None,
        }
    }

    /// Rails support backed by already-parsed database settings
    pub fn enabled(env: impl Into<String>, database: DatabaseEnv) -> Self {
        Self {
            env: env.into(),
            database: Some(database),
        }
    }

    /// Load `config/database.yml` under `root`.
    ///
    /// Support stays disabled when turned off in settings, when the file is
    /// missing, when it cannot be parsed, or when it has no section for the
    /// configured environment. The last two are reported.
    pub fn load(root: &Path, settings: &RailsSettings) -> Self {
        let mut rails = Self::disabled(&settings.env);
        if !settings.enabled {
            tracing::debug!("rails support disabled in settings");
            return rails;
        }

        let path = root.join(DATABASE_FILE);
        match read_env(&path, &settings.env) {
            Ok(Some(database)) => {
                tracing::debug!(path = %path.display(), env = %settings.env, "loaded rails database settings");
                rails.database = Some(database);
            }
            Ok(None) => {
                tracing::debug!(path = %path.display(), "no rails database settings, rails support disabled");
            }
            Err(e @ RailsError::MissingEnv { .. }) => {
                eprintln!("{}", output::warn_line(&e.to_string()));
            }
            Err(e) => {
                tracing::debug!(error = %e, "rails database settings rejected");
                eprintln!(
                    "{}",
                    output::err_line(&format!("Invalid Rails database settings: {}.", DATABASE_FILE))
                );
            }
        }
        rails
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.database.is_some()
    }

    #[inline]
    pub fn env(&self) -> &str {
        &self.env
    }

    /// Database settings for the current environment, when enabled
    #[inline]
    pub fn database(&self) -> Option<&DatabaseEnv> {
        self.database.as_ref()
    }

    /// `rake <task>` for the current environment
    pub fn rake(&self, task: &str) -> CommandLine {
        CommandLine::new("rake")
            .arg(task)
            .env("RAILS_ENV", &self.env)
    }

    /// `rails generate <args..>` for the current environment
    pub fn generate<I, S>(&self, args: I) -> CommandLine
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandLine::new("rails")
            .arg("generate")
            .args(args)
            .env("RAILS_ENV", &self.env)
    }

    /// `rake db:migrate`, only available with Rails support
    pub fn migrate(&self) -> Result<CommandLine, CliError> {
        self.require_enabled()?;
        Ok(self.rake("db:migrate"))
    }

    /// `rake db:seed`, only available with Rails support
    pub fn seed(&self) -> Result<CommandLine, CliError> {
        self.require_enabled()?;
        Ok(self.rake("db:seed"))
    }

    fn require_enabled(&self) -> Result<(), CliError> {
        if self.is_enabled() {
            Ok(())
        } else {
            Err(CliError::RailsDisabled)
        }
    }
}

/// Read the `env` section of a `database.yml`; `Ok(None)` when the file is absent.
pub fn read_env(path: &Path, env: &str) -> Result<Option<DatabaseEnv>, RailsError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(RailsError::Io(path.into(), e)),
    };

    parse_env(&content, env)
        .map_err(|e| RailsError::Parse(path.into(), e))?
        .map(Some)
        .ok_or_else(|| RailsError::MissingEnv {
            path: path.into(),
            env: env.into(),
        })
}

/// Parse a `database.yml` document and extract the `env` section.
///
/// Merge keys (`<<: *default`) are resolved first, the way Rails loads the file.
pub fn parse_env(content: &str, env: &str) -> Result<Option<DatabaseEnv>, serde_yaml::Error> {
    let mut document: serde_yaml::Value = serde_yaml::from_str(content)?;
    document.apply_merge()?;

    match document.get(env) {
        Some(section) => serde_yaml::from_value(section.clone()).map(Some),
        None => Ok(None),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RailsError {
    #[error("failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse {}: {}", .0.display(), .1)]
    Parse(PathBuf, #[source] serde_yaml::Error),

    #[error("no '{env}' environment in {}. Rails support disabled.", path.display())]
    MissingEnv { path: PathBuf, env: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DATABASE_YML: &str = r#"
default: &default
  adapter: postgresql
  encoding: unicode
  host: localhost
  username: app
  pool: 5

development:
  <<: *default
  database: app_development

test:
  <<: *default
  database: app_test
  host: db.internal
"#;

    fn settings(env: &str) -> RailsSettings {
        RailsSettings {
            enabled: true,
            env: env.into(),
        }
    }

    #[test]
    fn merge_keys_are_resolved() {
        let dev = parse_env(DATABASE_YML, "development").unwrap().unwrap();
        assert_eq!(dev.encoding.as_deref(), Some("unicode"));
        assert_eq!(dev.username.as_deref(), Some("app"));
        assert_eq!(dev.host.as_deref(), Some("localhost"));
        assert_eq!(dev.database.as_deref(), Some("app_development"));
    }

    #[test]
    fn section_overrides_merged_values() {
        let test = parse_env(DATABASE_YML, "test").unwrap().unwrap();
        assert_eq!(test.host.as_deref(), Some("db.internal"));
        assert_eq!(test.database.as_deref(), Some("app_test"));
    }

    #[test]
    fn missing_env_section() {
        assert_eq!(parse_env(DATABASE_YML, "production").unwrap(), None);
    }

    #[test]
    fn load_enables_with_database_yml() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(dir.path().join(DATABASE_FILE), DATABASE_YML).unwrap();

        let rails = Rails::load(dir.path(), &settings("development"));
        assert!(rails.is_enabled());
        assert_eq!(rails.env(), "development");
    }

    #[test]
    fn load_without_database_yml_disables() {
        let dir = tempdir().unwrap();
        let rails = Rails::load(dir.path(), &settings("development"));
        assert!(!rails.is_enabled());
    }

    #[test]
    fn load_respects_disabled_setting() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(dir.path().join(DATABASE_FILE), DATABASE_YML).unwrap();

        let rails = Rails::load(
            dir.path(),
            &RailsSettings {
                enabled: false,
                env: "development".into(),
            },
        );
        assert!(!rails.is_enabled());
    }

    #[test]
    fn invalid_database_yml_disables() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(dir.path().join(DATABASE_FILE), "development: [oops").unwrap();

        let path = dir.path().join(DATABASE_FILE);
        assert!(matches!(read_env(&path, "development"), Err(RailsError::Parse(..))));
        assert!(!Rails::load(dir.path(), &settings("development")).is_enabled());
    }

    #[test]
    fn unknown_env_is_reported() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        let path = dir.path().join(DATABASE_FILE);
        std::fs::write(&path, DATABASE_YML).unwrap();

        assert!(matches!(read_env(&path, "staging"), Err(RailsError::MissingEnv { .. })));
        assert!(!Rails::load(dir.path(), &settings("staging")).is_enabled());
    }

    #[test]
    fn migrate_requires_rails() {
        let rails = Rails::disabled("development");
        assert!(matches!(rails.migrate(), Err(CliError::RailsDisabled)));
        assert!(matches!(rails.seed(), Err(CliError::RailsDisabled)));
    }

    #[test]
    fn rake_tasks_carry_env() {
        let rails = Rails::enabled("test", DatabaseEnv::default());
        let migrate = rails.migrate().unwrap();
        assert_eq!(migrate.to_string(), "rake db:migrate");
        assert_eq!(migrate.envs(), &[("RAILS_ENV".to_string(), "test".to_string())]);
        assert_eq!(rails.seed().unwrap().to_string(), "rake db:seed");
        assert_eq!(
            rails.generate(["generator", "remigrate"]).to_string(),
            "rails generate generator remigrate"
        );
    }
}
