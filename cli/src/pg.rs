//! PostgreSQL command builder
//!
//! Turns the configured option strings, user overrides and Rails database
//! settings into `createdb`/`dropdb`/`pg_dump`/`pg_restore` command lines.

use std::path::Path;

use crate::command::CommandLine;
use crate::rails::{DatabaseEnv, Rails};
use crate::settings::PgSettings;

/// Database operations backed by a PostgreSQL client binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Drop,
    Dump,
    Restore,
}

impl Operation {
    #[inline]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Create => "createdb",
            Self::Drop => "dropdb",
            Self::Dump => "pg_dump",
            Self::Restore => "pg_restore",
        }
    }
}

/// Builds PostgreSQL client command lines for the current project.
#[derive(Debug, Clone, Copy)]
pub struct Postgres<'a> {
    settings: &'a PgSettings,
    rails: &'a Rails,
}

impl<'a> Postgres<'a> {
    pub fn new(settings: &'a PgSettings, rails: &'a Rails) -> Self {
        Self { settings, rails }
    }

    /// Archive file, relative to the project root
    #[inline]
    pub fn archive_file(&self) -> &'a Path {
        &self.settings.archive_file
    }

    /// `createdb [opts] -E enc -O user -U user -h host database`
    pub fn create(&self, overrides: &[String]) -> CommandLine {
        let command = self.base(Operation::Create, overrides);
        match self.database() {
            Some(db) => command
                .flag("-E", db.encoding.as_deref())
                .flag("-O", db.username.as_deref())
                .flag("-U", db.username.as_deref())
                .flag("-h", db.host.as_deref())
                .arg_opt(db.database.as_deref()),
            None => command,
        }
    }

    /// `dropdb [opts] -U user -h host database`
    pub fn drop(&self, overrides: &[String]) -> CommandLine {
        let command = self.base(Operation::Drop, overrides);
        match self.database() {
            Some(db) => command
                .flag("-U", db.username.as_deref())
                .flag("-h", db.host.as_deref())
                .arg_opt(db.database.as_deref()),
            None => command,
        }
    }

    /// `pg_dump [opts] -U user -h host -f archive database`
    pub fn dump(&self, overrides: &[String]) -> CommandLine {
        let archive = self.archive_arg();
        match self.database() {
            Some(db) => self
                .base(Operation::Dump, overrides)
                .flag("-U", db.username.as_deref())
                .flag("-h", db.host.as_deref())
                .flag("-f", Some(archive.as_str()))
                .arg_opt(db.database.as_deref()),
            None => self
                .base(Operation::Dump, overrides)
                .flag("-f", Some(archive.as_str())),
        }
    }

    /// `pg_restore [opts] -h host -U user -d database archive`
    pub fn restore(&self, overrides: &[String]) -> CommandLine {
        let command = self.base(Operation::Restore, overrides);
        let command = match self.database() {
            Some(db) => command
                .flag("-h", db.host.as_deref())
                .flag("-U", db.username.as_deref())
                .flag("-d", db.database.as_deref()),
            None => command,
        };
        command.arg(self.archive_arg())
    }

    /// Overrides replace the configured defaults entirely.
    fn base(&self, op: Operation, overrides: &[String]) -> CommandLine {
        let command = CommandLine::new(op.program());
        if overrides.is_empty() {
            command.options(self.settings.options.get(op))
        } else {
            command.args(overrides.iter().map(String::as_str))
        }
    }

    fn database(&self) -> Option<&'a DatabaseEnv> {
        self.rails.database()
    }

    fn archive_arg(&self) -> String {
        self.settings.archive_file.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    fn rails() -> Rails {
        Rails::enabled(
            "development",
            DatabaseEnv {
                encoding: Some("utf8".into()),
                username: Some("app".into()),
                host: Some("localhost".into()),
                database: Some("app_development".into()),
            },
        )
    }

    #[test]
    fn create_with_rails() {
        let settings = Settings::default();
        let rails = rails();
        let pg = Postgres::new(settings.pg(), &rails);
        assert_eq!(
            pg.create(&[]).to_string(),
            "createdb -w -E utf8 -O app -U app -h localhost app_development"
        );
    }

    #[test]
    fn drop_with_rails() {
        let settings = Settings::default();
        let rails = rails();
        let pg = Postgres::new(settings.pg(), &rails);
        assert_eq!(
            pg.drop(&[]).to_string(),
            "dropdb -w -U app -h localhost app_development"
        );
    }

    #[test]
    fn dump_with_rails() {
        let settings = Settings::default();
        let rails = rails();
        let pg = Postgres::new(settings.pg(), &rails);
        assert_eq!(
            pg.dump(&[]).to_string(),
            "pg_dump -Fc -w -U app -h localhost -f db/archive.dump app_development"
        );
    }

    #[test]
    fn restore_with_rails() {
        let settings = Settings::default();
        let rails = rails();
        let pg = Postgres::new(settings.pg(), &rails);
        assert_eq!(
            pg.restore(&[]).to_string(),
            "pg_restore -O -w -h localhost -U app -d app_development db/archive.dump"
        );
    }

    #[test]
    fn overrides_replace_defaults() {
        let settings = Settings::default();
        let rails = rails();
        let pg = Postgres::new(settings.pg(), &rails);
        let overrides = vec!["-a".to_string(), "-O".to_string(), "-w".to_string()];
        assert_eq!(
            pg.restore(&overrides).to_string(),
            "pg_restore -a -O -w -h localhost -U app -d app_development db/archive.dump"
        );
    }

    #[test]
    fn without_rails_only_options_and_archive() {
        let settings = Settings::default();
        let rails = Rails::disabled("development");
        let pg = Postgres::new(settings.pg(), &rails);
        assert_eq!(pg.create(&[]).to_string(), "createdb -w");
        assert_eq!(pg.drop(&["mydb".to_string()]).to_string(), "dropdb mydb");
        assert_eq!(pg.dump(&[]).to_string(), "pg_dump -Fc -w -f db/archive.dump");
        assert_eq!(pg.restore(&[]).to_string(), "pg_restore -O -w db/archive.dump");
    }

    #[test]
    fn absent_rails_values_are_skipped() {
        let settings = Settings::default();
        let rails = Rails::enabled(
            "development",
            DatabaseEnv {
                database: Some("app_development".into()),
                ..DatabaseEnv::default()
            },
        );
        let pg = Postgres::new(settings.pg(), &rails);
        assert_eq!(pg.create(&[]).to_string(), "createdb -w app_development");
        assert_eq!(
            pg.restore(&[]).to_string(),
            "pg_restore -O -w -d app_development db/archive.dump"
        );
    }

    #[test]
    fn custom_archive_and_options() {
        let mut settings = Settings::default();
        settings.databases.pg.archive_file = "tmp/prod.dump".into();
        settings.databases.pg.options.dump = "-Fc --no-owner".into();
        let rails = Rails::disabled("development");
        let pg = Postgres::new(settings.pg(), &rails);
        assert_eq!(
            pg.dump(&[]).to_string(),
            "pg_dump -Fc --no-owner -f tmp/prod.dump"
        );
        assert_eq!(pg.archive_file(), Path::new("tmp/prod.dump"));
    }
}
