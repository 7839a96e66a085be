//! db - PostgreSQL and Rails database management from the command line
//!
//! Wraps the PostgreSQL client tools (`createdb`, `dropdb`, `pg_dump`,
//! `pg_restore`) and a Rails application's migration tasks behind a handful
//! of short flags, filling in connection details from `config/database.yml`.
//!
//! # Settings
//!
//! `~/.db/settings.yml` (run `db --edit` to create and open it):
//!
//! ```yaml
//! current_database: pg
//! databases:
//!   pg:
//!     options:
//!       create: "-w"
//!       drop: "-w"
//!       dump: "-Fc -w"
//!       restore: "-O -w"
//!     archive_file: db/archive.dump
//! rails:
//!   enabled: true
//!   env: development
//! ```
//!
//! # Commands
//!
//! - `db -c` / `db --create` - Create the database
//! - `db -D` / `db --drop` - Drop the database
//! - `db -d` / `db --dump` - Dump the database to the archive file
//! - `db -r` / `db --restore` - Restore the database from the archive file
//! - `db -F` / `db --fresh` - Drop, create, migrate and seed
//! - `db -i` / `db --import` - Drop, create, restore and migrate
//! - `db -m` / `db --migrate` - Run Rails migrations
//! - `db -M --setup|--generator|--execute|--clean|--restore` - Remigration steps
//! - `db -e` / `db --edit` - Edit settings

pub mod command;
pub mod commands;
pub mod context;
pub mod error;
pub mod files;
pub mod generator;
pub mod output;
pub mod pg;
pub mod rails;
pub mod settings;

#[cfg(test)]
pub(crate) mod testing;

pub use command::{CommandLine, Prompt, Runner};
pub use context::Context;
pub use error::CliError;
pub use settings::{Settings, SettingsError};
