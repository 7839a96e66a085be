//! Error types for the CLI

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::rails::RailsError;
use crate::settings::SettingsError;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Settings file error
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Rails database settings error
    #[error(transparent)]
    Rails(#[from] RailsError),

    /// I/O error on a specific path
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// External program could not be started
    #[error("Unable to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// External program exited unsuccessfully
    #[error("Command failed ({status}): {command}")]
    CommandFailed { command: String, status: ExitStatus },

    /// Archive file required by restore/import is missing
    #[error("{action} aborted. Unable to find archive file: {}.", path.display())]
    ArchiveMissing { action: &'static str, path: PathBuf },

    /// Rails support is off or the project is not a Rails project
    #[error("Unable to migrate - This is not a Rails project or Rails support is not enabled.")]
    RailsDisabled,

    /// Directory required by a remigration step is missing
    #[error("Directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    /// Setup would overwrite an earlier setup's backup
    #[error(
        "Remigration already set up: {} exists. Run `db -M --restore` or `db -M --clean` first.",
        .0.display()
    )]
    RemigrationInProgress(PathBuf),

    /// Generated remigrate generator has no `source_root` line to anchor on
    #[error("Unable to find `source_root` in {}", .0.display())]
    GeneratorAnchor(PathBuf),

    /// Invalid glob pattern
    #[error("invalid glob '{0}': {1}")]
    Glob(String, #[source] glob::PatternError),

    /// Interactive prompt failed or was cancelled
    #[error("Prompt cancelled: {0}")]
    Prompt(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
