//! Per-invocation state shared by every command.

use std::path::{Path, PathBuf};

use crate::command::{CommandLine, Prompt, Runner, SystemRunner, TerminalPrompt};
use crate::error::CliError;
use crate::output;
use crate::pg::Postgres;
use crate::rails::Rails;
use crate::settings::Settings;

/// Project root, loaded settings, Rails support and the process/prompt seams.
pub struct Context<R = SystemRunner, P = TerminalPrompt> {
    root: PathBuf,
    settings_path: PathBuf,
    settings: Settings,
    rails: Rails,
    runner: R,
    prompt: P,
}

impl Context {
    /// Context for running real commands in `root`.
    pub fn load(root: PathBuf, settings_path: PathBuf, assume_yes: bool) -> Self {
        let settings = Settings::load_or_default(&settings_path);
        let rails = Rails::load(&root, &settings.rails);
        let runner = SystemRunner::new(&root);
        Self::new(root, settings_path, settings, rails, runner, TerminalPrompt::new(assume_yes))
    }
}

impl<R: Runner, P: Prompt> Context<R, P> {
    pub fn new(
        root: PathBuf,
        settings_path: PathBuf,
        settings: Settings,
        rails: Rails,
        runner: R,
        prompt: P,
    ) -> Self {
        Self {
            root,
            settings_path,
            settings,
            rails,
            runner,
            prompt,
        }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[inline]
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    #[inline]
    pub fn rails(&self) -> &Rails {
        &self.rails
    }

    #[inline]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// PostgreSQL command builder for the selected client
    pub fn postgres(&self) -> Postgres<'_> {
        Postgres::new(self.settings.pg(), &self.rails)
    }

    /// Absolute path of a project-relative path
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    /// Absolute path of the archive file
    pub fn archive_path(&self) -> PathBuf {
        self.path(&self.settings.pg().archive_file)
    }

    /// Print and run one command; a non-zero exit aborts the caller.
    pub fn run(&self, command: &CommandLine) -> Result<(), CliError> {
        println!("{}", output::status("run", &command.to_string()));
        self.runner.run(command)
    }

    pub fn confirm(&self, message: &str) -> Result<bool, CliError> {
        self.prompt.confirm(message)
    }

    /// Print an informational message
    pub fn say(&self, message: &str) {
        println!("{}", output::info(message));
    }

    /// Print a Thor-style `action  subject` line for a project-relative path.
    pub fn say_status(&self, action: &str, relative: impl AsRef<Path>) {
        println!("{}", output::status(action, &relative.as_ref().display().to_string()));
    }
}
