//! External process invocation and confirmation prompts
//!
//! [`CommandLine`] is the program plus arguments a command builder produces.
//! [`Runner`] executes one, [`Prompt`] asks the user before destructive steps.

use std::fmt;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::Command;

use inquire::Confirm;

use crate::error::CliError;
use crate::output;

// ============================================================================
// CommandLine
// ============================================================================

/// A program invocation: program name, ordered arguments, extra environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append a whitespace-separated option string such as `"-Fc -w"`.
    pub fn options(self, options: &str) -> Self {
        self.args(options.split_whitespace())
    }

    /// Append `flag value` when `value` is present.
    pub fn flag(self, flag: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.arg(flag).arg(value),
            None => self,
        }
    }

    /// Append `value` when present.
    pub fn arg_opt(self, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.arg(value),
            None => self,
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    #[inline]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[inline]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    #[inline]
    pub fn envs(&self) -> &[(String, String)] {
        &self.envs
    }

    /// Build a `std::process::Command` that runs in `dir` with inherited stdio.
    pub fn to_command(&self, dir: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .current_dir(dir);
        command
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Executes command lines to completion.
pub trait Runner {
    fn run(&self, command: &CommandLine) -> Result<(), CliError>;
}

/// Runs commands as child processes of this one.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    dir: PathBuf,
}

impl SystemRunner {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Runner for SystemRunner {
    fn run(&self, command: &CommandLine) -> Result<(), CliError> {
        tracing::debug!(command = %command, dir = %self.dir.display(), "spawning");

        let status = command
            .to_command(&self.dir)
            .status()
            .map_err(|source| CliError::Spawn {
                program: command.program().to_string(),
                source,
            })?;

        tracing::debug!(command = %command, %status, "finished");

        if status.success() {
            Ok(())
        } else {
            Err(CliError::CommandFailed {
                command: command.to_string(),
                status,
            })
        }
    }
}

// ============================================================================
// Prompt
// ============================================================================

/// Yes/no confirmation before destructive operations.
pub trait Prompt {
    fn confirm(&self, message: &str) -> Result<bool, CliError>;
}

/// Asks on the terminal, or answers "yes" itself when `assume_yes` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt {
    assume_yes: bool,
}

impl TerminalPrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Prompt for TerminalPrompt {
    fn confirm(&self, message: &str) -> Result<bool, CliError> {
        if self.assume_yes {
            println!("{} {}", message, output::muted("yes"));
            return Ok(true);
        }
        if !std::io::stdin().is_terminal() {
            return Err(CliError::Prompt(format!(
                "cannot ask \"{message}\" without a terminal (pass --yes to confirm)"
            )));
        }

        Confirm::new(message)
            .with_default(false)
            .prompt()
            .map_err(|e| CliError::Prompt(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_arguments() {
        let command = CommandLine::new("pg_dump")
            .options("-Fc -w")
            .flag("-U", Some("app"))
            .flag("-h", None)
            .arg("app_development");
        assert_eq!(command.to_string(), "pg_dump -Fc -w -U app app_development");
    }

    #[test]
    fn display_without_arguments_has_no_trailing_space() {
        assert_eq!(CommandLine::new("createdb").to_string(), "createdb");
    }

    #[test]
    fn options_collapse_whitespace() {
        let command = CommandLine::new("pg_restore").options("  -O   -w ");
        assert_eq!(command.arguments(), &["-O", "-w"]);
    }

    #[test]
    fn assume_yes_never_prompts() {
        assert!(TerminalPrompt::new(true).confirm("Continue?").unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let runner = SystemRunner::new(dir.path());

        assert!(runner.run(&CommandLine::new("true")).is_ok());
        assert!(matches!(
            runner.run(&CommandLine::new("false")),
            Err(CliError::CommandFailed { .. })
        ));
        assert!(matches!(
            runner.run(&CommandLine::new("db-cli-no-such-program")),
            Err(CliError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_passes_env_and_dir() {
        let dir = tempfile::tempdir().unwrap();
        let runner = SystemRunner::new(dir.path());

        runner
            .run(
                &CommandLine::new("sh")
                    .arg("-c")
                    .arg("printf %s \"$RAILS_ENV\" > env.txt")
                    .env("RAILS_ENV", "test"),
            )
            .unwrap();

        assert_eq!(std::fs::read_to_string(dir.path().join("env.txt")).unwrap(), "test");
    }
}
