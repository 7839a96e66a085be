//! Test doubles for the process and prompt seams.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;

use crate::command::{CommandLine, Prompt, Runner};
use crate::context::Context;
use crate::error::CliError;
use crate::rails::{DatabaseEnv, Rails};
use crate::settings::Settings;

type Hook = Box<dyn Fn(&CommandLine) -> Result<(), CliError>>;

/// Records every command instead of running it.
#[derive(Default)]
pub struct Recorder {
    commands: RefCell<Vec<CommandLine>>,
    hook: Option<Hook>,
}

impl Recorder {
    /// Run `hook` for every recorded command, e.g. to fake side effects.
    pub fn with_hook(hook: impl Fn(&CommandLine) -> Result<(), CliError> + 'static) -> Self {
        Self {
            commands: RefCell::default(),
            hook: Some(Box::new(hook)),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.commands.borrow().iter().map(ToString::to_string).collect()
    }
}

impl Runner for Recorder {
    fn run(&self, command: &CommandLine) -> Result<(), CliError> {
        self.commands.borrow_mut().push(command.clone());
        match &self.hook {
            Some(hook) => hook(command),
            None => Ok(()),
        }
    }
}

/// Answers prompts from a fixed script; panics when it runs out.
pub struct Answers(RefCell<VecDeque<bool>>);

impl Answers {
    pub fn new(answers: &[bool]) -> Self {
        Self(RefCell::new(answers.iter().copied().collect()))
    }
}

impl Prompt for Answers {
    fn confirm(&self, message: &str) -> Result<bool, CliError> {
        let answer = self.0.borrow_mut().pop_front();
        Ok(answer.unwrap_or_else(|| panic!("unexpected prompt: {message}")))
    }
}

pub fn app_database() -> DatabaseEnv {
    DatabaseEnv {
        encoding: Some("utf8".into()),
        username: Some("app".into()),
        host: Some("localhost".into()),
        database: Some("app_development".into()),
    }
}

/// Context rooted at `root` with default settings and Rails enabled.
pub fn context(root: &Path, runner: Recorder, prompt: Answers) -> Context<Recorder, Answers> {
    Context::new(
        root.to_path_buf(),
        root.join("settings.yml"),
        Settings::default(),
        Rails::enabled("development", app_database()),
        runner,
        prompt,
    )
}
