//! Edit command - open the settings file in the user's editor

use std::path::Path;

use crate::command::{CommandLine, Prompt, Runner};
use crate::context::Context;
use crate::error::CliError;

/// Editor from `$VISUAL`, then `$EDITOR`, then `vi`
pub fn editor() -> String {
    ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "vi".to_string())
}

/// Editor command line for `path`. The editor value may carry its own flags (`code --wait`).
pub fn editor_command(editor: &str, path: &Path) -> CommandLine {
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or("vi");
    CommandLine::new(program)
        .args(parts)
        .arg(path.display().to_string())
}

/// Write default settings when missing, then open them for editing.
pub fn run<R: Runner, P: Prompt>(ctx: &Context<R, P>, editor: &str) -> Result<(), CliError> {
    let path = ctx.settings_path();
    if !path.exists() {
        ctx.settings().save_to(path)?;
        ctx.say_status("create", path);
    }

    ctx.say("Launching editor...");
    ctx.run(&editor_command(editor, path))?;
    ctx.say("Editor closed.");
    Ok(())
}
