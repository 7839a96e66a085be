//! CLI output helpers for consistent, Thor-like status formatting.

use colored::Colorize;

pub fn muted(text: &str) -> String {
    format!("{}", text.bright_black())
}

pub fn info(text: &str) -> String {
    format!("{}", text.green())
}

pub fn warn_line(text: &str) -> String {
    format!("[{}] {}", "Warning".yellow(), text)
}

pub fn err_line(text: &str) -> String {
    format!("{} {}", "Error".red().bold(), text)
}

/// Right-aligned action label followed by its subject, e.g. `      run  createdb -w`.
pub fn status(action: &str, subject: &str) -> String {
    format!("{} {}", format!("{action:>10}").bold().green(), subject)
}

/// Same layout as [`status`] for actions that skipped or could not act.
pub fn status_skip(action: &str, subject: &str) -> String {
    format!("{} {}", format!("{action:>10}").bold().yellow(), subject)
}
