//! Filesystem helpers for the remigration workflow.
//!
//! Removals of absent paths succeed so each remigration step can be re-run.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::CliError;

/// Recursively copy `from` into `to`, creating `to` as needed.
///
/// Existing files under `to` are overwritten. Returns the number of files copied.
pub fn copy_dir(from: &Path, to: &Path) -> Result<usize, CliError> {
    if !from.is_dir() {
        return Err(CliError::MissingDirectory(from.into()));
    }

    std::fs::create_dir_all(to).map_err(|e| CliError::io(to, e))?;

    let mut copied = 0;
    for entry in WalkDir::new(from).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(from).to_path_buf();
            CliError::io(path, e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| CliError::Other(e.to_string()))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| CliError::io(&target, e))?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(|e| CliError::io(entry.path(), e))?;
            copied += 1;
        }
    }

    tracing::debug!(from = %from.display(), to = %to.display(), copied, "copied directory");
    Ok(copied)
}

/// Remove a directory tree. Returns `false` when there was nothing to remove.
pub fn remove_dir(path: &Path) -> Result<bool, CliError> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed directory");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CliError::io(path, e)),
    }
}

/// Remove a file, or a directory tree if `path` is one.
pub fn remove_path(path: &Path) -> Result<bool, CliError> {
    if path.is_dir() {
        return remove_dir(path);
    }
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed file");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CliError::io(path, e)),
    }
}

/// Remove `path` only when it is an existing, empty directory.
pub fn remove_dir_if_empty(path: &Path) -> Result<bool, CliError> {
    let mut entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(CliError::io(path, e)),
    };
    if entries.next().is_some() {
        return Ok(false);
    }
    std::fs::remove_dir(path).map_err(|e| CliError::io(path, e))?;
    tracing::debug!(path = %path.display(), "removed empty directory");
    Ok(true)
}

/// Replace whatever is at `path` with an empty directory.
pub fn empty_dir(path: &Path) -> Result<(), CliError> {
    remove_path(path)?;
    std::fs::create_dir_all(path).map_err(|e| CliError::io(path, e))
}

/// Ruby sources directly inside `dir`, sorted by file name.
pub fn ruby_files(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let pattern = format!(
        "{}/*.rb",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let paths = glob::glob(&pattern).map_err(|e| CliError::Glob(pattern.clone(), e))?;

    let mut files: Vec<PathBuf> = paths.filter_map(Result::ok).filter(|p| p.is_file()).collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
