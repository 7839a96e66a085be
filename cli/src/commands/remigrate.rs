//! Remigrate command - rebuild the migration history while keeping data
//!
//! The workflow runs in steps, each a separate invocation:
//! 1. `setup` backs `db/migrate` up to `db/migrate-old` and `db/migrate-new`
//! 2. (edit `db/migrate-new` by hand: merge, reorder, rewrite)
//! 3. `generator` builds a Rails generator that recreates every migration in `db/migrate-new`
//! 4. `execute` dumps, rebuilds the schema from the new migrations and restores data only
//! 5. `clean` drops the support files, or `restore` reverts to the original migrations

use std::path::{Path, PathBuf};

use crate::command::{Prompt, Runner};
use crate::context::Context;
use crate::error::CliError;
use crate::files;
use crate::generator;
use crate::output;

pub const MIGRATE_DIR: &str = "db/migrate";
pub const MIGRATE_OLD_DIR: &str = "db/migrate-old";
pub const MIGRATE_NEW_DIR: &str = "db/migrate-new";
pub const GENERATORS_DIR: &str = "lib/generators";
pub const GENERATOR_DIR: &str = "lib/generators/remigrate";
pub const GENERATOR_FILE: &str = "lib/generators/remigrate/remigrate_generator.rb";

/// pg_restore options for restoring data into the rebuilt schema
const DATA_ONLY_RESTORE: [&str; 3] = ["-a", "-O", "-w"];

/// Remigration step selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Setup,
    Generator,
    Execute,
    Clean,
    Restore,
}

/// Run one remigration step
pub fn run<R: Runner, P: Prompt>(ctx: &Context<R, P>, step: Step) -> Result<(), CliError> {
    tracing::debug!(?step, root = %ctx.root().display(), "remigrate");
    println!();
    match step {
        Step::Setup => setup(ctx)?,
        Step::Generator => build_generator(ctx)?,
        Step::Execute => execute(ctx)?,
        Step::Clean => clean(ctx)?,
        Step::Restore => restore(ctx)?,
    }
    println!();
    Ok(())
}

/// Copy `db/migrate` to `db/migrate-old` (backup) and `db/migrate-new` (for editing).
///
/// Refuses when either copy already exists; the backup must stay the original history.
pub fn setup<R: Runner, P: Prompt>(ctx: &Context<R, P>) -> Result<(), CliError> {
    if let Some(existing) = [MIGRATE_OLD_DIR, MIGRATE_NEW_DIR]
        .into_iter()
        .find(|dir| ctx.path(dir).exists())
    {
        return Err(CliError::RemigrationInProgress(PathBuf::from(existing)));
    }

    ctx.say("Setting up project for remigration...");
    copy(ctx, MIGRATE_DIR, MIGRATE_OLD_DIR)?;
    copy(ctx, MIGRATE_DIR, MIGRATE_NEW_DIR)?;
    ctx.say("Database remigration setup complete.");
    Ok(())
}

/// Create the remigrate generator from the migrations in `db/migrate-new`.
pub fn build_generator<R: Runner, P: Prompt>(ctx: &Context<R, P>) -> Result<(), CliError> {
    if ctx.path(GENERATOR_FILE).exists() {
        if !ctx.confirm("Existing generator detected. Overwrite and lose all changes?")? {
            ctx.say("Remigration generator aborted.");
            return Ok(());
        }
        remove(ctx, GENERATOR_DIR)?;
    }

    let new_dir = ctx.path(MIGRATE_NEW_DIR);
    if !new_dir.is_dir() {
        return Err(CliError::MissingDirectory(PathBuf::from(MIGRATE_NEW_DIR)));
    }
    let names: Vec<String> = files::ruby_files(&new_dir)?
        .iter()
        .map(|path| generator::migration_name(path))
        .collect();

    ctx.run(&ctx.rails().generate(["generator", "remigrate"]))?;

    let path = ctx.path(GENERATOR_FILE);
    let source = std::fs::read_to_string(&path).map_err(|e| CliError::io(&path, e))?;
    let edited = generator::insert_after_source_root(&source, &generator::remigrate_method(&names))
        .ok_or_else(|| CliError::GeneratorAnchor(PathBuf::from(GENERATOR_FILE)))?;
    std::fs::write(&path, edited).map_err(|e| CliError::io(&path, e))?;
    ctx.say_status("insert", GENERATOR_FILE);

    tracing::debug!(migrations = names.len(), "remigrate generator built");
    Ok(())
}

/// Dump, drop, create, regenerate migrations, migrate and restore data only.
pub fn execute<R: Runner, P: Prompt>(ctx: &Context<R, P>) -> Result<(), CliError> {
    ctx.say("Remigrating the database...");

    let new_dir = ctx.path(MIGRATE_NEW_DIR);
    if !new_dir.is_dir() {
        return Err(CliError::MissingDirectory(PathBuf::from(MIGRATE_NEW_DIR)));
    }
    let migrate = ctx.rails().migrate()?;
    let pg = ctx.postgres();

    // Dump, drop, and recreate the database.
    if ctx.archive_path().exists() {
        ctx.say_status("identical", pg.archive_file());
    } else {
        ctx.run(&pg.dump(&[]))?;
    }
    ctx.run(&pg.drop(&[]))?;
    ctx.run(&pg.create(&[]))?;

    // Regenerate migrations with fresh timestamps.
    let migrate_dir = ctx.path(MIGRATE_DIR);
    files::empty_dir(&migrate_dir)?;
    ctx.say_status("empty", MIGRATE_DIR);
    ctx.run(&ctx.rails().generate(["remigrate"]))?;

    // Carry the edited bodies over onto the regenerated files.
    for source in files::ruby_files(&new_dir)? {
        let name = generator::migration_name(&source);
        match find_migration(&migrate_dir, &name)? {
            Some(target) => {
                std::fs::copy(&source, &target).map_err(|e| CliError::io(&source, e))?;
                ctx.say_status("copy", relative(ctx.root(), &target));
            }
            None => {
                println!(
                    "{}",
                    output::status_skip("missing", &format!("{MIGRATE_DIR}/*_{name}.rb"))
                );
                tracing::warn!(%name, "no regenerated migration to receive edited body");
            }
        }
    }

    ctx.run(&migrate)?;
    ctx.run(&pg.restore(&DATA_ONLY_RESTORE.map(String::from)))?;
    ctx.say("Remigration complete.");
    Ok(())
}

/// Remove backups, the generator and the archive after confirmation.
pub fn clean<R: Runner, P: Prompt>(ctx: &Context<R, P>) -> Result<(), CliError> {
    if !ctx.confirm("Cleaning of remigration support files is non-recoverable. Continue?")? {
        ctx.say("Remigration cleanup aborted.");
        return Ok(());
    }

    ctx.say("Cleaning up excess remigration files...");
    remove(ctx, MIGRATE_OLD_DIR)?;
    remove(ctx, MIGRATE_NEW_DIR)?;
    remove_generator(ctx)?;
    remove(ctx, &ctx.settings().pg().archive_file)?;
    ctx.say("Remigration cleanup complete.");
    Ok(())
}

/// Put the original migrations back and remove every remigration file.
pub fn restore<R: Runner, P: Prompt>(ctx: &Context<R, P>) -> Result<(), CliError> {
    if !ctx.path(MIGRATE_OLD_DIR).is_dir() {
        return Err(CliError::MissingDirectory(PathBuf::from(MIGRATE_OLD_DIR)));
    }

    ctx.say("Reverting all remigration changes...");
    remove(ctx, MIGRATE_DIR)?;
    copy(ctx, MIGRATE_OLD_DIR, MIGRATE_DIR)?;
    remove(ctx, MIGRATE_OLD_DIR)?;
    remove(ctx, MIGRATE_NEW_DIR)?;
    remove_generator(ctx)?;
    ctx.say("Remigration revert complete - Database migrations restored to original state.");
    Ok(())
}

/// Regenerated migration in `dir` whose name ends with `_<name>.rb`.
fn find_migration(dir: &Path, name: &str) -> Result<Option<PathBuf>, CliError> {
    Ok(files::ruby_files(dir)?
        .into_iter()
        .find(|path| generator::migration_name(path) == name))
}

fn remove_generator<R: Runner, P: Prompt>(ctx: &Context<R, P>) -> Result<(), CliError> {
    remove(ctx, GENERATOR_DIR)?;
    if files::remove_dir_if_empty(&ctx.path(GENERATORS_DIR))? {
        ctx.say_status("remove", GENERATORS_DIR);
    }
    Ok(())
}

fn copy<R: Runner, P: Prompt>(ctx: &Context<R, P>, from: &str, to: &str) -> Result<(), CliError> {
    let copied = files::copy_dir(&ctx.path(from), &ctx.path(to))?;
    ctx.say_status("directory", format!("{to} ({copied} files from {from})"));
    Ok(())
}

fn remove<R: Runner, P: Prompt>(ctx: &Context<R, P>, target: impl AsRef<Path>) -> Result<(), CliError> {
    let target = target.as_ref();
    if files::remove_path(&ctx.path(target))? {
        ctx.say_status("remove", target);
    }
    Ok(())
}

fn relative(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}
