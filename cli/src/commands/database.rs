//! Database lifecycle commands: create, drop, dump, restore, fresh, import, migrate.

use crate::command::{Prompt, Runner};
use crate::context::Context;
use crate::error::CliError;

const DESTROY_PROMPT: &str = "All data in current database will be completely destroyed. Continue?";
const OVERWRITE_PROMPT: &str = "All data in current database will be completely overwritten. Continue?";
const FRESH_PROMPT: &str =
    "The current database will be completely destroyed and rebuilt from scratch. Continue?";

/// Create the database
pub fn create<R: Runner, P: Prompt>(ctx: &Context<R, P>, overrides: &[String]) -> Result<(), CliError> {
    ctx.run(&ctx.postgres().create(overrides))?;
    ctx.say("Database created.");
    Ok(())
}

/// Drop the database after confirmation
pub fn drop<R: Runner, P: Prompt>(ctx: &Context<R, P>, overrides: &[String]) -> Result<(), CliError> {
    if !ctx.confirm(DESTROY_PROMPT)? {
        ctx.say("Database drop aborted.");
        return Ok(());
    }
    ctx.run(&ctx.postgres().drop(overrides))?;
    ctx.say("Database dropped.");
    Ok(())
}

/// Dump the database to the archive file
pub fn dump<R: Runner, P: Prompt>(ctx: &Context<R, P>, overrides: &[String]) -> Result<(), CliError> {
    let pg = ctx.postgres();
    ctx.run(&pg.dump(overrides))?;
    ctx.say(&format!("Archive created: {}", pg.archive_file().display()));
    Ok(())
}

/// Restore the database from the archive file after confirmation
pub fn restore<R: Runner, P: Prompt>(ctx: &Context<R, P>, overrides: &[String]) -> Result<(), CliError> {
    if !ctx.confirm(OVERWRITE_PROMPT)? {
        ctx.say("Database restore aborted.");
        return Ok(());
    }
    let pg = ctx.postgres();
    require_archive(ctx, "Restore")?;
    ctx.run(&pg.restore(overrides))?;
    ctx.say("Database restored.");
    Ok(())
}

/// Drop, create, migrate and seed after confirmation
pub fn fresh<R: Runner, P: Prompt>(ctx: &Context<R, P>) -> Result<(), CliError> {
    if !ctx.confirm(FRESH_PROMPT)? {
        ctx.say("Database freshen aborted.");
        return Ok(());
    }

    // Both Rails tasks are needed; fail before touching the database.
    let migrate = ctx.rails().migrate()?;
    let seed = ctx.rails().seed()?;

    let pg = ctx.postgres();
    ctx.run(&pg.drop(&[]))?;
    ctx.run(&pg.create(&[]))?;
    ctx.run(&migrate)?;
    ctx.run(&seed)?;
    ctx.say("Database freshened.");
    Ok(())
}

/// Drop, create, restore (from archive) and migrate after confirmation
pub fn import<R: Runner, P: Prompt>(ctx: &Context<R, P>) -> Result<(), CliError> {
    if !ctx.confirm(OVERWRITE_PROMPT)? {
        ctx.say("Database import aborted.");
        return Ok(());
    }

    let pg = ctx.postgres();
    require_archive(ctx, "Import")?;
    let migrate = ctx.rails().migrate()?;

    ctx.run(&pg.drop(&[]))?;
    ctx.run(&pg.create(&[]))?;
    ctx.run(&pg.restore(&[]))?;
    ctx.run(&migrate)?;
    ctx.say("Database import complete.");
    Ok(())
}

/// Run pending Rails migrations
pub fn migrate<R: Runner, P: Prompt>(ctx: &Context<R, P>) -> Result<(), CliError> {
    ctx.run(&ctx.rails().migrate()?)?;
    ctx.say("Database migrated.");
    Ok(())
}

fn require_archive<R: Runner, P: Prompt>(ctx: &Context<R, P>, action: &'static str) -> Result<(), CliError> {
    if ctx.archive_path().exists() {
        Ok(())
    } else {
        Err(CliError::ArchiveMissing {
            action,
            path: ctx.postgres().archive_file().to_path_buf(),
        })
    }
}
