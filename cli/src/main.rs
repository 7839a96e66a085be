//! db CLI - Main entry point
//!
//! Flag-style commands (`db -c`, `db --dump`, `db -M --setup`) dispatch to the
//! command modules in the library crate.

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use db_cli::commands::remigrate::Step;
use db_cli::commands::{database, edit, remigrate};
use db_cli::{CliError, Context, Settings};

/// Environment variable holding the log filter
const LOG_ENV: &str = "DB_LOG";

/// db - PostgreSQL and Rails database management
#[derive(Parser, Debug)]
#[command(name = "db")]
#[command(author, version, about = "PostgreSQL and Rails database management", long_about = None)]
#[command(disable_version_flag = true, arg_required_else_help = true)]
struct Cli {
    /// Show db version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,

    /// Path to settings file (default: ~/.db/settings.yml)
    #[arg(long, global = true, value_name = "PATH", env = "DB_SETTINGS")]
    settings: Option<PathBuf>,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    yes: bool,

    /// Log every spawned command and file operation
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands
///
/// Each is also reachable as a flag (`-c`, `--create`, ...). Trailing
/// arguments of create/drop/dump/restore replace the configured default options;
/// a `-y`/`--yes` among them is still treated as the global flag.
#[derive(Subcommand, Debug)]
enum Command {
    /// Create new database
    #[command(short_flag = 'c', long_flag = "create")]
    Create {
        /// Options passed to createdb instead of the defaults
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
        overrides: Vec<String>,
    },

    /// Drop current database
    #[command(short_flag = 'D', long_flag = "drop")]
    Drop {
        /// Options passed to dropdb instead of the defaults
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
        overrides: Vec<String>,
    },

    /// Dump current database to archive file
    #[command(short_flag = 'd', long_flag = "dump")]
    Dump {
        /// Options passed to pg_dump instead of the defaults
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
        overrides: Vec<String>,
    },

    /// Restore current database from archive file
    #[command(short_flag = 'r', long_flag = "restore")]
    Restore {
        /// Options passed to pg_restore instead of the defaults
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
        overrides: Vec<String>,
    },

    /// Create fresh database from scratch (drop, create, migrate, and seed)
    #[command(short_flag = 'F', long_flag = "fresh")]
    Fresh,

    /// Import archive data into current database (drop, create, restore, and migrate)
    #[command(short_flag = 'i', long_flag = "import")]
    Import,

    /// Execute migrations for current database
    #[command(short_flag = 'm', long_flag = "migrate")]
    Migrate,

    /// Rebuild current database from new migrations
    #[command(short_flag = 'M', long_flag = "remigrate")]
    Remigrate(RemigrateArgs),

    /// Edit db settings in default editor
    #[command(short_flag = 'e', long_flag = "edit")]
    Edit,
}

#[derive(Args, Debug)]
#[group(multiple = false)]
struct RemigrateArgs {
    /// Prepare existing migrations for remigration process
    #[arg(short, long)]
    setup: bool,

    /// Create the remigration generator based on new migrations (as created during setup)
    #[arg(short, long)]
    generator: bool,

    /// Execute the remigration process
    #[arg(short, long)]
    execute: bool,

    /// Clean excess remigration files created during the setup and generator steps
    #[arg(short, long)]
    clean: bool,

    /// Revert database migrations to original state (reverses setup)
    #[arg(short, long)]
    restore: bool,
}

impl RemigrateArgs {
    fn step(&self) -> Option<Step> {
        [
            (self.setup, Step::Setup),
            (self.generator, Step::Generator),
            (self.execute, Step::Execute),
            (self.clean, Step::Clean),
            (self.restore, Step::Restore),
        ]
        .into_iter()
        .find_map(|(selected, step)| selected.then_some(step))
    }
}

fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();
}

/// Remove `-y`/`--yes` swallowed by a trailing override list.
fn take_yes(overrides: &mut Vec<String>) -> bool {
    let before = overrides.len();
    overrides.retain(|arg| arg != "-y" && arg != "--yes");
    overrides.len() != before
}

fn run(mut cli: Cli) -> Result<(), CliError> {
    if let Command::Create { overrides }
    | Command::Drop { overrides }
    | Command::Dump { overrides }
    | Command::Restore { overrides } = &mut cli.command
    {
        cli.yes |= take_yes(overrides);
    }

    let root = std::env::current_dir().map_err(|e| CliError::io(".", e))?;
    let settings_path = match cli.settings {
        Some(path) => path,
        None => Settings::default_path().ok_or_else(|| {
            CliError::Other("Unable to determine home directory. Use --settings <PATH>.".into())
        })?,
    };
    tracing::debug!(root = %root.display(), settings = %settings_path.display(), "starting");

    let ctx = Context::load(root, settings_path, cli.yes);

    match cli.command {
        Command::Create { overrides } => database::create(&ctx, &overrides),
        Command::Drop { overrides } => database::drop(&ctx, &overrides),
        Command::Dump { overrides } => database::dump(&ctx, &overrides),
        Command::Restore { overrides } => database::restore(&ctx, &overrides),
        Command::Fresh => database::fresh(&ctx),
        Command::Import => database::import(&ctx),
        Command::Migrate => database::migrate(&ctx),
        Command::Remigrate(args) => match args.step() {
            Some(step) => remigrate::run(&ctx, step),
            None => print_subcommand_help("remigrate"),
        },
        Command::Edit => edit::run(&ctx, &edit::editor()),
    }
}

fn print_subcommand_help(name: &str) -> Result<(), CliError> {
    let mut cli = Cli::command();
    cli.build();
    match cli.find_subcommand_mut(name) {
        Some(sub) => sub
            .print_help()
            .map_err(|e| CliError::Other(format!("Unable to print help: {e}"))),
        None => Err(CliError::Other(format!("Unknown command: {name}"))),
    }
}
