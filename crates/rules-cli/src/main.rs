//! Cursor Rules CLI
//!
//! The command-line interface for sharing `.cursor/rules` directories
//! through a remote store.

mod cli;
mod commands;
mod context;
mod error;
mod interactive;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use context::{CliOverrides, Context};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        // No command provided - show help hint
        println!("{} Cursor Rules CLI", "cursorrules".green().bold());
        println!();
        println!("Run {} for available commands.", "cursorrules --help".cyan());
        return Ok(());
    };

    let overrides = CliOverrides {
        rules_dir: cli.rules_dir,
        strictness: cli.strictness.map(Into::into),
    };
    let cwd = std::env::current_dir()?;
    let ctx = Context::load(&cwd, &overrides)?;

    execute_command(&ctx, command)
}

fn init_tracing(verbose: bool) {
    let result = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };

    if let Err(e) = result {
        eprintln!("{}: failed to set tracing subscriber: {}", "warning".yellow(), e);
    }
    tracing::debug!("Verbose mode enabled");
}

fn execute_command(ctx: &Context, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Auth { token } => commands::run_auth(ctx, token),
        Commands::List => commands::run_list(ctx),
        Commands::Pull { name, force, merge } => commands::run_pull(ctx, name, force, merge),
        Commands::Push { name } => commands::run_push(ctx, name),
        Commands::Delete { name, force } => commands::run_delete(ctx, name, force),
        Commands::Status { name } => commands::run_status(ctx, name),
        Commands::Backups => commands::run_backups(ctx),
        Commands::Restore { run_id } => commands::run_restore(ctx, &run_id),
    }
}
