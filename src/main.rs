mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calsync")]
#[command(about = "Copy, filter and reconcile events between calendars using a list of rules")]
struct Cli {
    /// Config file (defaults to ./calsync.yaml, then ~/.config/calsync/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every rule in order
    Run {
        /// Log imports and deletions without sending them
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate the config and print the rules
    Check,
    /// List the calendars the account can see
    Calendars,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = config::find_config(cli.config.as_deref())?;
    let cfg = config::load_config(&config_path)?;
    debug!(path = %config_path.display(), rules = cfg.rules.len(), "loaded config");

    match cli.command {
        Commands::Run { dry_run } => commands::run::run(&cfg, dry_run),
        Commands::Check => commands::check::run(&cfg),
        Commands::Calendars => commands::calendars::run(&cfg),
    }
}
