//! Savesync CLI - command-line interface for the savefile synchronizer
//!
//! Provides commands for:
//! - Reconciling local save directories against the remote catalog
//! - Listing and registering consoles
//! - Inspecting the resolved configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use savesync_core::config::Config;

mod commands;
mod output;

use commands::{config::ConfigCommand, consoles::ConsolesCommand, sync::SyncCommand};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "savesync", version, about = "Savefile catalog synchronizer")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconcile local save directories against the remote catalog
    Sync(SyncCommand),
    /// List or register consoles
    #[command(subcommand)]
    Consoles(ConsolesCommand),
    /// View the resolved configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing. Verbosity flags win; otherwise the configured
    // logging level applies, and RUST_LOG overrides everything.
    let config_path = cli
        .config
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);
    let configured_level = Config::load_or_default(&config_path).logging.level;

    let filter = match (cli.quiet, cli.verbose) {
        (true, _) => "error".to_string(),
        (false, 0) => configured_level,
        (false, 1) => "debug".to_string(),
        (false, _) => "trace".to_string(),
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        Commands::Sync(cmd) => cmd.execute(format, cli.config.as_deref()).await,
        Commands::Consoles(cmd) => cmd.execute(format, cli.config.as_deref()).await,
        Commands::Config(cmd) => cmd.execute(format, cli.config.as_deref()).await,
    }
}
