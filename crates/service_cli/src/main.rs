//! Neutryx CLI - Credit basket tranche pricing
//!
//! # Commands
//!
//! - `neutryx tranche` - Expected tranche loss under every loss model
//! - `neutryx check` - Validate and print the configuration
//!
//! Without `--config` the built-in ten-name reference scenario is used.
//! `NEUTRYX_SEED` and `NEUTRYX_SIMULATIONS` override the simulation
//! settings. Errors print `error: ...` and panics `unknown error`; both
//! exit with status 1.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod scenario;

use config::RunConfig;

/// Neutryx credit basket CLI
#[derive(Parser)]
#[command(name = "neutryx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expected tranche loss of the basket under every loss model
    Tranche,

    /// Validate the configuration and print it
    Check,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    panic::set_hook(Box::new(|info| debug!(%info, "panic")));

    match panic::catch_unwind(AssertUnwindSafe(|| run(&cli))) {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(err)) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
        Err(_) => {
            eprintln!("unknown error");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = RunConfig::load_or_default(cli.config.as_deref())?.with_env_override()?;

    match cli.command {
        Commands::Tranche => {
            config.validate()?;
            commands::tranche::run(&config)
        }
        Commands::Check => commands::check::run(&config),
    }
}
