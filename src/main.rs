//! Command-line interface for gw-popgen
//!
//! # Usage Examples
//!
//! ```bash
//! # New population from a configuration file
//! gw-popgen population.json
//!
//! # Extend an existing population
//! gw-popgen population.json --output GWsim_bns_pop_20260805
//!
//! # Debug logging plus post-write artifact verification
//! gw-popgen population.json --debug
//! ```

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gw-popgen")]
#[command(about = "Generate per-source parameter files for a simulated gravitational-wave population")]
#[command(long_about = None)]
struct Cli {
    /// Path to the population configuration JSON file
    config: Option<PathBuf>,

    /// Output directory (overrides the configuration file's output_dir)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Debug mode: verbose logging and post-write artifact verification
    #[arg(long, short = 'd')]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    tracing::info!("gw-popgen (running on {} OS)", std::env::consts::OS);
    if let Ok(work_dir) = std::env::current_dir() {
        tracing::info!("Working directory: {}", work_dir.display());
    }

    let Some(config_path) = cli.config else {
        tracing::error!("No JSON configuration file specified!");
        tracing::error!("Type gw-popgen --help for usage");
        std::process::exit(1);
    };

    tracing::info!("Configuration file: {}", config_path.display());
    if let Some(ref output) = cli.output {
        tracing::info!("Output directory override: {}", output.display());
    }

    if let Err(e) = gw_popgen::run(&config_path, cli.output.as_deref(), cli.debug) {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}
