//! Pricer CLI - Monte Carlo simulation scenarios
//!
//! # Commands
//!
//! - `pricer simulate --config <file>` - simulate a scenario and price its products
//! - `pricer check-config --config <file>` - validate a scenario and print the merged configuration
//!
//! Scenario values are layered: defaults, the TOML file, `PRICER__*`
//! environment variables, then command line flags.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod scenario;

pub use error::{CliError, Result};

use commands::simulate::OutputFormat;
use config::{LogLevel, Overrides, ScenarioConfig};

/// Monte Carlo pricer CLI
#[derive(Parser)]
#[command(name = "pricer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a scenario and price its products
    Simulate {
        /// Scenario file (TOML)
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,

        /// Number of Monte Carlo paths
        #[arg(short, long)]
        paths: Option<usize>,

        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Log level (trace, debug, info, warn, error)
        #[arg(long)]
        log_level: Option<LogLevel>,

        /// Worker threads
        #[arg(short, long)]
        threads: Option<usize>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Validate a scenario and print the merged configuration
    CheckConfig {
        /// Scenario file (TOML)
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,
    },
}

fn init_tracing(log_level: LogLevel) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level.as_filter_str())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn init_thread_pool(threads: Option<usize>) -> Result<()> {
    let threads = threads.unwrap_or_else(num_cpus::get);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()?;
    info!(threads, "thread pool ready");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            config,
            paths,
            seed,
            log_level,
            threads,
            format,
        } => {
            let overrides = Overrides {
                paths,
                seed,
                log_level,
                threads,
            };
            let scenario = ScenarioConfig::load(&config, &overrides)
                .with_context(|| format!("loading scenario {}", config.display()))?;
            init_tracing(scenario.log_level);
            init_thread_pool(scenario.threads)?;
            commands::simulate::run(&scenario, format).context("simulation failed")?;
        }
        Commands::CheckConfig { config } => {
            let scenario = ScenarioConfig::load(&config, &Overrides::default())
                .with_context(|| format!("loading scenario {}", config.display()))?;
            init_tracing(scenario.log_level);
            commands::check_config::run(&scenario)?;
        }
    }
    Ok(())
}
