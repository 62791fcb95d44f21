//! CLI error types

use pricer_core::market_data::MarketDataError;
use pricer_models::models::ProcessError;
use pricer_pricing::mc::SimulationError;
use thiserror::Error;

/// Errors raised while loading, validating or running a scenario.
#[derive(Debug, Error)]
pub enum CliError {
    /// The layered configuration could not be read or deserialised.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The scenario is well-formed TOML but not a valid simulation.
    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    /// Unknown log level.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Unknown output format.
    #[error("Unknown format: {0}. Supported: table, json")]
    InvalidFormat(String),

    /// Term structure construction failed.
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    /// Process construction failed.
    #[error("Process error: {0}")]
    Process(#[from] ProcessError),

    /// Simulation, calibration or payoff evaluation failed.
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    /// The global thread pool could not be configured.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Result serialisation failed.
    #[error("Output error: {0}")]
    Output(String),
}

/// Result alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
