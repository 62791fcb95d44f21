//! Error types for the Monte Carlo simulation engine.
//!
//! - [`ConfigError`]: invalid builder input or time grids, raised before any
//!   storage is allocated
//! - [`SimulationError`]: everything that can go wrong once a simulator
//!   exists (bounds, lifecycle, calibration input, payoff evaluation)

use std::fmt;

use pricer_models::models::ProcessError;
use thiserror::Error;

/// Configuration error for the Monte Carlo simulator.
///
/// These errors occur during construction when invalid parameters are provided.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Path count outside valid range [1, 10_000_000].
    InvalidPathCount(usize),
    /// Invalid parameter value with name and description.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the invalid value.
        value: String,
    },
    /// Simulation or observation times are empty or not strictly ascending.
    InvalidTimeGrid {
        /// Which grid failed validation.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPathCount(count) => {
                write!(
                    f,
                    "Invalid path count {}: must be in range [1, 10_000_000]",
                    count
                )
            }
            Self::InvalidParameter { name, value } => {
                write!(f, "Invalid parameter '{}': {}", name, value)
            }
            Self::InvalidTimeGrid { name, reason } => {
                write!(f, "Invalid time grid '{}': {}", name, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors raised by the simulator, adjusters, paths and payoffs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Invalid configuration or time grid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The stochastic process rejected a query.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Path index beyond the simulated path count.
    #[error("Path index {index} out of range (n_paths = {n_paths})")]
    PathOutOfRange {
        /// Requested path
        index: usize,
        /// Number of simulated paths
        n_paths: usize,
    },

    /// Observation index beyond the observation grid.
    #[error("Observation index {index} out of range (n_obs = {n_obs})")]
    ObservationOutOfRange {
        /// Requested observation index
        index: usize,
        /// Number of observation times
        n_obs: usize,
    },

    /// A state off the observation grid was requested with interpolation disabled.
    #[error("Time {t} is not an observation time and time interpolation is disabled")]
    InterpolationDisabled {
        /// Requested time
        t: f64,
    },

    /// States were queried before they were populated.
    #[error("Simulation has not been run")]
    NotSimulated,

    /// Sliced simulation was requested on an incompatible simulator.
    #[error("Sliced simulation unavailable: {0}")]
    SlicedModeUnavailable(String),

    /// Slices were requested out of order without stored increments.
    #[error("Slice {requested} requested but slice {expected} is next")]
    SliceOutOfOrder {
        /// Requested slice index
        requested: usize,
        /// Next admissible slice index
        expected: usize,
    },

    /// Adjuster calibration input failed validation.
    #[error("Invalid calibration input '{name}': {reason}")]
    InvalidCalibration {
        /// Input name
        name: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Payoff construction input failed validation.
    #[error("Invalid payoff '{name}': {reason}")]
    InvalidPayoff {
        /// Payoff name
        name: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Vector sizes disagree.
    #[error("Dimension mismatch for {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        /// What was being sized
        what: &'static str,
        /// Expected size
        expected: usize,
        /// Actual size
        got: usize,
    },
}
