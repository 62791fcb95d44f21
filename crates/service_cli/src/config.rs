//! Scenario configuration
//!
//! A scenario is assembled from layered sources, lowest priority first:
//! serde defaults, the TOML file, `PRICER__*` environment variables (for
//! example `PRICER__SIMULATION__PATHS=50000`) and finally CLI flags.

use std::path::Path;
use std::str::FromStr;

use config::{Config, Environment, File, FileFormat, Source};
use pricer_pricing::mc::DEFAULT_SEED;
use pricer_pricing::payoff::CallPut;
use serde::{Deserialize, Serialize};

use crate::{CliError, Result};

/// Log levels accepted by `--log-level` and the `log_level` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(CliError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Tracing filter directive
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

fn deserialize_log_level<'de, D>(deserializer: D) -> std::result::Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

// ============================================================================
// Sections
// ============================================================================

/// Full scenario: market, model, grid, adjusters and products.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Log level used when `RUST_LOG` is unset
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    /// Worker threads; defaults to the number of logical CPUs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
    /// Simulator settings
    pub simulation: SimulationSection,
    /// Discount curve
    pub curve: CurveSection,
    /// Stochastic process
    pub model: ModelSection,
    /// Adjuster calibration grids
    pub adjusters: AdjusterSection,
    /// Products to price
    pub products: Vec<ProductSection>,
}

/// Simulator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    pub paths: usize,
    pub seed: u64,
    pub richardson: bool,
    pub time_interpolation: bool,
    pub store_brownians: bool,
    /// Integration times; the observation grid is used when empty
    pub sim_times: Vec<f64>,
    /// Extra observation times on top of those the products read
    pub obs_times: Vec<f64>,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            paths: 10_000,
            seed: DEFAULT_SEED,
            richardson: true,
            time_interpolation: false,
            store_brownians: false,
            sim_times: Vec::new(),
            obs_times: Vec::new(),
        }
    }
}

/// Discount curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveSection {
    /// Constant continuously compounded rate
    Flat { rate: f64 },
    /// Zero rate pillars
    Interpolated {
        tenors: Vec<f64>,
        rates: Vec<f64>,
        /// `linear` or `log_linear`
        #[serde(default = "default_curve_method")]
        method: String,
    },
}

fn default_curve_method() -> String {
    "log_linear".to_string()
}

impl Default for CurveSection {
    fn default() -> Self {
        CurveSection::Flat { rate: 0.03 }
    }
}

/// Stochastic process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSection {
    /// One-factor Hull-White short rate
    HullWhite {
        mean_reversion: f64,
        volatility: f64,
    },
    /// Correlated lognormal assets
    BlackScholes {
        assets: Vec<AssetSection>,
        /// Row-major correlation matrix; independent assets when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        correlation: Option<Vec<f64>>,
    },
    /// Two-factor mean-reverting commodity futures
    TwoFactor {
        alias: String,
        futures_times: Vec<f64>,
        futures_prices: Vec<f64>,
        sigma: f64,
        eta: f64,
        a: f64,
        b: f64,
        rho: f64,
    },
}

impl Default for ModelSection {
    fn default() -> Self {
        ModelSection::HullWhite {
            mean_reversion: 0.05,
            volatility: 0.01,
        }
    }
}

/// One Black-Scholes asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSection {
    pub alias: String,
    pub spot: f64,
    pub volatility: f64,
    #[serde(default)]
    pub dividend_yield: f64,
}

/// Adjuster calibration grids. Empty grids skip the adjuster.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjusterSection {
    pub numeraire: Vec<f64>,
    pub zero_bond_times: Vec<f64>,
    pub zero_bond_offsets: Vec<f64>,
    pub asset_times: Vec<f64>,
    pub assets: Vec<String>,
}

/// A product to price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductSection {
    /// Unit payment at `pay`, fixed at `obs`
    Cash { obs: f64, pay: f64 },
    /// Zero bond `P(obs, maturity)`
    ZeroBond { obs: f64, maturity: f64 },
    /// European option on an asset
    Vanilla {
        obs: f64,
        alias: String,
        strike: f64,
        call_put: CallPut,
    },
    /// Swaption on the model's own curve
    Swaption {
        expiry: f64,
        times: Vec<f64>,
        strike: f64,
        call_put: CallPut,
    },
}

impl ProductSection {
    /// Short row label for result tables.
    pub fn label(&self) -> String {
        match self {
            ProductSection::Cash { obs, pay } => format!("cash({obs}, {pay})"),
            ProductSection::ZeroBond { obs, maturity } => format!("zero_bond({obs}, {maturity})"),
            ProductSection::Vanilla {
                obs,
                alias,
                strike,
                call_put,
            } => format!("{}({alias}, {obs}, {strike})", call_put_name(*call_put)),
            ProductSection::Swaption {
                expiry,
                times,
                strike,
                call_put,
            } => {
                let end = times.last().copied().unwrap_or(*expiry);
                format!("{}_swaption({expiry}x{end}, {strike})", call_put_name(*call_put))
            }
        }
    }
}

fn call_put_name(call_put: CallPut) -> &'static str {
    match call_put {
        CallPut::Call => "call",
        CallPut::Put => "put",
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Command line values that take precedence over every other source.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub paths: Option<usize>,
    pub seed: Option<u64>,
    pub log_level: Option<LogLevel>,
    pub threads: Option<usize>,
}

impl ScenarioConfig {
    /// Loads and validates the scenario in `path`.
    pub fn load(path: &Path, overrides: &Overrides) -> Result<Self> {
        Self::build(File::from(path).format(FileFormat::Toml), overrides)
    }

    /// Loads and validates a scenario from TOML text.
    pub fn from_toml_str(text: &str, overrides: &Overrides) -> Result<Self> {
        Self::build(File::from_str(text, FileFormat::Toml), overrides)
    }

    fn build<S>(file: S, overrides: &Overrides) -> Result<Self>
    where
        S: Source + Send + Sync + 'static,
    {
        let settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("PRICER").separator("__").try_parsing(true))
            .set_override_option("simulation.paths", overrides.paths.map(|p| p as u64))?
            .set_override_option("simulation.seed", overrides.seed)?
            .set_override_option("log_level", overrides.log_level.map(|l| l.to_string()))?
            .set_override_option("threads", overrides.threads.map(|t| t as u64))?
            .build()?;
        let scenario: ScenarioConfig = settings.try_deserialize()?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Structural checks that do not need the model.
    pub fn validate(&self) -> Result<()> {
        if self.products.is_empty() {
            return Err(CliError::InvalidScenario(
                "at least one product is required".to_string(),
            ));
        }
        if self.threads == Some(0) {
            return Err(CliError::InvalidScenario(
                "threads must be positive".to_string(),
            ));
        }
        let adjusters = &self.adjusters;
        if adjusters.zero_bond_times.is_empty() != adjusters.zero_bond_offsets.is_empty() {
            return Err(CliError::InvalidScenario(
                "zero_bond_times and zero_bond_offsets must be given together".to_string(),
            ));
        }
        if adjusters.asset_times.is_empty() != adjusters.assets.is_empty() {
            return Err(CliError::InvalidScenario(
                "asset_times and assets must be given together".to_string(),
            ));
        }
        Ok(())
    }
}
