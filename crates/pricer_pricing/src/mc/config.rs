//! Monte Carlo simulation configuration.
//!
//! This module provides [`SimulationConfig`] and its builder. The time grids
//! are not part of the configuration; they are validated by
//! [`TimeGrid`](super::TimeGrid) when the simulator is constructed.

use super::error::ConfigError;

/// Maximum number of simulation paths allowed.
pub const MAX_PATHS: usize = 10_000_000;

/// Default master seed.
pub const DEFAULT_SEED: u64 = 1234;

/// Monte Carlo simulation configuration.
///
/// Immutable configuration specifying simulation parameters.
/// Use [`SimulationConfigBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::SimulationConfig;
///
/// let config = SimulationConfig::builder()
///     .n_paths(10_000)
///     .seed(42)
///     .richardson(false)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.n_paths(), 10_000);
/// assert!(!config.richardson());
/// assert!(!config.time_interpolation());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationConfig {
    n_paths: usize,
    seed: u64,
    richardson: bool,
    time_interpolation: bool,
    store_brownians: bool,
}

impl SimulationConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::default()
    }

    /// Returns the number of simulation paths.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Returns the master seed.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether each step uses Richardson extrapolation.
    #[inline]
    pub fn richardson(&self) -> bool {
        self.richardson
    }

    /// Whether states between observation times may be interpolated.
    #[inline]
    pub fn time_interpolation(&self) -> bool {
        self.time_interpolation
    }

    /// Whether Brownian increments are generated once and kept.
    #[inline]
    pub fn store_brownians(&self) -> bool {
        self.store_brownians
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPathCount` if `n_paths` is 0 or greater
    /// than 10,000,000.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_paths == 0 || self.n_paths > MAX_PATHS {
            return Err(ConfigError::InvalidPathCount(self.n_paths));
        }
        Ok(())
    }
}

/// Builder for [`SimulationConfig`].
///
/// Defaults: seed 1234, Richardson extrapolation on, time interpolation off,
/// Brownian storage off. `n_paths` has no default.
#[derive(Clone, Debug)]
pub struct SimulationConfigBuilder {
    n_paths: Option<usize>,
    seed: u64,
    richardson: bool,
    time_interpolation: bool,
    store_brownians: bool,
}

impl Default for SimulationConfigBuilder {
    fn default() -> Self {
        Self {
            n_paths: None,
            seed: DEFAULT_SEED,
            richardson: true,
            time_interpolation: false,
            store_brownians: false,
        }
    }
}

impl SimulationConfigBuilder {
    /// Sets the number of simulation paths.
    #[inline]
    pub fn n_paths(mut self, n_paths: usize) -> Self {
        self.n_paths = Some(n_paths);
        self
    }

    /// Sets the master seed.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enables or disables Richardson extrapolation.
    #[inline]
    pub fn richardson(mut self, richardson: bool) -> Self {
        self.richardson = richardson;
        self
    }

    /// Allows or forbids linear state interpolation between observation times.
    #[inline]
    pub fn time_interpolation(mut self, time_interpolation: bool) -> Self {
        self.time_interpolation = time_interpolation;
        self
    }

    /// Keeps the Brownian increments for replay across `simulate()` calls.
    #[inline]
    pub fn store_brownians(mut self, store_brownians: bool) -> Self {
        self.store_brownians = store_brownians;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `n_paths` is not set or out of range.
    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let n_paths = self.n_paths.ok_or(ConfigError::InvalidParameter {
            name: "n_paths",
            value: "must be specified".to_string(),
        })?;

        let config = SimulationConfig {
            n_paths,
            seed: self.seed,
            richardson: self.richardson,
            time_interpolation: self.time_interpolation,
            store_brownians: self.store_brownians,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder_defaults() {
        let config = SimulationConfig::builder().n_paths(1000).build().unwrap();

        assert_eq!(config.n_paths(), 1000);
        assert_eq!(config.seed(), DEFAULT_SEED);
        assert!(config.richardson());
        assert!(!config.time_interpolation());
        assert!(!config.store_brownians());
    }

    #[test]
    fn test_config_builder_overrides() {
        let config = SimulationConfig::builder()
            .n_paths(10)
            .seed(42)
            .richardson(false)
            .time_interpolation(true)
            .store_brownians(true)
            .build()
            .unwrap();

        assert_eq!(config.seed(), 42);
        assert!(!config.richardson());
        assert!(config.time_interpolation());
        assert!(config.store_brownians());
    }

    #[test]
    fn test_config_invalid_zero_paths() {
        let result = SimulationConfig::builder().n_paths(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidPathCount(0))));
    }

    #[test]
    fn test_config_invalid_too_many_paths() {
        let result = SimulationConfig::builder().n_paths(MAX_PATHS + 1).build();
        assert!(matches!(result, Err(ConfigError::InvalidPathCount(_))));
    }

    #[test]
    fn test_config_missing_paths() {
        let result = SimulationConfig::builder().build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "n_paths",
                ..
            })
        ));
    }
}
