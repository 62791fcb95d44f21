//! Merged simulation and observation time grid.
//!
//! The simulator integrates on `sim_times` and stores states only on
//! `obs_times`. Construction merges the caller's two sequences:
//!
//! - observation times are reduced to `0` plus the strictly positive inputs
//! - simulation times `<= 0` are dropped and the merged grid starts at `0`
//! - a simulation time within one day of an observation time snaps to it
//! - a simulation-only time not beyond the last merged point is skipped
//!
//! so `obs_times ⊆ sim_times` and both are strictly ascending.

use super::error::ConfigError;

/// One calendar day in year fractions.
pub const ONE_DAY: f64 = 1.0 / 365.25;

/// Merged time grid with the observation-to-step mapping.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeGrid {
    sim_times: Vec<f64>,
    obs_times: Vec<f64>,
    // obs index stored after reaching sim_times[i], if any
    store_at: Vec<Option<usize>>,
}

impl TimeGrid {
    /// Merge `sim_times` and `obs_times`.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidTimeGrid` if either input is empty or not
    /// strictly ascending.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pricer_pricing::mc::TimeGrid;
    ///
    /// let grid = TimeGrid::new(&[0.0, 1.0, 2.0, 5.0], &[1.0, 2.0, 5.0]).unwrap();
    /// assert_eq!(grid.sim_times(), &[0.0, 1.0, 2.0, 5.0]);
    /// assert_eq!(grid.obs_times(), &[0.0, 1.0, 2.0, 5.0]);
    /// ```
    pub fn new(sim_times: &[f64], obs_times: &[f64]) -> Result<Self, ConfigError> {
        validate("sim_times", sim_times)?;
        validate("obs_times", obs_times)?;

        let obs: Vec<f64> = std::iter::once(0.0)
            .chain(obs_times.iter().copied().filter(|&t| t > 0.0))
            .collect();
        let sims: Vec<f64> = sim_times.iter().copied().filter(|&t| t > 0.0).collect();

        let mut merged = vec![0.0];
        let (mut i, mut j) = (0, 1);
        while i < sims.len() || j < obs.len() {
            if i < sims.len() && j < obs.len() && (sims[i] - obs[j]).abs() < ONE_DAY {
                merged.push(obs[j]);
                i += 1;
                j += 1;
            } else if j >= obs.len() || (i < sims.len() && sims[i] < obs[j]) {
                let last = merged.last().copied().unwrap_or(0.0);
                if sims[i] > last {
                    merged.push(sims[i]);
                }
                i += 1;
            } else {
                merged.push(obs[j]);
                j += 1;
            }
        }

        let mut store_at = vec![None; merged.len()];
        let mut k = 0;
        for (step, &t) in merged.iter().enumerate() {
            if k < obs.len() && t == obs[k] {
                store_at[step] = Some(k);
                k += 1;
            }
        }

        Ok(Self {
            sim_times: merged,
            obs_times: obs,
            store_at,
        })
    }

    /// Integration grid, starting at 0.
    #[inline]
    pub fn sim_times(&self) -> &[f64] {
        &self.sim_times
    }

    /// Observation grid, starting at 0.
    #[inline]
    pub fn obs_times(&self) -> &[f64] {
        &self.obs_times
    }

    /// Number of integration steps.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.sim_times.len() - 1
    }

    /// Number of observation times (including 0).
    #[inline]
    pub fn n_obs(&self) -> usize {
        self.obs_times.len()
    }

    /// Observation index written after reaching `sim_times[step]`.
    #[inline]
    pub fn store_index(&self, step: usize) -> Option<usize> {
        self.store_at.get(step).copied().flatten()
    }

    /// Whether every simulation time is an observation time.
    pub fn is_aligned(&self) -> bool {
        self.sim_times == self.obs_times
    }

    /// Index of the first observation time `>= t`, clamped to the last one.
    pub fn obs_lower_bound(&self, t: f64) -> usize {
        self.obs_times
            .partition_point(|&s| s < t)
            .min(self.obs_times.len() - 1)
    }
}

fn validate(name: &'static str, times: &[f64]) -> Result<(), ConfigError> {
    if times.is_empty() {
        return Err(ConfigError::InvalidTimeGrid {
            name,
            reason: "must not be empty".to_string(),
        });
    }
    if let Some(k) = times.iter().position(|t| !t.is_finite()) {
        return Err(ConfigError::InvalidTimeGrid {
            name,
            reason: format!("non-finite time at index {k}"),
        });
    }
    if let Some(k) = times.windows(2).position(|w| !(w[1] > w[0])) {
        return Err(ConfigError::InvalidTimeGrid {
            name,
            reason: format!("not strictly ascending at index {}", k + 1),
        });
    }
    Ok(())
}
