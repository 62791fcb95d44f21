//! Weighted baskets and rainbows.

use std::sync::Arc;

use pricer_core::traits::{lift, ActiveFloat};

use super::{latest_observation, union_times, Payoff, PayoffRef};
use crate::mc::{Path, SimulationError};

/// `Σ wₖ·xₖ` over a set of underlyings.
///
/// With `rainbow` set, the underlyings are ranked by value in descending
/// order on every path before the weights are applied, so `w₀` always
/// multiplies the best performer.
#[derive(Clone, Debug)]
pub struct Basket<T: ActiveFloat> {
    underlyings: Vec<PayoffRef<T>>,
    weights: Vec<f64>,
    rainbow: bool,
    obs: f64,
}

impl<T: ActiveFloat> Basket<T> {
    /// Creates a basket.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::InvalidPayoff`] for an empty basket
    /// - [`SimulationError::DimensionMismatch`] when weights and underlyings
    ///   differ in length
    pub fn new(
        underlyings: Vec<PayoffRef<T>>,
        weights: Vec<f64>,
        rainbow: bool,
    ) -> Result<Self, SimulationError> {
        if underlyings.is_empty() {
            return Err(SimulationError::InvalidPayoff {
                name: "Basket",
                reason: "at least one underlying required".to_string(),
            });
        }
        if underlyings.len() != weights.len() {
            return Err(SimulationError::DimensionMismatch {
                what: "basket weights",
                expected: underlyings.len(),
                got: weights.len(),
            });
        }
        let obs = latest_observation(&underlyings.iter().collect::<Vec<_>>());
        Ok(Self {
            underlyings,
            weights,
            rainbow,
            obs,
        })
    }

    /// Basket weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Whether underlyings are ranked per path.
    pub fn is_rainbow(&self) -> bool {
        self.rainbow
    }
}

impl<T: ActiveFloat> Payoff<T> for Basket<T> {
    fn observation_time(&self) -> f64 {
        self.obs
    }

    fn observation_times(&self) -> Vec<f64> {
        self.underlyings
            .iter()
            .fold(Vec::new(), |acc, x| union_times(acc, &x.observation_times()))
    }

    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        let mut values = self
            .underlyings
            .iter()
            .map(|x| x.value(path))
            .collect::<Result<Vec<T>, _>>()?;
        if self.rainbow {
            values.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        }
        Ok(values
            .iter()
            .zip(&self.weights)
            .fold(T::zero(), |acc, (&v, &w)| acc + lift::<T>(w) * v))
    }

    fn at(&self, t: f64) -> PayoffRef<T> {
        let underlyings: Vec<_> = self.underlyings.iter().map(|x| x.at(t)).collect();
        let obs = latest_observation(&underlyings.iter().collect::<Vec<_>>());
        Arc::new(Self {
            underlyings,
            weights: self.weights.clone(),
            rainbow: self.rainbow,
            obs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payoff::basic::{Asset, FixedAmount};
    use crate::payoff::testing::deterministic_simulation;
    use approx::assert_relative_eq;

    fn fixed(v: f64) -> PayoffRef<f64> {
        Arc::new(FixedAmount::new(v))
    }

    #[test]
    fn test_basket_validation() {
        assert!(matches!(
            Basket::<f64>::new(vec![], vec![], false),
            Err(SimulationError::InvalidPayoff { name: "Basket", .. })
        ));
        assert!(matches!(
            Basket::new(vec![fixed(1.0)], vec![1.0, 2.0], false),
            Err(SimulationError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_weighted_sum() {
        let sim = deterministic_simulation(0.05, 0.0);
        let path = sim.path(0).unwrap();
        let basket = Basket::new(vec![fixed(1.0), fixed(3.0)], vec![0.25, 0.5], false).unwrap();
        assert_relative_eq!(basket.value(&path).unwrap(), 1.75);
    }

    #[test]
    fn test_rainbow_ranks_per_path() {
        let sim = deterministic_simulation(0.05, 0.0);
        let path = sim.path(0).unwrap();
        let items = vec![fixed(1.0), fixed(3.0), fixed(2.0)];

        // best-of
        let best = Basket::new(items.clone(), vec![1.0, 0.0, 0.0], true).unwrap();
        assert_eq!(best.value(&path).unwrap(), 3.0);

        // worst-of
        let worst = Basket::new(items, vec![0.0, 0.0, 1.0], true).unwrap();
        assert_eq!(worst.value(&path).unwrap(), 1.0);
    }

    #[test]
    fn test_basket_times_and_reanchor() {
        let s: PayoffRef<f64> = Arc::new(Asset::new(2.0, "S"));
        let q: PayoffRef<f64> = Arc::new(Asset::new(1.0, "Q"));
        let basket = Basket::new(vec![s, q], vec![0.5, 0.5], false).unwrap();
        assert_eq!(basket.observation_time(), 2.0);
        assert_eq!(basket.observation_times(), vec![1.0, 2.0]);

        let moved = basket.at(0.5);
        assert_eq!(moved.observation_times(), vec![0.5]);
        assert_eq!(moved.observation_time(), 0.5);
    }
}
