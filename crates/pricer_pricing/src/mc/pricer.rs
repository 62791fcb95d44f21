//! Monte Carlo averaging of payoffs over simulated paths.
//!
//! The [`Pricer`] evaluates payoff trees path by path on the rayon pool and
//! averages the discounted values. Per-path values are collected before
//! summation, so results do not depend on the number of worker threads.

use pricer_core::traits::{lift, passive, ActiveFloat};
use rayon::prelude::*;
use tracing::debug;

use super::error::SimulationError;
use super::simulation::McSimulation;
use crate::payoff::{union_times, PayoffRef};

/// Pricing result of a payoff portfolio.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::PricingResult;
///
/// let result = PricingResult {
///     npv: 10.5,
///     std_error: 0.05,
///     n_paths: 10_000,
/// };
///
/// println!("NPV: {} +/- {}", result.npv, result.confidence_95());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingResult {
    /// Present value (mean of the discounted path values).
    pub npv: f64,
    /// Standard error of the estimate.
    pub std_error: f64,
    /// Number of paths averaged.
    pub n_paths: usize,
}

impl PricingResult {
    /// Returns the 95% confidence interval half-width.
    #[inline]
    pub fn confidence_95(&self) -> f64 {
        1.96 * self.std_error
    }

    /// Returns the 99% confidence interval half-width.
    #[inline]
    pub fn confidence_99(&self) -> f64 {
        2.576 * self.std_error
    }
}

/// A portfolio of payoffs priced together.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// use pricer_core::market_data::curves::FlatCurve;
/// use pricer_models::models::rates::HullWhiteProcess;
/// use pricer_pricing::mc::{McSimulation, Pricer, SimulationConfig};
/// use pricer_pricing::payoff::{Cash, PayoffRef};
///
/// let process = HullWhiteProcess::new(0.1, 0.01, FlatCurve::new(0.03)).unwrap();
/// let config = SimulationConfig::builder().n_paths(1_000).build().unwrap();
/// let mut sim: McSimulation<f64> =
///     McSimulation::new(Arc::new(process), &[1.0, 2.0], &[1.0, 2.0], config).unwrap();
/// sim.simulate();
///
/// let bond: PayoffRef<f64> = Arc::new(Cash::new(0.0, 2.0));
/// let pricer = Pricer::new(vec![bond]);
/// let result = pricer.price(&sim).unwrap();
/// assert!((result.npv - (-0.06_f64).exp()).abs() < 1e-3);
/// ```
#[derive(Clone, Debug)]
pub struct Pricer<T: ActiveFloat> {
    payoffs: Vec<PayoffRef<T>>,
}

impl<T: ActiveFloat> Pricer<T> {
    /// Creates a pricer for `payoffs`.
    pub fn new(payoffs: Vec<PayoffRef<T>>) -> Self {
        Self { payoffs }
    }

    /// The portfolio.
    pub fn payoffs(&self) -> &[PayoffRef<T>] {
        &self.payoffs
    }

    /// Every time any payoff reads.
    pub fn observation_times(&self) -> Vec<f64> {
        self.payoffs
            .iter()
            .fold(Vec::new(), |acc, x| union_times(acc, &x.observation_times()))
    }

    /// Undiscounted value of `payoff` on every path.
    pub fn values(payoff: &PayoffRef<T>, sim: &McSimulation<T>) -> Result<Vec<T>, SimulationError> {
        sim.prepare_times(&payoff.observation_times())?;
        (0..sim.n_paths())
            .into_par_iter()
            .map(|k| payoff.value(&sim.path(k)?))
            .collect()
    }

    /// Numeraire-deflated value of `payoff` on every path.
    pub fn discounted_values(
        payoff: &PayoffRef<T>,
        sim: &McSimulation<T>,
    ) -> Result<Vec<T>, SimulationError> {
        sim.prepare_times(&payoff.observation_times())?;
        (0..sim.n_paths())
            .into_par_iter()
            .map(|k| payoff.discounted_value(&sim.path(k)?))
            .collect()
    }

    /// Mean over paths of the summed discounted values of `payoffs`.
    pub fn npv_of(payoffs: &[PayoffRef<T>], sim: &McSimulation<T>) -> Result<T, SimulationError> {
        let totals = Self::path_totals(payoffs, sim)?;
        Ok(mean(&totals))
    }

    /// Mean discounted value of each payoff separately.
    pub fn npvs_of(
        payoffs: &[PayoffRef<T>],
        sim: &McSimulation<T>,
    ) -> Result<Vec<T>, SimulationError> {
        payoffs
            .iter()
            .map(|x| Self::discounted_values(x, sim).map(|v| mean(&v)))
            .collect()
    }

    /// NPV of the whole portfolio.
    #[tracing::instrument(skip_all, fields(n_payoffs = self.payoffs.len(), n_paths = sim.n_paths()))]
    pub fn npv(&self, sim: &McSimulation<T>) -> Result<T, SimulationError> {
        Self::npv_of(&self.payoffs, sim)
    }

    /// NPV of each payoff in the portfolio.
    pub fn npvs(&self, sim: &McSimulation<T>) -> Result<Vec<T>, SimulationError> {
        Self::npvs_of(&self.payoffs, sim)
    }

    /// NPV with its Monte Carlo standard error.
    #[tracing::instrument(skip_all, fields(n_payoffs = self.payoffs.len(), n_paths = sim.n_paths()))]
    pub fn price(&self, sim: &McSimulation<T>) -> Result<PricingResult, SimulationError> {
        let totals: Vec<f64> = Self::path_totals(&self.payoffs, sim)?
            .into_iter()
            .map(passive)
            .collect();
        let n_paths = totals.len();
        let npv = totals.iter().sum::<f64>() / n_paths as f64;
        let std_error = if n_paths > 1 {
            let variance =
                totals.iter().map(|&p| (p - npv).powi(2)).sum::<f64>() / (n_paths - 1) as f64;
            (variance / n_paths as f64).sqrt()
        } else {
            0.0
        };
        debug!(npv, std_error, "priced portfolio");
        Ok(PricingResult {
            npv,
            std_error,
            n_paths,
        })
    }

    /// Summed discounted value per path.
    fn path_totals(
        payoffs: &[PayoffRef<T>],
        sim: &McSimulation<T>,
    ) -> Result<Vec<T>, SimulationError> {
        let times = payoffs
            .iter()
            .fold(Vec::new(), |acc, x| union_times(acc, &x.observation_times()));
        sim.prepare_times(&times)?;
        (0..sim.n_paths())
            .into_par_iter()
            .map(|k| {
                let path = sim.path(k)?;
                payoffs
                    .iter()
                    .try_fold(T::zero(), |acc, x| {
                        Ok::<T, SimulationError>(acc + x.discounted_value(&path)?)
                    })
            })
            .collect()
    }
}

fn mean<T: ActiveFloat>(values: &[T]) -> T {
    let n: T = lift(values.len() as f64);
    values.iter().fold(T::zero(), |acc, &v| acc + v) / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payoff::testing::deterministic_simulation;
    use crate::payoff::{CallPut, Cash, FixedAmount, Pay, VanillaOption};
    use approx::assert_relative_eq;
    use std::sync::Arc;

    const RATE: f64 = 0.05;

    #[test]
    fn test_pricing_result_confidence() {
        let result = PricingResult {
            npv: 1.0,
            std_error: 0.1,
            n_paths: 100,
        };
        assert_relative_eq!(result.confidence_95(), 0.196);
        assert_relative_eq!(result.confidence_99(), 0.2576);
    }

    #[test]
    fn test_npv_agrees_with_price() {
        let sim = deterministic_simulation(RATE, 0.0);
        let bond: PayoffRef<f64> = Arc::new(Cash::new(1.0, 3.0));
        let pricer = Pricer::new(vec![bond]);
        assert_relative_eq!(
            pricer.npv(&sim).unwrap(),
            pricer.price(&sim).unwrap().npv,
            epsilon = 1e-15
        );
        assert_eq!(mean(&[1.0_f64, 2.0, 6.0]), 3.0);
    }

    #[test]
    fn test_npv_sums_and_npvs_split() {
        let sim = deterministic_simulation(RATE, 0.0);
        let fixed: PayoffRef<f64> = Arc::new(FixedAmount::new(3.0));
        let bond: PayoffRef<f64> = Arc::new(Cash::new(1.0, 2.0));
        let payoffs = vec![fixed, bond];

        let npvs = Pricer::npvs_of(&payoffs, &sim).unwrap();
        assert_eq!(npvs[0], 3.0);
        assert_relative_eq!(npvs[1], (-RATE * 2.0).exp(), epsilon = 1e-14);

        let npv = Pricer::npv_of(&payoffs, &sim).unwrap();
        assert_relative_eq!(npv, npvs[0] + npvs[1], epsilon = 1e-14);

        let pricer = Pricer::new(payoffs);
        assert_eq!(pricer.observation_times(), vec![0.0, 1.0]);
        assert_relative_eq!(pricer.npv(&sim).unwrap(), npv, epsilon = 1e-14);
        assert_eq!(pricer.npvs(&sim).unwrap(), npvs);
    }

    #[test]
    fn test_values_and_discounted_values() {
        let sim = deterministic_simulation(RATE, 0.0);
        let paid: PayoffRef<f64> = Arc::new(Pay::new(Arc::new(FixedAmount::new(1.0)), 2.0));

        let values = Pricer::values(&paid, &sim).unwrap();
        assert_eq!(values, vec![1.0; sim.n_paths()]);

        let discounted = Pricer::discounted_values(&paid, &sim).unwrap();
        for v in discounted {
            assert_relative_eq!(v, (-RATE * 2.0).exp(), epsilon = 1e-14);
        }
    }

    #[test]
    fn test_price_of_deterministic_payoff_has_no_error() {
        let sim = deterministic_simulation(RATE, 0.1);
        let call: PayoffRef<f64> = Arc::new(VanillaOption::new(1.0, "S", 100.0, CallPut::Call));
        let result = Pricer::new(vec![call]).price(&sim).unwrap();

        let expected = (100.0 * 0.1_f64.exp() - 100.0) * (-RATE).exp();
        assert_relative_eq!(result.npv, expected, epsilon = 1e-10);
        assert_eq!(result.std_error, 0.0);
        assert_eq!(result.n_paths, sim.n_paths());
    }

    #[test]
    fn test_errors_surface_from_payoffs() {
        let sim = deterministic_simulation(RATE, 0.0);
        let broken: PayoffRef<f64> = Arc::new(VanillaOption::new(1.0, "UNKNOWN", 100.0, CallPut::Call));
        assert!(Pricer::new(vec![broken]).price(&sim).is_err());
    }
}
