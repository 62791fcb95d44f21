//! Numeraire, zero-coupon bond and asset adjusters.
//!
//! Adjusters remove the first-order discretisation bias of a simulation by
//! matching path averages against the process's own time-0 term structure:
//!
//! | Adjuster | Calibrated quantity | Read-side correction |
//! |----------|---------------------|----------------------|
//! | numeraire | `z_i = ln(E[1/N(t_i)] / P(0,t_i)) / t_i` | `N · exp(z(t)·t)` |
//! | zero bond | `z_ij = -ln(P(0,t_i+δ_j) / E[ZB/(N̂)]) / δ_j` | `ZB · exp(-z(t,T-t)·(T-t))` |
//! | asset | `(P(0,t)F(0,t) - E[S/N̂]) / E[1/N̂]` | `S + a(t)` |
//!
//! where `N̂` is the already adjusted numeraire. Every table is read with
//! linear (bilinear) interpolation and flat extrapolation. Uncalibrated
//! adjusters are the identity.

use std::collections::{HashMap, HashSet};

use pricer_core::math::interpolators::{BilinearInterpolator, LinearInterpolator};
use pricer_core::traits::{lift, ActiveFloat, Float};
use rayon::prelude::*;
use tracing::debug;

use super::error::SimulationError;
use super::simulation::McSimulation;

/// Calibrated adjuster tables of one simulator.
#[derive(Clone, Debug)]
pub struct Adjusters<T: Float> {
    numeraire: Option<LinearInterpolator<T>>,
    zero_bond: Option<BilinearInterpolator<T>>,
    assets: HashMap<String, LinearInterpolator<T>>,
}

impl<T: Float> Default for Adjusters<T> {
    fn default() -> Self {
        Self {
            numeraire: None,
            zero_bond: None,
            assets: HashMap::new(),
        }
    }
}

impl<T: Float> Adjusters<T> {
    /// Multiplicative numeraire correction at `t`; 1 if not calibrated.
    pub fn numeraire(&self, t: f64) -> T {
        match &self.numeraire {
            Some(z) => (z.interpolate_flat(lift(t)) * lift(t)).exp(),
            None => T::one(),
        }
    }

    /// Multiplicative zero bond correction for `P(t, maturity)`; 1 if not
    /// calibrated.
    pub fn zero_bond(&self, t: f64, maturity: f64) -> T {
        match &self.zero_bond {
            Some(z) => {
                let tau: T = lift(maturity - t);
                (-z.interpolate_flat(lift(t), tau) * tau).exp()
            }
            None => T::one(),
        }
    }

    /// Additive asset correction; 0 for an uncalibrated alias.
    pub fn asset(&self, t: f64, alias: &str) -> T {
        self.assets
            .get(alias)
            .map_or_else(T::zero, |a| a.interpolate_flat(lift(t)))
    }

    /// Whether the numeraire adjuster is calibrated.
    pub fn has_numeraire(&self) -> bool {
        self.numeraire.is_some()
    }

    /// Whether the zero bond adjuster is calibrated.
    pub fn has_zero_bond(&self) -> bool {
        self.zero_bond.is_some()
    }

    /// Aliases with a calibrated asset adjuster.
    pub fn asset_aliases(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }

    /// Numeraire adjuster rates at their calibration times.
    pub fn numeraire_rates(&self) -> Option<(&[T], &[T])> {
        self.numeraire.as_ref().map(|z| (z.xs(), z.ys()))
    }

    /// Zero bond adjuster rates, one row per observation time.
    pub fn zero_bond_rates(&self) -> Option<&[Vec<T>]> {
        self.zero_bond.as_ref().map(BilinearInterpolator::zs)
    }

    /// Removes every calibrated table.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn validate_times(
    name: &'static str,
    times: &[f64],
    allow_zero_start: bool,
) -> Result<(), SimulationError> {
    let invalid = |reason: String| SimulationError::InvalidCalibration { name, reason };
    if times.len() < 2 {
        return Err(invalid(format!(
            "at least two times required, got {}",
            times.len()
        )));
    }
    let first_ok = if allow_zero_start {
        times[0] >= 0.0
    } else {
        times[0] > 0.0
    };
    if !first_ok {
        return Err(invalid(format!("first time {} out of range", times[0])));
    }
    if let Some(k) = times.windows(2).position(|w| !(w[1] > w[0])) {
        return Err(invalid(format!("not strictly ascending at index {}", k + 1)));
    }
    Ok(())
}

fn lift_all<T: Float>(xs: &[f64]) -> Vec<T> {
    xs.iter().map(|&x| lift(x)).collect()
}

impl<T: ActiveFloat> McSimulation<T> {
    /// Sums `f(path, row)` over all paths in parallel.
    fn path_sums<F>(&self, width: usize, f: F) -> Result<Vec<T>, SimulationError>
    where
        F: Fn(usize, &mut [T]) -> Result<(), SimulationError> + Send + Sync,
    {
        (0..self.n_paths())
            .into_par_iter()
            .try_fold(
                || (vec![T::zero(); width], vec![T::zero(); width]),
                |(mut acc, mut row), k| {
                    f(k, &mut row)?;
                    for (a, &r) in acc.iter_mut().zip(&row) {
                        *a = *a + r;
                    }
                    Ok::<_, SimulationError>((acc, row))
                },
            )
            .map(|partial| partial.map(|(acc, _)| acc))
            .try_reduce(
                || vec![T::zero(); width],
                |mut a, b| {
                    for (x, y) in a.iter_mut().zip(b) {
                        *x = *x + y;
                    }
                    Ok(a)
                },
            )
    }

    fn zero_bond_today(&self, maturity: f64) -> Result<T, SimulationError> {
        Ok(self
            .process()
            .zero_bond(0.0, maturity, self.initial_values())?)
    }

    /// Calibrates the numeraire adjuster on `times`.
    ///
    /// Afterwards the adjusted path average of `1/N(t_i)` equals `P(0, t_i)`.
    ///
    /// # Errors
    ///
    /// `InvalidCalibration` unless there are at least two strictly ascending
    /// positive times; any state or process query error.
    #[tracing::instrument(skip_all, fields(n_times = times.len()))]
    pub fn calibrate_numeraire_adjuster(&mut self, times: &[f64]) -> Result<(), SimulationError> {
        validate_times("numeraire times", times, false)?;
        self.prepare_times(times)?;

        let process = self.process().as_ref();
        let sums = self.path_sums(times.len(), |k, row| {
            for (r, &t) in row.iter_mut().zip(times) {
                let state = self.state(k, t)?;
                *r = T::one() / process.numeraire(t, &state)?;
            }
            Ok(())
        })?;

        let n: T = lift(self.n_paths() as f64);
        let rates = times
            .iter()
            .zip(&sums)
            .map(|(&t, &sum)| Ok((sum / n / self.zero_bond_today(t)?).ln() / lift(t)))
            .collect::<Result<Vec<T>, SimulationError>>()?;

        let table = LinearInterpolator::new(&lift_all(times), &rates).map_err(|e| {
            SimulationError::InvalidCalibration {
                name: "numeraire times",
                reason: e.to_string(),
            }
        })?;
        self.adjusters.numeraire = Some(table);
        self.adjuster_epoch += 1;
        debug!(rates = ?rates, "numeraire adjuster calibrated");
        Ok(())
    }

    /// Calibrates the zero bond adjuster on `obs_times × offsets`.
    ///
    /// Uses the current numeraire adjuster, so calibrate that one first.
    ///
    /// # Errors
    ///
    /// `InvalidCalibration` unless both inputs hold at least two strictly
    /// ascending positive times; any state or process query error.
    #[tracing::instrument(skip_all, fields(n_times = obs_times.len(), n_offsets = offsets.len()))]
    pub fn calibrate_zero_bond_adjuster(
        &mut self,
        obs_times: &[f64],
        offsets: &[f64],
    ) -> Result<(), SimulationError> {
        validate_times("zero bond times", obs_times, false)?;
        validate_times("zero bond offsets", offsets, false)?;
        self.prepare_times(obs_times)?;

        let process = self.process().as_ref();
        let adjusters = &self.adjusters;
        let n_off = offsets.len();
        let sums = self.path_sums(obs_times.len() * n_off, |k, row| {
            for (i, &t) in obs_times.iter().enumerate() {
                let state = self.state(k, t)?;
                let numeraire = process.numeraire(t, &state)? * adjusters.numeraire(t);
                for (j, &delta) in offsets.iter().enumerate() {
                    row[i * n_off + j] = process.zero_bond(t, t + delta, &state)? / numeraire;
                }
            }
            Ok(())
        })?;

        let n: T = lift(self.n_paths() as f64);
        let mut rates = Vec::with_capacity(obs_times.len());
        for (i, &t) in obs_times.iter().enumerate() {
            let mut row = Vec::with_capacity(n_off);
            for (j, &delta) in offsets.iter().enumerate() {
                let average = sums[i * n_off + j] / n;
                let target = self.zero_bond_today(t + delta)?;
                row.push(-(target / average).ln() / lift(delta));
            }
            rates.push(row);
        }

        let table = BilinearInterpolator::new(&lift_all(obs_times), &lift_all(offsets), rates)
            .map_err(|e| SimulationError::InvalidCalibration {
                name: "zero bond times",
                reason: e.to_string(),
            })?;
        self.adjusters.zero_bond = Some(table);
        self.adjuster_epoch += 1;
        debug!("zero bond adjuster calibrated");
        Ok(())
    }

    /// Calibrates additive asset adjusters for each alias on `times`.
    ///
    /// Afterwards `E[(S(t_i) + a(t_i)) / N̂(t_i)] = P(0,t_i)·F(0,t_i)`.
    /// Previously calibrated aliases not listed here are kept.
    ///
    /// # Errors
    ///
    /// `InvalidCalibration` unless there are at least two strictly ascending
    /// non-negative times and a non-empty list of distinct aliases; any
    /// state or process query error.
    #[tracing::instrument(skip_all, fields(n_times = times.len(), n_aliases = aliases.len()))]
    pub fn calibrate_asset_adjuster(
        &mut self,
        times: &[f64],
        aliases: &[&str],
    ) -> Result<(), SimulationError> {
        validate_times("asset times", times, true)?;
        if aliases.is_empty() {
            return Err(SimulationError::InvalidCalibration {
                name: "aliases",
                reason: "at least one alias required".to_string(),
            });
        }
        let mut seen = HashSet::new();
        if let Some(dup) = aliases.iter().find(|a| !seen.insert(**a)) {
            return Err(SimulationError::InvalidCalibration {
                name: "aliases",
                reason: format!("duplicate alias '{dup}'"),
            });
        }
        self.prepare_times(times)?;

        let process = self.process().as_ref();
        let adjusters = &self.adjusters;
        let n_t = times.len();
        let n_a = aliases.len();
        // row layout: [1/N̂ per time | S/N̂ per time and alias]
        let sums = self.path_sums(n_t * (1 + n_a), |k, row| {
            for (i, &t) in times.iter().enumerate() {
                let state = self.state(k, t)?;
                let inv = T::one() / (process.numeraire(t, &state)? * adjusters.numeraire(t));
                row[i] = inv;
                for (a, alias) in aliases.iter().enumerate() {
                    row[n_t + i * n_a + a] = process.asset(t, &state, alias)? * inv;
                }
            }
            Ok(())
        })?;

        let n: T = lift(self.n_paths() as f64);
        let x0 = self.initial_values().to_vec();
        let knots = lift_all(times);
        for (a, alias) in aliases.iter().enumerate() {
            let mut values = Vec::with_capacity(n_t);
            for (i, &t) in times.iter().enumerate() {
                let discount = self.zero_bond_today(t)?;
                let forward = self.process().forward_asset(0.0, t, &x0, alias)?;
                let mean_asset = sums[n_t + i * n_a + a] / n;
                let mean_inv = sums[i] / n;
                values.push((discount * forward - mean_asset) / mean_inv);
            }
            let table = LinearInterpolator::new(&knots, &values).map_err(|e| {
                SimulationError::InvalidCalibration {
                    name: "asset times",
                    reason: e.to_string(),
                }
            })?;
            self.adjusters.assets.insert((*alias).to_string(), table);
        }
        self.adjuster_epoch += 1;
        debug!(aliases = ?aliases, "asset adjuster calibrated");
        Ok(())
    }

    /// Calibrated adjuster tables.
    #[inline]
    pub fn adjusters(&self) -> &Adjusters<T> {
        &self.adjusters
    }

    /// Numeraire correction at `t` (1 if not calibrated).
    #[inline]
    pub fn numeraire_adjustment(&self, t: f64) -> T {
        self.adjusters.numeraire(t)
    }

    /// Zero bond correction for `P(t, maturity)` (1 if not calibrated).
    #[inline]
    pub fn zero_bond_adjustment(&self, t: f64, maturity: f64) -> T {
        self.adjusters.zero_bond(t, maturity)
    }

    /// Zero bond correction on a foreign curve; alias curves are never
    /// adjusted.
    #[inline]
    pub fn zero_bond_adjustment_in(&self, _t: f64, _maturity: f64, _alias: &str) -> T {
        T::one()
    }

    /// Additive asset correction (0 for an uncalibrated alias).
    #[inline]
    pub fn asset_adjustment(&self, t: f64, alias: &str) -> T {
        self.adjusters.asset(t, alias)
    }

    /// Drops every adjuster table.
    pub fn clear_adjusters(&mut self) {
        self.adjusters.clear();
        self.adjuster_epoch += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mc::SimulationConfig;
    use approx::assert_relative_eq;
    use pricer_models::models::{ProcessError, StochasticProcess};
    use std::sync::Arc;

    /// Driftless log-asset with a deterministic 3% bank account.
    ///
    /// State `[ln S]`; numeraire `exp(r t)`; forward `S0 exp(r t)`.
    struct ToyAsset {
        sigma: f64,
    }

    const RATE: f64 = 0.03;

    impl StochasticProcess<f64> for ToyAsset {
        fn model_name(&self) -> &'static str {
            "ToyAsset"
        }
        fn size(&self) -> usize {
            1
        }
        fn factors(&self) -> usize {
            1
        }
        fn initial_values(&self) -> Vec<f64> {
            vec![0.0]
        }
        fn drift(&self, _t: f64, _x: &[f64]) -> Vec<f64> {
            vec![0.0]
        }
        fn diffusion(&self, _t: f64, _x: &[f64]) -> Vec<f64> {
            vec![self.sigma]
        }
        fn numeraire(&self, t: f64, x: &[f64]) -> Result<f64, ProcessError> {
            // deliberately path dependent so the adjuster has work to do
            Ok((RATE * t + 0.1 * x[0]).exp())
        }
        fn zero_bond(&self, t: f64, maturity: f64, x: &[f64]) -> Result<f64, ProcessError> {
            Ok((-RATE * (maturity - t) + 0.01 * x[0]).exp())
        }
        fn asset(&self, _t: f64, x: &[f64], alias: &str) -> Result<f64, ProcessError> {
            match alias {
                "S" => Ok(100.0 * x[0].exp()),
                other => Err(ProcessError::UnknownAlias(other.to_string())),
            }
        }
        fn forward_asset(
            &self,
            t: f64,
            settlement: f64,
            _x: &[f64],
            _alias: &str,
        ) -> Result<f64, ProcessError> {
            Ok(100.0 * (RATE * (settlement - t)).exp())
        }
    }

    fn simulated(n_paths: usize) -> McSimulation<f64> {
        let process: Arc<dyn StochasticProcess<f64>> = Arc::new(ToyAsset { sigma: 0.2 });
        let config = SimulationConfig::builder()
            .n_paths(n_paths)
            .seed(11)
            .richardson(false)
            .build()
            .unwrap();
        let times = [0.5, 1.0, 2.0];
        let mut sim = McSimulation::new(process, &times, &times, config).unwrap();
        sim.simulate();
        sim
    }

    fn mean<F: Fn(usize) -> f64>(n: usize, f: F) -> f64 {
        (0..n).map(f).sum::<f64>() / n as f64
    }

    // ========================================================================
    // Defaults and validation
    // ========================================================================

    #[test]
    fn test_uncalibrated_adjusters_are_identity() {
        let sim = simulated(8);
        assert_eq!(sim.numeraire_adjustment(1.0), 1.0);
        assert_eq!(sim.zero_bond_adjustment(1.0, 2.0), 1.0);
        assert_eq!(sim.zero_bond_adjustment_in(1.0, 2.0, "EUR"), 1.0);
        assert_eq!(sim.asset_adjustment(1.0, "S"), 0.0);
    }

    #[test]
    fn test_calibration_input_validation() {
        let mut sim = simulated(8);
        assert!(matches!(
            sim.calibrate_numeraire_adjuster(&[1.0]),
            Err(SimulationError::InvalidCalibration { .. })
        ));
        assert!(sim.calibrate_numeraire_adjuster(&[0.0, 1.0]).is_err());
        assert!(sim.calibrate_numeraire_adjuster(&[1.0, 0.5]).is_err());
        assert!(sim.calibrate_zero_bond_adjuster(&[0.5, 1.0], &[1.0]).is_err());
        assert!(sim.calibrate_asset_adjuster(&[0.0, 1.0], &[]).is_err());
        assert!(sim.calibrate_asset_adjuster(&[0.0, 1.0], &["S", "S"]).is_err());
    }

    // ========================================================================
    // Exactness
    // ========================================================================

    #[test]
    fn test_numeraire_adjuster_matches_discount_curve() {
        let mut sim = simulated(500);
        let times = [0.5, 1.0, 2.0];
        sim.calibrate_numeraire_adjuster(&times).unwrap();

        for &t in &times {
            let adjusted = mean(500, |k| {
                let x = sim.state(k, t).unwrap();
                1.0 / (sim.process().numeraire(t, &x).unwrap() * sim.numeraire_adjustment(t))
            });
            assert_relative_eq!(adjusted, (-RATE * t).exp(), max_relative = 1e-12);
        }
        assert!(sim.adjusters().has_numeraire());
    }

    #[test]
    fn test_zero_bond_adjuster_matches_discount_curve() {
        let mut sim = simulated(400);
        sim.calibrate_numeraire_adjuster(&[0.5, 1.0, 2.0]).unwrap();
        sim.calibrate_zero_bond_adjuster(&[0.5, 1.0], &[0.5, 1.0]).unwrap();

        for &t in &[0.5, 1.0] {
            for &delta in &[0.5, 1.0] {
                let adjusted = mean(400, |k| {
                    let x = sim.state(k, t).unwrap();
                    let process = sim.process();
                    let zb = process.zero_bond(t, t + delta, &x).unwrap()
                        * sim.zero_bond_adjustment(t, t + delta);
                    zb / (process.numeraire(t, &x).unwrap() * sim.numeraire_adjustment(t))
                });
                assert_relative_eq!(adjusted, (-RATE * (t + delta)).exp(), max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn test_asset_adjuster_matches_forward() {
        let mut sim = simulated(300);
        sim.calibrate_numeraire_adjuster(&[0.5, 1.0, 2.0]).unwrap();
        sim.calibrate_asset_adjuster(&[0.0, 1.0, 2.0], &["S"]).unwrap();

        for &t in &[1.0, 2.0] {
            let adjusted = mean(300, |k| {
                let x = sim.state(k, t).unwrap();
                let process = sim.process();
                let s = process.asset(t, &x, "S").unwrap() + sim.asset_adjustment(t, "S");
                s / (process.numeraire(t, &x).unwrap() * sim.numeraire_adjustment(t))
            });
            assert_relative_eq!(adjusted, 100.0, max_relative = 1e-10);
        }
        assert_eq!(sim.asset_adjustment(1.0, "unknown"), 0.0);
    }

    #[test]
    fn test_adjusters_survive_resimulation_until_cleared() {
        let mut sim = simulated(50);
        sim.calibrate_numeraire_adjuster(&[0.5, 1.0]).unwrap();
        let before = sim.numeraire_adjustment(0.75);

        sim.simulate();
        assert_eq!(sim.numeraire_adjustment(0.75), before);

        sim.clear_adjusters();
        assert_eq!(sim.numeraire_adjustment(0.75), 1.0);
    }

    #[test]
    fn test_numeraire_adjustment_flat_extrapolation() {
        let mut sim = simulated(50);
        sim.calibrate_numeraire_adjuster(&[0.5, 1.0]).unwrap();
        let (_, rates) = sim.adjusters().numeraire_rates().unwrap();
        let z_last = rates[1];

        assert_relative_eq!(
            sim.numeraire_adjustment(2.0),
            (z_last * 2.0).exp(),
            max_relative = 1e-14
        );
        assert_eq!(sim.numeraire_adjustment(0.0), 1.0);
    }
}
