//! Interest rate payoffs built from zero bond reads.
//!
//! Schedules are plain `(time, weight)` vectors in year fractions from
//! today. Weights and strikes are passive `f64` values lifted into the
//! active type at evaluation.
//!
//! # Re-anchoring
//!
//! - Index nodes ([`SwapRate`], [`LiborRate`]) move their whole schedule
//!   with the fixing time, so `rate.at(t)` is the same tenor fixed at `t`.
//! - Product nodes ([`GeneralSwaption`], [`Annuity`], [`ModelSwaption`])
//!   keep their schedule and only change the observation time.
//! - [`CashFlow`] keeps its start and payment dates.

use std::sync::Arc;

use pricer_core::traits::{lift, ActiveFloat};

use super::basic::CallPut;
use super::{union_times, Payoff, PayoffRef};
use crate::mc::{Path, SimulationError};

fn invalid(name: &'static str, reason: impl Into<String>) -> SimulationError {
    SimulationError::InvalidPayoff {
        name,
        reason: reason.into(),
    }
}

/// Non-empty, matching sizes, first time in the future, non-decreasing.
fn check_leg(
    name: &'static str,
    leg: &str,
    times: &[f64],
    weights: &[f64],
) -> Result<(), SimulationError> {
    if weights.is_empty() {
        return Err(invalid(name, format!("empty {} weights", leg)));
    }
    if times.len() != weights.len() {
        return Err(SimulationError::DimensionMismatch {
            what: name,
            expected: times.len(),
            got: weights.len(),
        });
    }
    if !(times[0] > 0.0) {
        return Err(invalid(name, format!("{} times must lie in the future", leg)));
    }
    if times.windows(2).any(|w| w[1] < w[0]) {
        return Err(invalid(name, format!("{} times must be ascending", leg)));
    }
    Ok(())
}

/// `Σ wₖ·P(t, Tₖ)`.
fn weighted_bonds<T: ActiveFloat>(
    path: &Path<'_, T>,
    t: f64,
    times: &[f64],
    weights: &[f64],
) -> Result<T, SimulationError> {
    times
        .iter()
        .zip(weights)
        .try_fold(T::zero(), |acc, (&maturity, &w)| {
            Ok::<T, SimulationError>(acc + lift::<T>(w) * path.zero_bond(t, maturity)?)
        })
}

fn shifted(times: &[f64], shift: f64) -> Vec<f64> {
    times.iter().map(|t| t + shift).collect()
}

// ============================================================================
// Swaptions and swap rates
// ============================================================================

/// Physically settled European swaption on arbitrary leg schedules.
///
/// `max(ω·(Σ uᵢ·P(t, Tᵢ) − K·Σ wⱼ·P(t, Tⱼ)), 0)` where `t` is the
/// observation (exercise) time, `ω = +1` for a payer (call on the rate) and
/// `-1` for a receiver.
#[derive(Clone, Debug)]
pub struct GeneralSwaption {
    obs: f64,
    float_times: Vec<f64>,
    float_weights: Vec<f64>,
    fixed_times: Vec<f64>,
    fixed_weights: Vec<f64>,
    strike: f64,
    call_put: CallPut,
}

impl GeneralSwaption {
    /// Creates the swaption.
    ///
    /// # Errors
    ///
    /// Each leg needs non-empty weights matching its times, a first time
    /// after today and non-decreasing times.
    pub fn new(
        obs: f64,
        float_times: Vec<f64>,
        float_weights: Vec<f64>,
        fixed_times: Vec<f64>,
        fixed_weights: Vec<f64>,
        strike: f64,
        call_put: CallPut,
    ) -> Result<Self, SimulationError> {
        check_leg("GeneralSwaption", "float", &float_times, &float_weights)?;
        check_leg("GeneralSwaption", "fixed", &fixed_times, &fixed_weights)?;
        Ok(Self {
            obs,
            float_times,
            float_weights,
            fixed_times,
            fixed_weights,
            strike,
            call_put,
        })
    }

    /// Strike rate.
    pub fn strike(&self) -> f64 {
        self.strike
    }
}

impl<T: ActiveFloat> Payoff<T> for GeneralSwaption {
    fn observation_time(&self) -> f64 {
        self.obs
    }

    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        let float_leg = weighted_bonds(path, self.obs, &self.float_times, &self.float_weights)?;
        let annuity = weighted_bonds(path, self.obs, &self.fixed_times, &self.fixed_weights)?;
        let swap = lift::<T>(self.call_put.sign()) * (float_leg - lift::<T>(self.strike) * annuity);
        Ok(swap.max(T::zero()))
    }

    fn at(&self, t: f64) -> PayoffRef<T> {
        Arc::new(Self {
            obs: t,
            ..self.clone()
        })
    }
}

/// Forward swap rate `Σ uᵢ·P(t, Tᵢ) / Σ wⱼ·P(t, Tⱼ)` fixed at `t`.
///
/// A rate is its own price: it is never discounted.
#[derive(Clone, Debug)]
pub struct SwapRate {
    obs: f64,
    float_times: Vec<f64>,
    float_weights: Vec<f64>,
    fixed_times: Vec<f64>,
    annuity_weights: Vec<f64>,
}

impl SwapRate {
    /// Creates the rate fixed at `obs`.
    ///
    /// # Errors
    ///
    /// Same leg checks as [`GeneralSwaption::new`].
    pub fn new(
        obs: f64,
        float_times: Vec<f64>,
        float_weights: Vec<f64>,
        fixed_times: Vec<f64>,
        annuity_weights: Vec<f64>,
    ) -> Result<Self, SimulationError> {
        check_leg("SwapRate", "float", &float_times, &float_weights)?;
        check_leg("SwapRate", "fixed", &fixed_times, &annuity_weights)?;
        Ok(Self {
            obs,
            float_times,
            float_weights,
            fixed_times,
            annuity_weights,
        })
    }

    /// Payment times of the fixed leg.
    pub fn fixed_times(&self) -> &[f64] {
        &self.fixed_times
    }
}

impl<T: ActiveFloat> Payoff<T> for SwapRate {
    fn observation_time(&self) -> f64 {
        self.obs
    }

    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        let float_leg = weighted_bonds(path, self.obs, &self.float_times, &self.float_weights)?;
        let annuity = weighted_bonds(path, self.obs, &self.fixed_times, &self.annuity_weights)?;
        Ok(float_leg / annuity)
    }

    fn discounted_value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        self.value(path)
    }

    fn at(&self, t: f64) -> PayoffRef<T> {
        let shift = t - self.obs;
        Arc::new(Self {
            obs: t,
            float_times: shifted(&self.float_times, shift),
            float_weights: self.float_weights.clone(),
            fixed_times: shifted(&self.fixed_times, shift),
            annuity_weights: self.annuity_weights.clone(),
        })
    }
}

/// Forward Libor rate `(P(t, S)/P(t, E)·D − 1)/τ` fixed at `t`.
///
/// `D` is the deterministic tenor basis between the projection and the
/// discount curve (1 for a single-curve setup). With an alias the zero
/// bonds come from that currency's curve.
#[derive(Clone, Debug)]
pub struct LiborRate {
    fixing: f64,
    start: f64,
    end: f64,
    year_fraction: f64,
    basis: f64,
    alias: Option<String>,
}

impl LiborRate {
    /// Rate for the period `[start, end]` fixed at `fixing`, with
    /// `τ = end − start` and no basis.
    ///
    /// # Errors
    ///
    /// [`SimulationError::InvalidPayoff`] unless `start < end`.
    pub fn new(fixing: f64, start: f64, end: f64) -> Result<Self, SimulationError> {
        if !(start < end) {
            return Err(invalid(
                "LiborRate",
                format!("start {} must precede end {}", start, end),
            ));
        }
        Ok(Self {
            fixing,
            start,
            end,
            year_fraction: end - start,
            basis: 1.0,
            alias: None,
        })
    }

    /// Overrides the accrual year fraction.
    ///
    /// # Errors
    ///
    /// [`SimulationError::InvalidPayoff`] for a non-positive fraction.
    pub fn with_year_fraction(mut self, year_fraction: f64) -> Result<Self, SimulationError> {
        if !(year_fraction > 0.0) {
            return Err(invalid(
                "LiborRate",
                format!("year fraction {} must be positive", year_fraction),
            ));
        }
        self.year_fraction = year_fraction;
        Ok(self)
    }

    /// Sets the tenor basis factor `D`.
    pub fn with_basis(mut self, basis: f64) -> Self {
        self.basis = basis;
        self
    }

    /// Reads zero bonds from the curve of `alias`.
    pub fn in_currency(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    fn bond<T: ActiveFloat>(&self, path: &Path<'_, T>, maturity: f64) -> Result<T, SimulationError> {
        match &self.alias {
            Some(alias) => path.zero_bond_in(self.fixing, maturity, alias),
            None => path.zero_bond(self.fixing, maturity),
        }
    }
}

impl<T: ActiveFloat> Payoff<T> for LiborRate {
    fn observation_time(&self) -> f64 {
        self.fixing
    }

    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        let growth = self.bond(path, self.start)? / self.bond(path, self.end)?;
        Ok((growth * lift(self.basis) - T::one()) / lift(self.year_fraction))
    }

    fn at(&self, t: f64) -> PayoffRef<T> {
        let shift = t - self.fixing;
        Arc::new(Self {
            fixing: t,
            start: self.start + shift,
            end: self.end + shift,
            ..self.clone()
        })
    }
}

/// `Σ wₖ·P(t, Tₖ)` over the payment times after the observation time.
#[derive(Clone, Debug)]
pub struct Annuity {
    obs: f64,
    pay_times: Vec<f64>,
    pay_weights: Vec<f64>,
}

impl Annuity {
    /// Creates the annuity observed at `obs`.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when there is not one weight per payment time.
    pub fn new(
        obs: f64,
        pay_times: Vec<f64>,
        pay_weights: Vec<f64>,
    ) -> Result<Self, SimulationError> {
        if pay_weights.len() != pay_times.len() {
            return Err(SimulationError::DimensionMismatch {
                what: "Annuity weights",
                expected: pay_times.len(),
                got: pay_weights.len(),
            });
        }
        Ok(Self {
            obs,
            pay_times,
            pay_weights,
        })
    }
}

impl<T: ActiveFloat> Payoff<T> for Annuity {
    fn observation_time(&self) -> f64 {
        self.obs
    }

    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        self.pay_times
            .iter()
            .zip(&self.pay_weights)
            .filter(|&(&t, _)| t > self.obs)
            .try_fold(T::zero(), |acc, (&t, &w)| {
                Ok::<T, SimulationError>(acc + lift::<T>(w) * path.zero_bond(self.obs, t)?)
            })
    }

    fn at(&self, t: f64) -> PayoffRef<T> {
        Arc::new(Self {
            obs: t,
            ..self.clone()
        })
    }
}

/// Prototypical swaption on the schedule `T₀ < … < T_N`.
///
/// `max(ω·(P(t, T₀) − P(t, T_N) − K·Σ τₖ·P(t, Tₖ₊₁)), 0)`. Accrual
/// weights default to the period lengths when they do not match the
/// schedule. With fewer than two times, or a time before the observation,
/// the swaption is inconsistent and worth 0.
#[derive(Clone, Debug)]
pub struct ModelSwaption {
    obs: f64,
    times: Vec<f64>,
    weights: Vec<f64>,
    strike: f64,
    call_put: CallPut,
    consistent: bool,
}

impl ModelSwaption {
    /// Creates the swaption.
    pub fn new(obs: f64, times: Vec<f64>, weights: Vec<f64>, strike: f64, call_put: CallPut) -> Self {
        let consistent = times.len() >= 2 && times.iter().all(|&t| t >= obs);
        let weights = if weights.len() + 1 == times.len() {
            weights
        } else {
            times.windows(2).map(|w| w[1] - w[0]).collect()
        };
        Self {
            obs,
            times,
            weights,
            strike,
            call_put,
            consistent,
        }
    }

    /// Whether the schedule is usable at the observation time.
    pub fn is_consistent(&self) -> bool {
        self.consistent
    }

    /// Accrual weights in use.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl<T: ActiveFloat> Payoff<T> for ModelSwaption {
    fn observation_time(&self) -> f64 {
        self.obs
    }

    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        if !self.consistent {
            return Ok(T::zero());
        }
        let n = self.times.len() - 1;
        let annuity = weighted_bonds(path, self.obs, &self.times[1..], &self.weights)?;
        let swap = path.zero_bond(self.obs, self.times[0])?
            - path.zero_bond(self.obs, self.times[n])?
            - lift::<T>(self.strike) * annuity;
        Ok((lift::<T>(self.call_put.sign()) * swap).max(T::zero()))
    }

    /// Keeps the schedule; consistency is re-checked at the new date.
    fn at(&self, t: f64) -> PayoffRef<T> {
        Arc::new(Self::new(
            t,
            self.times.clone(),
            self.weights.clone(),
            self.strike,
            self.call_put,
        ))
    }
}

// ============================================================================
// Realised correlations
// ============================================================================

/// Pearson correlation of two increment series, undiscounted.
fn increment_correlation<T: ActiveFloat>(a: &[T], b: &[T]) -> T {
    let n: T = lift(a.len() as f64);
    let mean_a = a.iter().fold(T::zero(), |acc, &x| acc + x) / n;
    let mean_b = b.iter().fold(T::zero(), |acc, &x| acc + x) / n;
    let (mut var_a, mut var_b, mut cov) = (T::zero(), T::zero(), T::zero());
    for (&x, &y) in a.iter().zip(b) {
        let (dx, dy) = (x - mean_a, y - mean_b);
        var_a = var_a + dx * dx;
        var_b = var_b + dy * dy;
        cov = cov + dx * dy;
    }
    cov / (var_a * var_b).sqrt()
}

/// Increments of `rate(tᵢ)` along `times`.
fn increments<T, F>(times: &[f64], mut rate: F) -> Result<Vec<T>, SimulationError>
where
    T: ActiveFloat,
    F: FnMut(f64) -> Result<T, SimulationError>,
{
    let levels = times
        .iter()
        .map(|&t| rate(t))
        .collect::<Result<Vec<T>, _>>()?;
    Ok(levels.windows(2).map(|w| w[1] - w[0]).collect())
}

fn check_correlation_times(name: &'static str, times: &[f64]) -> Result<(), SimulationError> {
    if times.len() < 2 {
        return Err(invalid(name, "at least two observation times required"));
    }
    Ok(())
}

/// Par rate of a spot-starting swap with annual fixed periods:
/// `(1 − P(t, t + L)) / Σ τₖ·P(t, Tₖ)`, the last period possibly short.
fn spot_swap_rate<T: ActiveFloat>(
    path: &Path<'_, T>,
    t: f64,
    term: f64,
) -> Result<T, SimulationError> {
    let end = t + term;
    let num = path.zero_bond(t, t)? - path.zero_bond(t, end)?;
    let mut den = T::zero();
    let mut ti = t;
    while ti < end {
        let tj = (ti + 1.0).min(end);
        den = den + lift::<T>(tj - ti) * path.zero_bond(t, tj)?;
        ti += 1.0;
    }
    Ok(num / den)
}

/// Realised correlation of two spot swap rates with terms `term1` and
/// `term2`, sampled at `times`.
///
/// Undiscounted.
#[derive(Clone, Debug)]
pub struct ModelCorrelation {
    obs: f64,
    times: Vec<f64>,
    term1: f64,
    term2: f64,
}

impl ModelCorrelation {
    /// Creates the estimator.
    ///
    /// # Errors
    ///
    /// [`SimulationError::InvalidPayoff`] with fewer than two times.
    pub fn new(times: Vec<f64>, term1: f64, term2: f64) -> Result<Self, SimulationError> {
        check_correlation_times("ModelCorrelation", &times)?;
        Ok(Self {
            obs: 0.0,
            times,
            term1,
            term2,
        })
    }
}

impl<T: ActiveFloat> Payoff<T> for ModelCorrelation {
    fn observation_time(&self) -> f64 {
        self.obs
    }

    fn observation_times(&self) -> Vec<f64> {
        union_times(self.times.clone(), &[])
    }

    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        let d1 = increments(&self.times, |t| spot_swap_rate(path, t, self.term1))?;
        let d2 = increments(&self.times, |t| spot_swap_rate(path, t, self.term2))?;
        Ok(increment_correlation(&d1, &d2))
    }

    fn discounted_value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        self.value(path)
    }

    fn at(&self, t: f64) -> PayoffRef<T> {
        Arc::new(Self {
            obs: t,
            ..self.clone()
        })
    }
}

/// Realised correlation of two forward rates
/// `(P(t, S)/P(t, S + L)) − 1)/L`, sampled at `times`.
///
/// Undiscounted.
#[derive(Clone, Debug)]
pub struct ForwardRateCorrelation {
    obs: f64,
    times: Vec<f64>,
    start1: f64,
    term1: f64,
    start2: f64,
    term2: f64,
}

impl ForwardRateCorrelation {
    /// Creates the estimator for the periods `[start1, start1 + term1]`
    /// and `[start2, start2 + term2]`.
    ///
    /// # Errors
    ///
    /// [`SimulationError::InvalidPayoff`] with fewer than two times.
    pub fn new(
        times: Vec<f64>,
        start1: f64,
        term1: f64,
        start2: f64,
        term2: f64,
    ) -> Result<Self, SimulationError> {
        check_correlation_times("ForwardRateCorrelation", &times)?;
        Ok(Self {
            obs: 0.0,
            times,
            start1,
            term1,
            start2,
            term2,
        })
    }

    fn fra_rate<T: ActiveFloat>(
        path: &Path<'_, T>,
        t: f64,
        start: f64,
        term: f64,
    ) -> Result<T, SimulationError> {
        let growth = path.zero_bond(t, start)? / path.zero_bond(t, start + term)?;
        Ok((growth - T::one()) / lift(term))
    }
}

impl<T: ActiveFloat> Payoff<T> for ForwardRateCorrelation {
    fn observation_time(&self) -> f64 {
        self.obs
    }

    fn observation_times(&self) -> Vec<f64> {
        union_times(self.times.clone(), &[])
    }

    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        let d1 = increments(&self.times, |t| {
            Self::fra_rate(path, t, self.start1, self.term1)
        })?;
        let d2 = increments(&self.times, |t| {
            Self::fra_rate(path, t, self.start2, self.term2)
        })?;
        Ok(increment_correlation(&d1, &d2))
    }

    fn discounted_value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        self.value(path)
    }

    fn at(&self, t: f64) -> PayoffRef<T> {
        Arc::new(Self {
            obs: t,
            ..self.clone()
        })
    }
}

// ============================================================================
// Cash flows, legs and structures
// ============================================================================

/// A payoff tagged with accrual start and payment date.
///
/// Observed (discounted) at the payment date. With the zero bond adjuster
/// applied the value is scaled by the adjusted `P(T_pay, T_pay)`.
#[derive(Clone, Debug)]
pub struct CashFlow<T: ActiveFloat> {
    x: PayoffRef<T>,
    start: f64,
    pay: f64,
    apply_zcb_adjuster: bool,
}

impl<T: ActiveFloat> CashFlow<T> {
    /// Pays `x` at `pay`, accruing from `start`.
    pub fn new(x: PayoffRef<T>, start: f64, pay: f64) -> Self {
        Self {
            x,
            start,
            pay,
            apply_zcb_adjuster: false,
        }
    }

    /// Pays `x` at its own observation time.
    pub fn at_observation(x: PayoffRef<T>) -> Self {
        let t = x.observation_time();
        Self::new(x, t, t)
    }

    /// Scales the value with the zero bond adjuster at the payment date.
    pub fn with_zcb_adjuster(mut self, apply: bool) -> Self {
        self.apply_zcb_adjuster = apply;
        self
    }

    /// Accrual start; exercise at `t` keeps flows with `start >= t`.
    pub fn start_time(&self) -> f64 {
        self.start
    }

    /// Payment date.
    pub fn pay_time(&self) -> f64 {
        self.pay
    }

    /// The wrapped payoff.
    pub fn payoff(&self) -> &PayoffRef<T> {
        &self.x
    }
}

impl<T: ActiveFloat> Payoff<T> for CashFlow<T> {
    fn observation_time(&self) -> f64 {
        self.pay
    }

    fn observation_times(&self) -> Vec<f64> {
        union_times(self.x.observation_times(), &[self.pay])
    }

    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        let x = self.x.value(path)?;
        if self.apply_zcb_adjuster {
            Ok(path.zero_bond(self.pay, self.pay)? * x)
        } else {
            Ok(x)
        }
    }

    fn at(&self, t: f64) -> PayoffRef<T> {
        Arc::new(Self {
            x: self.x.at(t),
            ..self.clone()
        })
    }
}

/// Cash flows ordered by accrual start.
#[derive(Clone, Debug)]
pub struct Leg<T: ActiveFloat> {
    cash_flows: Vec<Arc<CashFlow<T>>>,
}

impl<T: ActiveFloat> Leg<T> {
    /// Sorts `cash_flows` by start time (stable for equal starts).
    pub fn new(mut cash_flows: Vec<Arc<CashFlow<T>>>) -> Self {
        cash_flows.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self { cash_flows }
    }

    /// All flows.
    pub fn cash_flows(&self) -> &[Arc<CashFlow<T>>] {
        &self.cash_flows
    }

    /// Number of flows.
    pub fn len(&self) -> usize {
        self.cash_flows.len()
    }

    /// Whether the leg has no flows.
    pub fn is_empty(&self) -> bool {
        self.cash_flows.is_empty()
    }

    /// Flows still alive on exercise at `t` (start on or after `t`).
    pub fn remaining(&self, t: f64) -> impl Iterator<Item = &Arc<CashFlow<T>>> + '_ {
        self.cash_flows.iter().filter(move |cf| cf.start >= t)
    }

    /// The flows as payoffs, ready for a pricer.
    pub fn payoffs(&self) -> Vec<PayoffRef<T>> {
        self.cash_flows
            .iter()
            .map(|cf| cf.clone() as PayoffRef<T>)
            .collect()
    }
}

/// A set of legs (structured coupons, funding, notional exchanges).
#[derive(Clone, Debug)]
pub struct Swap<T: ActiveFloat> {
    legs: Vec<Arc<Leg<T>>>,
}

impl<T: ActiveFloat> Swap<T> {
    /// Groups `legs`.
    pub fn new(legs: Vec<Arc<Leg<T>>>) -> Self {
        Self { legs }
    }

    /// The legs.
    pub fn legs(&self) -> &[Arc<Leg<T>>] {
        &self.legs
    }

    /// All flows of all legs as payoffs.
    pub fn payoffs(&self) -> Vec<PayoffRef<T>> {
        self.legs.iter().flat_map(|leg| leg.payoffs()).collect()
    }
}

/// Callable structure for regression-based (American Monte Carlo) pricing.
///
/// At call time `tₖ` the holder receives `early_redemptions[k]` and gives
/// up the underlying flows starting on or after `tₖ`; the continuation
/// value is regressed on `regression_variables[k]`.
#[derive(Clone, Debug)]
pub struct CancellableNote<T: ActiveFloat> {
    underlyings: Vec<Arc<Leg<T>>>,
    call_times: Vec<f64>,
    early_redemptions: Vec<Arc<Leg<T>>>,
    regression_variables: Vec<Arc<Leg<T>>>,
}

impl<T: ActiveFloat> CancellableNote<T> {
    /// Creates the note.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::InvalidPayoff`] for call times that are not
    ///   strictly ascending
    /// - [`SimulationError::DimensionMismatch`] when redemptions or
    ///   regression variables do not match the call times one to one
    pub fn new(
        underlyings: Vec<Arc<Leg<T>>>,
        call_times: Vec<f64>,
        early_redemptions: Vec<Arc<Leg<T>>>,
        regression_variables: Vec<Arc<Leg<T>>>,
    ) -> Result<Self, SimulationError> {
        if call_times.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(invalid(
                "CancellableNote",
                "call times must be strictly ascending",
            ));
        }
        for (what, got) in [
            ("early redemptions", early_redemptions.len()),
            ("regression variables", regression_variables.len()),
        ] {
            if got != call_times.len() {
                return Err(SimulationError::DimensionMismatch {
                    what,
                    expected: call_times.len(),
                    got,
                });
            }
        }
        Ok(Self {
            underlyings,
            call_times,
            early_redemptions,
            regression_variables,
        })
    }

    /// Underlying legs.
    pub fn underlyings(&self) -> &[Arc<Leg<T>>] {
        &self.underlyings
    }

    /// Exercise times.
    pub fn call_times(&self) -> &[f64] {
        &self.call_times
    }

    /// Amounts paid on exercise, one leg per call time.
    pub fn early_redemptions(&self) -> &[Arc<Leg<T>>] {
        &self.early_redemptions
    }

    /// Regression variables, one leg per call time.
    pub fn regression_variables(&self) -> &[Arc<Leg<T>>] {
        &self.regression_variables
    }
}
