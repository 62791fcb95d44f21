//! Leaf nodes and payment wrappers.

use std::sync::Arc;

use pricer_core::traits::{lift, ActiveFloat};

use super::{union_times, Payoff, PayoffRef};
use crate::mc::{BarrierSide, Path, SimulationError};

/// Option direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CallPut {
    /// Pays `max(S - K, 0)`.
    Call,
    /// Pays `max(K - S, 0)`.
    Put,
}

impl CallPut {
    /// `+1` for calls, `-1` for puts.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Self::Call => 1.0,
            Self::Put => -1.0,
        }
    }
}

// ============================================================================
// Deterministic amounts and wrappers
// ============================================================================

/// A deterministic amount known today.
///
/// Always observed at 0, so its discounted value is the amount itself.
#[derive(Clone, Debug)]
pub struct FixedAmount<T> {
    amount: T,
}

impl<T: ActiveFloat> FixedAmount<T> {
    /// Creates the amount.
    pub fn new(amount: T) -> Self {
        Self { amount }
    }

    /// The amount.
    pub fn amount(&self) -> T {
        self.amount
    }
}

impl<T: ActiveFloat> Payoff<T> for FixedAmount<T> {
    fn observation_time(&self) -> f64 {
        0.0
    }

    fn value(&self, _path: &Path<'_, T>) -> Result<T, SimulationError> {
        Ok(self.amount)
    }

    fn at(&self, _t: f64) -> PayoffRef<T> {
        Arc::new(self.clone())
    }
}

/// Another payoff re-dated to a new observation time.
#[derive(Clone, Debug)]
pub struct Redated<T: ActiveFloat> {
    x: PayoffRef<T>,
    obs: f64,
}

impl<T: ActiveFloat> Redated<T> {
    /// Re-anchors `x` at `obs`.
    pub fn new(x: &PayoffRef<T>, obs: f64) -> Self {
        Self { x: x.at(obs), obs }
    }
}

impl<T: ActiveFloat> Payoff<T> for Redated<T> {
    fn observation_time(&self) -> f64 {
        self.obs
    }

    fn observation_times(&self) -> Vec<f64> {
        self.x.observation_times()
    }

    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        self.x.value(path)
    }

    fn at(&self, t: f64) -> PayoffRef<T> {
        Arc::new(Self::new(&self.x, t))
    }
}

/// Pays the value of `x` at `pay_time`.
///
/// The payment date is the discounting date, also after re-anchoring.
#[derive(Clone, Debug)]
pub struct Pay<T: ActiveFloat> {
    x: PayoffRef<T>,
    pay_time: f64,
}

impl<T: ActiveFloat> Pay<T> {
    /// Pays `x` at `pay_time`.
    pub fn new(x: PayoffRef<T>, pay_time: f64) -> Self {
        Self { x, pay_time }
    }
}

impl<T: ActiveFloat> Payoff<T> for Pay<T> {
    fn observation_time(&self) -> f64 {
        self.pay_time
    }

    fn observation_times(&self) -> Vec<f64> {
        union_times(self.x.observation_times(), &[self.pay_time])
    }

    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        self.x.value(path)
    }

    fn at(&self, t: f64) -> PayoffRef<T> {
        Arc::new(Self::new(self.x.at(t), self.pay_time))
    }
}

// ============================================================================
// Model reads
// ============================================================================

/// Zero bond `P(obs, pay_time)` on the domestic curve.
#[derive(Clone, Debug)]
pub struct Cash {
    obs: f64,
    pay_time: f64,
}

impl Cash {
    /// Unit cash paid at `pay_time`, observed at `obs`.
    pub fn new(obs: f64, pay_time: f64) -> Self {
        Self { obs, pay_time }
    }
}

impl<T: ActiveFloat> Payoff<T> for Cash {
    fn observation_time(&self) -> f64 {
        self.obs
    }

    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        path.zero_bond(self.obs, self.pay_time)
    }

    fn at(&self, t: f64) -> PayoffRef<T> {
        Arc::new(Self::new(t, self.pay_time))
    }
}

/// Zero bond `P(obs, maturity)`, optionally on the curve of an alias.
#[derive(Clone, Debug)]
pub struct ZeroBond {
    obs: f64,
    maturity: f64,
    alias: Option<String>,
}

impl ZeroBond {
    /// Domestic zero bond.
    pub fn new(obs: f64, maturity: f64) -> Self {
        Self {
            obs,
            maturity,
            alias: None,
        }
    }

    /// Zero bond on the curve identified by `alias`.
    pub fn in_currency(obs: f64, maturity: f64, alias: impl Into<String>) -> Self {
        Self {
            obs,
            maturity,
            alias: Some(alias.into()),
        }
    }
}

impl<T: ActiveFloat> Payoff<T> for ZeroBond {
    fn observation_time(&self) -> f64 {
        self.obs
    }

    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        match &self.alias {
            Some(alias) => path.zero_bond_in(self.obs, self.maturity, alias),
            None => path.zero_bond(self.obs, self.maturity),
        }
    }

    fn at(&self, t: f64) -> PayoffRef<T> {
        Arc::new(Self {
            obs: t,
            maturity: self.maturity,
            alias: self.alias.clone(),
        })
    }
}

/// One unit of a modelled asset.
///
/// Observations before today are answered from the fixing history when it
/// reaches back far enough; everything else is read from the path.
#[derive(Clone, Debug)]
pub struct Asset {
    obs: f64,
    alias: String,
    history: Vec<(f64, f64)>,
}

impl Asset {
    /// Asset `alias` observed at `obs`.
    pub fn new(obs: f64, alias: impl Into<String>) -> Self {
        Self {
            obs,
            alias: alias.into(),
            history: Vec::new(),
        }
    }

    /// Adds historical `(time, value)` fixings.
    ///
    /// # Errors
    ///
    /// [`SimulationError::InvalidPayoff`] if two fixings share a time.
    pub fn with_fixings(mut self, fixings: &[(f64, f64)]) -> Result<Self, SimulationError> {
        self.history.extend_from_slice(fixings);
        self.history.sort_by(|a, b| a.0.total_cmp(&b.0));
        if let Some(w) = self.history.windows(2).find(|w| w[0].0 >= w[1].0) {
            return Err(SimulationError::InvalidPayoff {
                name: "Asset",
                reason: format!("duplicate fixing at t = {}", w[1].0),
            });
        }
        Ok(self)
    }

    /// Sorted fixing history.
    pub fn history(&self) -> &[(f64, f64)] {
        &self.history
    }

    /// Fixed value for a past observation, if the history covers it.
    pub fn fixed_value(&self) -> Option<f64> {
        if self.obs >= 0.0 {
            return None;
        }
        self.history
            .iter()
            .take_while(|(t, _)| *t <= self.obs)
            .last()
            .map(|&(_, v)| v)
    }
}

impl<T: ActiveFloat> Payoff<T> for Asset {
    fn observation_time(&self) -> f64 {
        self.obs
    }

    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        match self.fixed_value() {
            Some(v) => Ok(lift(v)),
            None => path.asset(self.obs, &self.alias),
        }
    }

    fn at(&self, t: f64) -> PayoffRef<T> {
        Arc::new(Self {
            obs: t,
            alias: self.alias.clone(),
            history: self.history.clone(),
        })
    }
}

/// Probability that an asset stays strictly between two barriers.
///
/// Observed at the end of the monitoring window.
#[derive(Clone, Debug)]
pub struct AssetBarrierNoHit {
    t_start: f64,
    t_end: f64,
    down: f64,
    up: f64,
    side: BarrierSide,
    alias: String,
}

impl AssetBarrierNoHit {
    /// Monitors `alias` on `[t_start, t_end]`.
    ///
    /// # Errors
    ///
    /// [`SimulationError::InvalidPayoff`] unless `t_start < t_end` and
    /// `down < up`.
    pub fn new(
        t_start: f64,
        t_end: f64,
        down: f64,
        up: f64,
        side: BarrierSide,
        alias: impl Into<String>,
    ) -> Result<Self, SimulationError> {
        if !(t_start < t_end) {
            return Err(SimulationError::InvalidPayoff {
                name: "AssetBarrierNoHit",
                reason: format!("t_start {} must precede t_end {}", t_start, t_end),
            });
        }
        if !(down < up) {
            return Err(SimulationError::InvalidPayoff {
                name: "AssetBarrierNoHit",
                reason: format!("down barrier {} must be below up barrier {}", down, up),
            });
        }
        Ok(Self {
            t_start,
            t_end,
            down,
            up,
            side,
            alias: alias.into(),
        })
    }

    /// Monitoring window.
    pub fn window(&self) -> (f64, f64) {
        (self.t_start, self.t_end)
    }
}

impl<T: ActiveFloat> Payoff<T> for AssetBarrierNoHit {
    fn observation_time(&self) -> f64 {
        self.t_end
    }

    fn observation_times(&self) -> Vec<f64> {
        vec![self.t_start, self.t_end]
    }

    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        path.asset_barrier_no_hit(
            self.t_start,
            self.t_end,
            self.down,
            self.up,
            self.side,
            &self.alias,
        )
    }

    /// Shifts the window so that it ends at `t`.
    fn at(&self, t: f64) -> PayoffRef<T> {
        let shift = t - self.t_end;
        Arc::new(Self {
            t_start: self.t_start + shift,
            t_end: t,
            ..self.clone()
        })
    }
}

/// European call or put on an asset, settled at observation.
#[derive(Clone, Debug)]
pub struct VanillaOption {
    obs: f64,
    alias: String,
    strike: f64,
    call_put: CallPut,
}

impl VanillaOption {
    /// Option on `alias` expiring at `obs`.
    pub fn new(obs: f64, alias: impl Into<String>, strike: f64, call_put: CallPut) -> Self {
        Self {
            obs,
            alias: alias.into(),
            strike,
            call_put,
        }
    }
}

impl<T: ActiveFloat> Payoff<T> for VanillaOption {
    fn observation_time(&self) -> f64 {
        self.obs
    }

    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        let s = path.asset(self.obs, &self.alias)?;
        let v = lift::<T>(self.call_put.sign()) * (s - lift(self.strike));
        Ok(v.max(T::zero()))
    }

    fn at(&self, t: f64) -> PayoffRef<T> {
        Arc::new(Self {
            obs: t,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payoff::testing::deterministic_simulation;
    use approx::assert_relative_eq;

    const RATE: f64 = 0.05;

    #[test]
    fn test_fixed_amount_is_undiscounted() {
        let sim = deterministic_simulation(RATE, 0.0);
        let path = sim.path(0).unwrap();
        let x = FixedAmount::new(7.5);
        assert_eq!(x.value(&path).unwrap(), 7.5);
        assert_eq!(x.discounted_value(&path).unwrap(), 7.5);
        assert_eq!(Payoff::<f64>::at(&x, 3.0).observation_time(), 0.0);
    }

    #[test]
    fn test_pay_discounts_at_pay_date() {
        let sim = deterministic_simulation(RATE, 0.0);
        let path = sim.path(0).unwrap();
        let pay: Pay<f64> = Pay::new(Arc::new(FixedAmount::new(1.0)), 2.0);

        assert_eq!(pay.observation_time(), 2.0);
        assert_eq!(pay.observation_times(), vec![0.0, 2.0]);
        assert_relative_eq!(
            pay.discounted_value(&path).unwrap(),
            (-RATE * 2.0).exp(),
            epsilon = 1e-14
        );

        let moved = pay.at(1.0);
        assert_eq!(moved.observation_time(), 2.0);
    }

    #[test]
    fn test_redated_reanchors_child() {
        let vanilla: PayoffRef<f64> = Arc::new(VanillaOption::new(2.0, "S", 100.0, CallPut::Call));
        let redated = Redated::new(&vanilla, 1.0);
        assert_eq!(redated.observation_time(), 1.0);
        assert_eq!(redated.observation_times(), vec![1.0]);
        assert_eq!(redated.at(3.0).observation_time(), 3.0);
    }

    #[test]
    fn test_cash_and_zero_bond() {
        let sim = deterministic_simulation(RATE, 0.0);
        let path = sim.path(1).unwrap();

        let cash = Cash::new(1.0, 3.0);
        assert_relative_eq!(
            Payoff::<f64>::value(&cash, &path).unwrap(),
            (-RATE * 2.0).exp(),
            epsilon = 1e-14
        );
        // P(1,3) / N(1) = exp(-3r)
        assert_relative_eq!(
            Payoff::<f64>::discounted_value(&cash, &path).unwrap(),
            (-RATE * 3.0).exp(),
            epsilon = 1e-14
        );

        let foreign = ZeroBond::in_currency(1.0, 3.0, "EUR");
        assert_relative_eq!(
            Payoff::<f64>::value(&foreign, &path).unwrap(),
            (-2.0 * RATE * 2.0).exp(),
            epsilon = 1e-14
        );

        let moved = Payoff::<f64>::at(&ZeroBond::new(1.0, 3.0), 2.0);
        assert_relative_eq!(
            moved.value(&path).unwrap(),
            (-RATE).exp(),
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_asset_reads_path_or_history() {
        let sim = deterministic_simulation(RATE, 0.1);
        let path = sim.path(0).unwrap();

        let live = Asset::new(2.0, "S");
        assert_relative_eq!(
            Payoff::<f64>::value(&live, &path).unwrap(),
            100.0 * (0.2_f64).exp(),
            epsilon = 1e-12
        );

        let past = Asset::new(-0.5, "S")
            .with_fixings(&[(-0.25, 97.0), (-1.0, 95.0), (-0.6, 96.0)])
            .unwrap();
        assert_eq!(past.history()[0], (-1.0, 95.0));
        assert_eq!(past.fixed_value(), Some(96.0));
        assert_eq!(Payoff::<f64>::value(&past, &path).unwrap(), 96.0);

        // history starting after the observation: no fixing
        let uncovered = Asset::new(-2.0, "S").with_fixings(&[(-1.0, 95.0)]).unwrap();
        assert_eq!(uncovered.fixed_value(), None);
    }

    #[test]
    fn test_asset_rejects_duplicate_fixings() {
        let result = Asset::new(-1.0, "S").with_fixings(&[(-1.0, 95.0), (-1.0, 96.0)]);
        assert!(matches!(
            result,
            Err(SimulationError::InvalidPayoff { name: "Asset", .. })
        ));
    }

    #[test]
    fn test_vanilla_option_intrinsic() {
        let sim = deterministic_simulation(RATE, 0.1);
        let path = sim.path(0).unwrap();
        let s = 100.0 * (0.1_f64).exp();

        let call = VanillaOption::new(1.0, "S", 100.0, CallPut::Call);
        let put = VanillaOption::new(1.0, "S", 100.0, CallPut::Put);
        assert_relative_eq!(
            Payoff::<f64>::value(&call, &path).unwrap(),
            s - 100.0,
            epsilon = 1e-12
        );
        assert_eq!(Payoff::<f64>::value(&put, &path).unwrap(), 0.0);
        assert_eq!(CallPut::Put.sign(), -1.0);
    }

    #[test]
    fn test_barrier_validation_and_shift() {
        assert!(AssetBarrierNoHit::new(1.0, 1.0, 90.0, 110.0, BarrierSide::Both, "S").is_err());
        assert!(AssetBarrierNoHit::new(0.0, 1.0, 110.0, 90.0, BarrierSide::Both, "S").is_err());

        let barrier = AssetBarrierNoHit::new(0.5, 1.5, 90.0, 110.0, BarrierSide::Both, "S").unwrap();
        assert_eq!(Payoff::<f64>::observation_times(&barrier), vec![0.5, 1.5]);
        let moved = Payoff::<f64>::at(&barrier, 3.0);
        assert_eq!(moved.observation_times(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_barrier_zero_volatility_survives() {
        let sim = deterministic_simulation(RATE, 0.0);
        let path = sim.path(0).unwrap();
        let barrier = AssetBarrierNoHit::new(0.5, 2.0, 90.0, 110.0, BarrierSide::Both, "S").unwrap();
        assert_eq!(Payoff::<f64>::value(&barrier, &path).unwrap(), 1.0);
    }
}
