//! Two-factor mean-reverting commodity model (lognormal futures).
//!
//! Two Ornstein-Uhlenbeck factors drive the log of the futures curve:
//!
//! ```text
//! dY(t) = -a Y(t) dt + sigma(t) dW_Y(t),    Y(0) = 0
//! dZ(t) = -b Z(t) dt + eta(t)   dW_Z(t),    Z(0) = 0
//! d<W_Y, W_Z> = rho dt
//! ```
//!
//! `sigma` and `eta` are piecewise constant on a time grid: on
//! `(times[i-1], times[i]]` they take the i-th value, and the last value
//! extends beyond the grid.
//!
//! The futures price for settlement `T` seen at `t` is
//!
//! ```text
//! F(t, T) = F(0, T) exp( e^{-a(T-t)} Y + e^{-b(T-t)} Z - V(t, T) / 2 )
//! ```
//!
//! where `V(t, T)` is the variance of the exponent, making `F(., T)` a
//! martingale. The spot is `F(t, t)`.

use pricer_core::market_data::curves::YieldCurve;
use pricer_core::market_data::MarketDataError;
use pricer_core::math::interpolators::LinearInterpolator;
use pricer_core::traits::{lift, ActiveFloat};

use crate::models::error::ProcessError;
use crate::models::stochastic::StochasticProcess;

/// Initial futures curve `T -> F(0, T)`, linear with flat extrapolation.
#[derive(Clone, Debug)]
pub struct FuturesCurve {
    interpolator: LinearInterpolator<f64>,
}

impl FuturesCurve {
    /// Build from settlement times and positive futures prices.
    ///
    /// # Errors
    ///
    /// - `MarketData` if fewer than two knots or knots are not ascending
    /// - `InvalidParameter` for non-positive prices
    pub fn new(times: &[f64], prices: &[f64]) -> Result<Self, ProcessError> {
        if let Some(p) = prices.iter().find(|p| !(p.is_finite() && **p > 0.0)) {
            return Err(ProcessError::InvalidParameter {
                name: "futures_prices",
                reason: format!("prices must be positive, got {p}"),
            });
        }
        let interpolator = LinearInterpolator::new(times, prices).map_err(MarketDataError::from)?;
        Ok(Self { interpolator })
    }

    /// Flat futures curve at `price`.
    pub fn flat(price: f64) -> Result<Self, ProcessError> {
        Self::new(&[0.0, 1.0], &[price, price])
    }

    /// F(0, T).
    pub fn value(&self, settlement: f64) -> f64 {
        self.interpolator.interpolate_flat(settlement)
    }
}

/// Piecewise-constant volatility parameters of the two factors.
#[derive(Clone, Debug, PartialEq)]
pub struct TwoFactorParams {
    /// Right end-points of the parameter buckets, ascending.
    pub times: Vec<f64>,
    /// Volatility of Y per bucket.
    pub sigma: Vec<f64>,
    /// Volatility of Z per bucket.
    pub eta: Vec<f64>,
    /// Mean reversion of Y.
    pub a: f64,
    /// Mean reversion of Z.
    pub b: f64,
    /// Correlation between the factor drivers.
    pub rho: f64,
}

impl TwoFactorParams {
    /// Time-homogeneous parameters.
    pub fn constant(sigma: f64, eta: f64, a: f64, b: f64, rho: f64) -> Self {
        Self {
            times: vec![0.0],
            sigma: vec![sigma],
            eta: vec![eta],
            a,
            b,
            rho,
        }
    }

    fn validate(&self) -> Result<(), ProcessError> {
        if self.times.is_empty() {
            return Err(ProcessError::InvalidParameter {
                name: "times",
                reason: "at least one bucket is required".to_string(),
            });
        }
        if self.sigma.len() != self.times.len() {
            return Err(ProcessError::DimensionMismatch {
                what: "sigma",
                expected: self.times.len(),
                got: self.sigma.len(),
            });
        }
        if self.eta.len() != self.times.len() {
            return Err(ProcessError::DimensionMismatch {
                what: "eta",
                expected: self.times.len(),
                got: self.eta.len(),
            });
        }
        if self.times.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(ProcessError::InvalidParameter {
                name: "times",
                reason: "must be strictly ascending".to_string(),
            });
        }
        if self
            .sigma
            .iter()
            .chain(&self.eta)
            .any(|v| !(v.is_finite() && *v >= 0.0))
        {
            return Err(ProcessError::InvalidParameter {
                name: "volatility",
                reason: "sigma and eta must be non-negative".to_string(),
            });
        }
        if !(self.a.is_finite() && self.b.is_finite()) {
            return Err(ProcessError::InvalidParameter {
                name: "mean_reversion",
                reason: format!("must be finite, got a = {}, b = {}", self.a, self.b),
            });
        }
        if !(self.rho.abs() <= 1.0) {
            return Err(ProcessError::InvalidParameter {
                name: "rho",
                reason: format!("must lie in [-1, 1], got {}", self.rho),
            });
        }
        Ok(())
    }
}

/// Two-factor lognormal futures model for a single commodity.
#[derive(Clone, Debug)]
pub struct TwoFactorMeanReversion<C> {
    alias: String,
    futures: FuturesCurve,
    params: TwoFactorParams,
    curve: C,
}

impl<C: YieldCurve<f64>> TwoFactorMeanReversion<C> {
    /// Build the model for commodity `alias`.
    pub fn new(
        alias: impl Into<String>,
        futures: FuturesCurve,
        params: TwoFactorParams,
        curve: C,
    ) -> Result<Self, ProcessError> {
        params.validate()?;
        Ok(Self {
            alias: alias.into(),
            futures,
            params,
            curve,
        })
    }

    /// Commodity identifier.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Model parameters.
    pub fn params(&self) -> &TwoFactorParams {
        &self.params
    }

    fn bucket(&self, t: f64) -> usize {
        let times = &self.params.times;
        times
            .iter()
            .position(|&ti| ti >= t)
            .unwrap_or(times.len() - 1)
    }

    /// sigma(t)
    pub fn sigma(&self, t: f64) -> f64 {
        self.params.sigma[self.bucket(t)]
    }

    /// eta(t)
    pub fn eta(&self, t: f64) -> f64 {
        self.params.eta[self.bucket(t)]
    }

    /// `∫_t^T c(s) exp(-kappa (T - s)) ds` for piecewise-constant `c`.
    fn integrate(&self, c: impl Fn(usize) -> f64, kappa: f64, t: f64, end: f64) -> f64 {
        let antiderivative = |s: f64| {
            if kappa.abs() < 1e-12 {
                s
            } else {
                (-kappa * (end - s)).exp() / kappa
            }
        };
        let times = &self.params.times;
        let last = times.len() - 1;

        let mut total = 0.0;
        let mut lo = t;
        while lo < end {
            let (k, hi) = match times.iter().position(|&ti| ti > lo) {
                Some(i) => (i, times[i].min(end)),
                None => (last, end),
            };
            total += c(k) * (antiderivative(hi) - antiderivative(lo));
            lo = hi;
        }
        total
    }

    /// Variance of Y accumulated over `[t, end]`, seen at `end`.
    pub fn variance_y(&self, t: f64, end: f64) -> f64 {
        let p = &self.params;
        self.integrate(|k| p.sigma[k] * p.sigma[k], 2.0 * p.a, t, end)
    }

    /// Variance of Z accumulated over `[t, end]`, seen at `end`.
    pub fn variance_z(&self, t: f64, end: f64) -> f64 {
        let p = &self.params;
        self.integrate(|k| p.eta[k] * p.eta[k], 2.0 * p.b, t, end)
    }

    /// Covariance of Y and Z accumulated over `[t, end]`, including `rho`.
    pub fn covariance_yz(&self, t: f64, end: f64) -> f64 {
        let p = &self.params;
        p.rho * self.integrate(|k| p.sigma[k] * p.eta[k], p.a + p.b, t, end)
    }

    fn check_alias(&self, alias: &str) -> Result<(), ProcessError> {
        if alias == self.alias {
            Ok(())
        } else {
            Err(ProcessError::UnknownAlias(alias.to_string()))
        }
    }

    fn discount(&self, t: f64) -> Result<f64, ProcessError> {
        Ok(self.curve.discount_factor(t)?)
    }

    /// F(t, T) given the factor values.
    pub fn future_price<T: ActiveFloat>(&self, t: f64, settlement: f64, y: T, z: T) -> T {
        let p = &self.params;
        let tau = settlement - t;
        let ea = (-p.a * tau).exp();
        let eb = (-p.b * tau).exp();
        let variance = ea * ea * self.variance_y(0.0, t)
            + eb * eb * self.variance_z(0.0, t)
            + 2.0 * ea * eb * self.covariance_yz(0.0, t);
        let exponent = lift::<T>(ea) * y + lift::<T>(eb) * z - lift(0.5 * variance);
        lift::<T>(self.futures.value(settlement)) * exponent.exp()
    }
}

impl<T, C> StochasticProcess<T> for TwoFactorMeanReversion<C>
where
    T: ActiveFloat,
    C: YieldCurve<f64>,
{
    fn model_name(&self) -> &'static str {
        "TwoFactorMeanReversion"
    }

    fn size(&self) -> usize {
        2
    }

    fn factors(&self) -> usize {
        2
    }

    fn initial_values(&self) -> Vec<T> {
        vec![T::zero(), T::zero()]
    }

    fn drift(&self, _t: f64, x: &[T]) -> Vec<T> {
        let p = &self.params;
        vec![-lift::<T>(p.a) * x[0], -lift::<T>(p.b) * x[1]]
    }

    fn diffusion(&self, t: f64, _x: &[T]) -> Vec<T> {
        let rho = self.params.rho;
        let eta = self.eta(t);
        vec![
            lift(self.sigma(t)),
            T::zero(),
            lift(eta * rho),
            lift(eta * (1.0 - rho * rho).sqrt()),
        ]
    }

    fn evolve(&self, t0: f64, x0: &[T], dt: f64, dw: &[f64], x1: &mut [T]) {
        let p = &self.params;
        let end = t0 + dt;
        let sd_y = self.variance_y(t0, end).max(0.0).sqrt();
        let sd_z = self.variance_z(t0, end).max(0.0).sqrt();
        let dw_z = p.rho * dw[0] + (1.0 - p.rho * p.rho).sqrt() * dw[1];

        x1[0] = x0[0] * lift((-p.a * dt).exp()) + lift(sd_y * dw[0]);
        x1[1] = x0[1] * lift((-p.b * dt).exp()) + lift(sd_z * dw_z);
    }

    fn numeraire(&self, t: f64, _x: &[T]) -> Result<T, ProcessError> {
        Ok(lift(1.0 / self.discount(t)?))
    }

    fn zero_bond(&self, t: f64, maturity: f64, _x: &[T]) -> Result<T, ProcessError> {
        Ok(lift(self.discount(maturity)? / self.discount(t)?))
    }

    // Single-curve model: only the domestic curve exists, through `zero_bond`.
    fn zero_bond_in(
        &self,
        _t: f64,
        _maturity: f64,
        _x: &[T],
        alias: &str,
    ) -> Result<T, ProcessError> {
        Err(ProcessError::UnknownAlias(alias.to_string()))
    }

    fn asset(&self, t: f64, x: &[T], alias: &str) -> Result<T, ProcessError> {
        self.check_alias(alias)?;
        Ok(self.future_price(t, t, x[0], x[1]))
    }

    fn asset_volatility(&self, t: f64, _x: &[T], alias: &str) -> Result<T, ProcessError> {
        self.check_alias(alias)?;
        let (sigma, eta, rho) = (self.sigma(t), self.eta(t), self.params.rho);
        Ok(lift(
            (sigma * sigma + eta * eta + 2.0 * rho * sigma * eta)
                .max(0.0)
                .sqrt(),
        ))
    }

    fn forward_asset(
        &self,
        t: f64,
        settlement: f64,
        x: &[T],
        alias: &str,
    ) -> Result<T, ProcessError> {
        self.future_asset(t, settlement, x, alias)
    }

    fn future_asset(
        &self,
        t: f64,
        settlement: f64,
        x: &[T],
        alias: &str,
    ) -> Result<T, ProcessError> {
        self.check_alias(alias)?;
        Ok(self.future_price(t, settlement, x[0], x[1]))
    }
}
