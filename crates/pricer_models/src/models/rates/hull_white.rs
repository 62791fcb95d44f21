//! Hull-White one-factor model in the bank-account measure.
//!
//! The short rate is split as `r(t) = f(0, t) + x(t)` with
//!
//! ```text
//! dx(t) = [y(t) - a x(t)] dt + sigma dW(t),    x(0) = 0
//! ds(t) = x(t) dt,                             s(0) = 0
//! y(t)  = sigma^2 / (2a) (1 - exp(-2at))
//! ```
//!
//! The state is `[x, s]`. `s` is the integrated stochastic part of the short
//! rate, so the bank account is `B(t) = exp(s(t)) / P(0, t)`.
//!
//! [`StochasticProcess::evolve`] is overridden with the exact joint Gaussian
//! transition of `(x, s)`; only the Euler fallback reads `drift` and
//! `diffusion`.
//!
//! ## Usage
//!
//! ```
//! use pricer_core::market_data::curves::FlatCurve;
//! use pricer_models::models::rates::HullWhiteProcess;
//! use pricer_models::models::StochasticProcess;
//!
//! let hw = HullWhiteProcess::new(0.1, 0.01, FlatCurve::new(0.03)).unwrap();
//! let x0 = StochasticProcess::<f64>::initial_values(&hw);
//! let p = hw.zero_bond(0.0, 5.0, &x0[..]).unwrap();
//! assert!((p - (-0.15_f64).exp()).abs() < 1e-12);
//! ```

use pricer_core::market_data::curves::YieldCurve;
use pricer_core::traits::{lift, ActiveFloat};

use crate::models::error::ProcessError;
use crate::models::stochastic::StochasticProcess;

/// Hull-White one-factor process on a deterministic initial curve.
#[derive(Clone, Debug)]
pub struct HullWhiteProcess<C> {
    mean_reversion: f64,
    volatility: f64,
    curve: C,
}

impl<C: YieldCurve<f64>> HullWhiteProcess<C> {
    /// Create a process with mean reversion `a > 0` and volatility `sigma >= 0`.
    ///
    /// # Errors
    ///
    /// `ProcessError::InvalidParameter` for non-finite or out-of-range inputs.
    pub fn new(mean_reversion: f64, volatility: f64, curve: C) -> Result<Self, ProcessError> {
        if !(mean_reversion.is_finite() && mean_reversion > 0.0) {
            return Err(ProcessError::InvalidParameter {
                name: "mean_reversion",
                reason: format!("must be positive, got {mean_reversion}"),
            });
        }
        if !(volatility.is_finite() && volatility >= 0.0) {
            return Err(ProcessError::InvalidParameter {
                name: "volatility",
                reason: format!("must be non-negative, got {volatility}"),
            });
        }
        Ok(Self {
            mean_reversion,
            volatility,
            curve,
        })
    }

    /// Mean reversion speed `a`.
    pub fn mean_reversion(&self) -> f64 {
        self.mean_reversion
    }

    /// Short rate volatility `sigma`.
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Initial discount curve.
    pub fn curve(&self) -> &C {
        &self.curve
    }

    /// Variance of `x(t)`: `sigma^2 / (2a) (1 - exp(-2at))`.
    pub fn y(&self, t: f64) -> f64 {
        let a = self.mean_reversion;
        self.volatility * self.volatility / (2.0 * a) * (1.0 - (-2.0 * a * t).exp())
    }

    /// Bond sensitivity `G(tau) = (1 - exp(-a tau)) / a`.
    pub fn g(&self, tau: f64) -> f64 {
        let a = self.mean_reversion;
        (1.0 - (-a * tau).exp()) / a
    }

    fn discount(&self, t: f64) -> Result<f64, ProcessError> {
        Ok(self.curve.discount_factor(t)?)
    }

    /// Moments of the transition over `[t, t + dt]` that do not depend on the state.
    fn transition(&self, t: f64, dt: f64) -> Transition {
        let a = self.mean_reversion;
        let sigma2 = self.volatility * self.volatility;
        let end = t + dt;
        let decay = (-a * dt).exp();
        let g_dt = self.g(dt);
        let one_minus_decay2 = 1.0 - (-2.0 * a * dt).exp();

        let mean_x = sigma2 / (2.0 * a * a)
            * ((1.0 - decay) - (-a * end).exp() * ((-a * t).exp() - (-a * end).exp()));
        let var_x = sigma2 * one_minus_decay2 / (2.0 * a);
        let var_i = sigma2 / (a * a) * (dt - 2.0 * g_dt + one_minus_decay2 / (2.0 * a));
        let cov = sigma2 / (2.0 * a * a) * (1.0 - decay) * (1.0 - decay);

        Transition {
            decay,
            g_dt,
            mean_x,
            var_x,
            var_i,
            cov,
        }
    }
}

struct Transition {
    decay: f64,
    g_dt: f64,
    mean_x: f64,
    var_x: f64,
    var_i: f64,
    cov: f64,
}

impl<T, C> StochasticProcess<T> for HullWhiteProcess<C>
where
    T: ActiveFloat,
    C: YieldCurve<f64>,
{
    fn model_name(&self) -> &'static str {
        "HullWhite"
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

    fn drift(&self, t: f64, x: &[T]) -> Vec<T> {
        let a: T = lift(self.mean_reversion);
        vec![lift::<T>(self.y(t)) - a * x[0], x[0]]
    }

    fn diffusion(&self, _t: f64, _x: &[T]) -> Vec<T> {
        vec![lift(self.volatility), T::zero(), T::zero(), T::zero()]
    }

    fn evolve(&self, t0: f64, x0: &[T], dt: f64, dw: &[f64], x1: &mut [T]) {
        let m = self.transition(t0, dt);
        let g: T = lift(m.g_dt);
        let half: T = lift(0.5);

        let mu_i = g * x0[0] + half * g * g * lift(self.y(t0)) + lift(m.var_i / 2.0);
        let sd_x = m.var_x.sqrt();

        // Regress the integral's noise on the short-rate noise
        let (load_x, load_perp) = if m.var_x > 0.0 {
            (
                m.cov / sd_x,
                (m.var_i - m.cov * m.cov / m.var_x).max(0.0).sqrt(),
            )
        } else {
            (0.0, m.var_i.max(0.0).sqrt())
        };

        x1[0] = x0[0] * lift(m.decay) + lift(m.mean_x + sd_x * dw[0]);
        x1[1] = x0[1] + mu_i + lift(load_x * dw[0] + load_perp * dw[1]);
    }

    fn numeraire(&self, t: f64, x: &[T]) -> Result<T, ProcessError> {
        Ok(x[1].exp() / lift(self.discount(t)?))
    }

    fn zero_bond(&self, t: f64, maturity: f64, x: &[T]) -> Result<T, ProcessError> {
        let ratio = self.discount(maturity)? / self.discount(t)?;
        let g: T = lift(self.g(maturity - t));
        let half: T = lift(0.5);
        Ok(lift::<T>(ratio) * (-g * x[0] - half * g * g * lift(self.y(t))).exp())
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pricer_core::market_data::curves::FlatCurve;

    fn process() -> HullWhiteProcess<FlatCurve<f64>> {
        HullWhiteProcess::new(0.1, 0.01, FlatCurve::new(0.03)).unwrap()
    }

    // ================================================================
    // Construction
    // ================================================================

    #[test]
    fn test_new_rejects_bad_parameters() {
        assert!(matches!(
            HullWhiteProcess::new(0.0, 0.01, FlatCurve::new(0.03)),
            Err(ProcessError::InvalidParameter {
                name: "mean_reversion",
                ..
            })
        ));
        assert!(matches!(
            HullWhiteProcess::new(0.1, -0.01, FlatCurve::new(0.03)),
            Err(ProcessError::InvalidParameter {
                name: "volatility",
                ..
            })
        ));
        assert!(HullWhiteProcess::new(0.1, 0.0, FlatCurve::new(0.03)).is_ok());
    }

    #[test]
    fn test_dimensions() {
        let hw = process();
        assert_eq!(StochasticProcess::<f64>::size(&hw), 2);
        assert_eq!(StochasticProcess::<f64>::factors(&hw), 2);
        assert_eq!(StochasticProcess::<f64>::initial_values(&hw), vec![0.0, 0.0]);
    }

    // ================================================================
    // Closed forms
    // ================================================================

    #[test]
    fn test_zero_bond_reprices_curve_at_zero_state() {
        let hw = process();
        let p = hw.zero_bond(0.0, 7.0, &[0.0_f64, 0.0]).unwrap();
        assert_relative_eq!(p, (-0.21_f64).exp(), epsilon = 1e-14);
    }

    #[test]
    fn test_zero_bond_decreases_in_state() {
        let hw = process();
        let low = hw.zero_bond(1.0, 5.0, &[-0.01_f64, 0.0]).unwrap();
        let high = hw.zero_bond(1.0, 5.0, &[0.01_f64, 0.0]).unwrap();
        assert!(low > high);
    }

    #[test]
    fn test_numeraire_at_origin_is_one() {
        let hw = process();
        assert_relative_eq!(hw.numeraire(0.0, &[0.0_f64, 0.0]).unwrap(), 1.0);
    }

    #[test]
    fn test_numeraire_uses_integrated_state() {
        let hw = process();
        let n = hw.numeraire(2.0, &[0.0_f64, 0.05]).unwrap();
        assert_relative_eq!(n, (0.05_f64 + 0.06).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_asset_is_unsupported() {
        let hw = process();
        assert!(matches!(
            hw.asset(1.0, &[0.0_f64, 0.0], "SPX"),
            Err(ProcessError::Unsupported {
                operation: "asset",
                ..
            })
        ));
    }

    #[test]
    fn test_negative_time_surfaces_curve_error() {
        let hw = process();
        assert!(matches!(
            hw.zero_bond(-1.0, 1.0, &[0.0_f64, 0.0]),
            Err(ProcessError::MarketData(_))
        ));
    }

    // ================================================================
    // Exact transition
    // ================================================================

    #[test]
    fn test_zero_volatility_is_deterministic() {
        let hw = HullWhiteProcess::new(0.1, 0.0, FlatCurve::new(0.03)).unwrap();
        let mut x1 = [0.0_f64; 2];
        hw.evolve(0.0, &[0.0, 0.0], 1.0, &[2.0, -1.0], &mut x1);
        assert_eq!(x1, [0.0, 0.0]);
    }

    #[test]
    fn test_zero_step_is_identity() {
        let hw = process();
        let mut x1 = [0.0_f64; 2];
        hw.evolve(1.0, &[0.02, 0.1], 0.0, &[1.0, 1.0], &mut x1);
        assert_relative_eq!(x1[0], 0.02, epsilon = 1e-15);
        assert_relative_eq!(x1[1], 0.1, epsilon = 1e-15);
    }

    #[test]
    fn test_transition_reproduces_variance() {
        let hw = process();
        let m = hw.transition(0.0, 2.0);
        // Var x(t) from 0 equals y(t)
        assert_relative_eq!(m.var_x, hw.y(2.0), epsilon = 1e-16);
        assert!(m.var_i > 0.0);
        assert!(m.cov * m.cov <= m.var_x * m.var_i);
    }

    #[test]
    fn test_conditional_discount_matches_zero_bond() {
        // E[exp(-(s(T) - s(t))) | x(t)] from the Gaussian transition must equal
        // P(t, T; x) * P(0, t) / P(0, T)
        let hw = process();
        let (t, big_t, x) = (1.5, 4.0, 0.013);
        let mut x1 = [0.0_f64; 2];
        hw.evolve(t, &[x, 0.0], big_t - t, &[0.0, 0.0], &mut x1);
        let var_i = hw.transition(t, big_t - t).var_i;
        let expectation = (-x1[1] + var_i / 2.0).exp();

        let bond = hw.zero_bond(t, big_t, &[x, 0.0]).unwrap();
        let ratio = (-0.03_f64 * t).exp() / (-0.03_f64 * big_t).exp();
        assert_relative_eq!(expectation, bond * ratio, epsilon = 1e-13);
    }

    #[test]
    fn test_drift_and_diffusion_shape() {
        let hw = process();
        let a = StochasticProcess::<f64>::drift(&hw, 0.0, &[0.01, 0.0]);
        assert_relative_eq!(a[0], -0.001, epsilon = 1e-15);
        assert_relative_eq!(a[1], 0.01);
        let b = StochasticProcess::<f64>::diffusion(&hw, 0.0, &[0.0, 0.0]);
        assert_eq!(b, vec![0.01, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_zero_bond_in_rejects_foreign_curve() {
        let hw = process();
        assert!(matches!(
            hw.zero_bond_in(0.0, 1.0, &[0.0_f64, 0.0], "EUR"),
            Err(ProcessError::UnknownAlias(alias)) if alias == "EUR"
        ));
    }
}
