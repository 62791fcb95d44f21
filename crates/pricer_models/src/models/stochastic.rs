//! StochasticProcess trait: the contract between models and the simulator.
//!
//! A process describes an Itô diffusion
//!
//! ```text
//! dX(t) = a(t, X) dt + b(t, X) dW(t)
//! ```
//!
//! on a state vector of fixed length [`StochasticProcess::size`], driven by
//! [`StochasticProcess::factors`] independent Brownian motions. On top of the
//! dynamics it exposes the model's closed-form valuation formulas (numeraire,
//! zero-coupon bonds, assets) which paths and adjusters read.
//!
//! ## Numeric roles
//!
//! - times are `f64`
//! - Brownian increments are passive `f64` standard normals
//! - states and outputs use the active type `T`
//!
//! ## Example
//!
//! ```
//! use pricer_models::models::{ProcessError, StochasticProcess};
//!
//! /// dX = sigma dW, X(0) = x0
//! struct Driftless {
//!     x0: f64,
//!     sigma: f64,
//! }
//!
//! impl StochasticProcess<f64> for Driftless {
//!     fn model_name(&self) -> &'static str { "Driftless" }
//!     fn size(&self) -> usize { 1 }
//!     fn factors(&self) -> usize { 1 }
//!     fn initial_values(&self) -> Vec<f64> { vec![self.x0] }
//!     fn drift(&self, _t: f64, _x: &[f64]) -> Vec<f64> { vec![0.0] }
//!     fn diffusion(&self, _t: f64, _x: &[f64]) -> Vec<f64> { vec![self.sigma] }
//! }
//!
//! let p = Driftless { x0: 1.0, sigma: 0.2 };
//! let mut x1 = [0.0];
//! p.evolve(0.0, &[1.0], 0.25, &[1.0], &mut x1);
//! assert!((x1[0] - 1.1).abs() < 1e-12);
//! assert!(matches!(p.numeraire(1.0, &x1), Err(ProcessError::Unsupported { .. })));
//! ```

use pricer_core::traits::{lift, ActiveFloat};

use super::error::ProcessError;

/// Polymorphic contract every diffusion model satisfies.
///
/// Implementations are shared read-only across simulation workers; any
/// parameter update must happen between simulation passes.
pub trait StochasticProcess<T: ActiveFloat>: Send + Sync {
    /// Model name for logging and error messages.
    fn model_name(&self) -> &'static str;

    /// State vector dimension (fixed, at least 1).
    fn size(&self) -> usize;

    /// Number of independent Brownian drivers (at most `size()`).
    fn factors(&self) -> usize;

    /// State at time 0.
    fn initial_values(&self) -> Vec<T>;

    /// Drift vector a(t, X) of length `size()`.
    fn drift(&self, t: f64, x: &[T]) -> Vec<T>;

    /// Diffusion matrix b(t, X), row-major `size() × factors()`.
    fn diffusion(&self, t: f64, x: &[T]) -> Vec<T>;

    /// Advance `x0` at `t0` over `dt` given standard normal drivers `dw`.
    ///
    /// `dw` has length `factors()` and `x1` length `size()`. The default is an
    /// Euler-Maruyama step; models with a known conditional law override it.
    fn evolve(&self, t0: f64, x0: &[T], dt: f64, dw: &[f64], x1: &mut [T]) {
        euler_step(self, t0, x0, dt, dw, x1);
    }

    /// Clamp `x` into the model's admissible domain; `true` if anything moved.
    fn truncate(&self, _t: f64, _x: &mut [T]) -> bool {
        false
    }

    /// Numeraire N(t, X).
    fn numeraire(&self, _t: f64, _x: &[T]) -> Result<T, ProcessError> {
        Err(self.unsupported("numeraire"))
    }

    /// Zero-coupon bond P(t, T; X) on the domestic curve.
    fn zero_bond(&self, _t: f64, _maturity: f64, _x: &[T]) -> Result<T, ProcessError> {
        Err(self.unsupported("zero_bond"))
    }

    /// Zero-coupon bond on the curve identified by `alias`.
    fn zero_bond_in(
        &self,
        _t: f64,
        _maturity: f64,
        _x: &[T],
        _alias: &str,
    ) -> Result<T, ProcessError> {
        Err(self.unsupported("zero_bond_in"))
    }

    /// Asset level S(t, X) for `alias`.
    fn asset(&self, _t: f64, _x: &[T], _alias: &str) -> Result<T, ProcessError> {
        Err(self.unsupported("asset"))
    }

    /// Local log-volatility of `alias` at (t, X).
    fn asset_volatility(&self, _t: f64, _x: &[T], _alias: &str) -> Result<T, ProcessError> {
        Err(self.unsupported("asset_volatility"))
    }

    /// Forward price of `alias` for settlement at `settlement`, seen at (t, X).
    fn forward_asset(
        &self,
        _t: f64,
        _settlement: f64,
        _x: &[T],
        _alias: &str,
    ) -> Result<T, ProcessError> {
        Err(self.unsupported("forward_asset"))
    }

    /// Futures price of `alias` for settlement at `settlement`, seen at (t, X).
    fn future_asset(
        &self,
        _t: f64,
        _settlement: f64,
        _x: &[T],
        _alias: &str,
    ) -> Result<T, ProcessError> {
        Err(self.unsupported("future_asset"))
    }

    /// Build the `Unsupported` error for `operation` on this model.
    fn unsupported(&self, operation: &'static str) -> ProcessError {
        ProcessError::Unsupported {
            operation,
            model: self.model_name(),
        }
    }
}

/// Euler-Maruyama step `X1 = X0 + a dt + b dW √dt`.
pub fn euler_step<T, P>(process: &P, t0: f64, x0: &[T], dt: f64, dw: &[f64], x1: &mut [T])
where
    T: ActiveFloat,
    P: StochasticProcess<T> + ?Sized,
{
    let a = process.drift(t0, x0);
    let b = process.diffusion(t0, x0);
    let factors = process.factors();
    let dt_t: T = lift(dt);
    let sqrt_dt: T = lift(dt.sqrt());

    for (i, xi) in x1.iter_mut().enumerate() {
        let noise = (0..factors).fold(T::zero(), |acc, j| acc + b[i * factors + j] * lift(dw[j]));
        *xi = x0[i] + a[i] * dt_t + noise * sqrt_dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // Ornstein-Uhlenbeck with correlated second component, Euler only
    struct MockTwoFactor;

    impl StochasticProcess<f64> for MockTwoFactor {
        fn model_name(&self) -> &'static str {
            "MockTwoFactor"
        }
        fn size(&self) -> usize {
            2
        }
        fn factors(&self) -> usize {
            2
        }
        fn initial_values(&self) -> Vec<f64> {
            vec![1.0, 0.0]
        }
        fn drift(&self, _t: f64, x: &[f64]) -> Vec<f64> {
            vec![-0.5 * x[0], 0.1]
        }
        fn diffusion(&self, _t: f64, _x: &[f64]) -> Vec<f64> {
            vec![0.2, 0.0, 0.1, 0.3]
        }
        fn truncate(&self, _t: f64, x: &mut [f64]) -> bool {
            if x[1] < 0.0 {
                x[1] = 0.0;
                true
            } else {
                false
            }
        }
    }

    // ================================================================
    // Default evolve (Euler)
    // ================================================================

    #[test]
    fn test_default_evolve_is_euler() {
        let p = MockTwoFactor;
        let mut x1 = [0.0; 2];
        p.evolve(0.0, &[1.0, 0.0], 0.04, &[1.0, -2.0], &mut x1);
        // x0 = 1 - 0.5*0.04 + 0.2*1*0.2
        assert_relative_eq!(x1[0], 1.0 - 0.02 + 0.04, epsilon = 1e-14);
        // x1 = 0 + 0.1*0.04 + (0.1*1 + 0.3*(-2))*0.2
        assert_relative_eq!(x1[1], 0.004 - 0.1, epsilon = 1e-14);
    }

    #[test]
    fn test_zero_increment_follows_drift() {
        let p = MockTwoFactor;
        let mut x1 = [0.0; 2];
        euler_step(&p, 0.0, &[2.0, 1.0], 0.5, &[0.0, 0.0], &mut x1);
        assert_relative_eq!(x1[0], 1.5, epsilon = 1e-14);
        assert_relative_eq!(x1[1], 1.05, epsilon = 1e-14);
    }

    #[test]
    fn test_truncate_reports_clamping() {
        let p = MockTwoFactor;
        let mut x = [1.0, -0.5];
        assert!(p.truncate(0.0, &mut x));
        assert_eq!(x[1], 0.0);
        assert!(!p.truncate(0.0, &mut x));
    }

    // ================================================================
    // Unsupported queries
    // ================================================================

    #[test]
    fn test_default_queries_are_unsupported() {
        let p = MockTwoFactor;
        let x = p.initial_values();
        assert_eq!(
            p.numeraire(1.0, &x),
            Err(ProcessError::Unsupported {
                operation: "numeraire",
                model: "MockTwoFactor"
            })
        );
        assert!(p.zero_bond(0.0, 1.0, &x).is_err());
        assert!(p.zero_bond_in(0.0, 1.0, &x, "EUR").is_err());
        assert!(p.asset(0.0, &x, "SPX").is_err());
        assert!(p.asset_volatility(0.0, &x, "SPX").is_err());
        assert!(p.forward_asset(0.0, 1.0, &x, "SPX").is_err());
        assert!(p.future_asset(0.0, 1.0, &x, "SPX").is_err());
    }

    #[test]
    fn test_trait_object_usable() {
        let p: Box<dyn StochasticProcess<f64>> = Box::new(MockTwoFactor);
        let mut x1 = [0.0; 2];
        p.evolve(0.0, &p.initial_values(), 0.0, &[0.0, 0.0], &mut x1);
        assert_eq!(x1, [1.0, 0.0]);
    }
}
