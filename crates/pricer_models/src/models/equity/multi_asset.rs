//! Correlated multi-asset Black-Scholes in log-return coordinates.
//!
//! Each asset follows
//!
//! ```text
//! dS_k / S_k = (r(t) - q_k) dt + sigma_k dW_k,    d<W_i, W_j> = rho_ij dt
//! ```
//!
//! under the risk-neutral measure of a shared domestic curve. The state is
//! `X_k = ln(S_k(t) / S_k(0))`, starting at zero. The simulator supplies
//! independent drivers, which are correlated through the Cholesky factor of
//! the correlation matrix inside [`StochasticProcess::evolve`].
//!
//! ## Usage
//!
//! ```
//! use pricer_core::market_data::curves::FlatCurve;
//! use pricer_models::models::equity::{AssetSpec, MultiAssetBlackScholes};
//! use pricer_models::models::StochasticProcess;
//!
//! let model = MultiAssetBlackScholes::new(
//!     vec![
//!         AssetSpec::new("SPX", 100.0, 0.2),
//!         AssetSpec::new("SX5E", 50.0, 0.25).with_dividend_yield(0.02),
//!     ],
//!     None,
//!     FlatCurve::new(0.03),
//! )
//! .unwrap();
//!
//! let x0: Vec<f64> = model.initial_values();
//! assert_eq!(model.asset(0.0, &x0, "SPX").unwrap(), 100.0);
//! ```

use std::collections::HashMap;

use pricer_core::market_data::curves::YieldCurve;
use pricer_core::traits::{lift, ActiveFloat};

use crate::models::error::ProcessError;
use crate::models::hybrid::{CholeskyFactor, CorrelationMatrix};
use crate::models::stochastic::StochasticProcess;

/// Per-asset Black-Scholes parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetSpec {
    /// Identifier used by payoffs and adjusters.
    pub alias: String,
    /// Spot level at time 0.
    pub spot: f64,
    /// Constant log-volatility.
    pub volatility: f64,
    /// Continuous dividend (or foreign rate) yield.
    pub dividend_yield: f64,
}

impl AssetSpec {
    /// Asset with zero dividend yield.
    pub fn new(alias: impl Into<String>, spot: f64, volatility: f64) -> Self {
        Self {
            alias: alias.into(),
            spot,
            volatility,
            dividend_yield: 0.0,
        }
    }

    /// Set the continuous dividend yield.
    pub fn with_dividend_yield(mut self, dividend_yield: f64) -> Self {
        self.dividend_yield = dividend_yield;
        self
    }
}

/// Correlated lognormal assets on a deterministic discount curve.
#[derive(Clone, Debug)]
pub struct MultiAssetBlackScholes<C> {
    assets: Vec<AssetSpec>,
    index: HashMap<String, usize>,
    cholesky: CholeskyFactor<f64>,
    curve: C,
}

impl<C: YieldCurve<f64>> MultiAssetBlackScholes<C> {
    /// Build the model; `correlation = None` means independent assets.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` for an empty asset list, non-positive spots,
    ///   negative volatilities or duplicate aliases
    /// - `DimensionMismatch` if the correlation matrix does not match the asset count
    /// - `Correlation` if the matrix is not positive definite
    pub fn new(
        assets: Vec<AssetSpec>,
        correlation: Option<CorrelationMatrix<f64>>,
        curve: C,
    ) -> Result<Self, ProcessError> {
        if assets.is_empty() {
            return Err(ProcessError::InvalidParameter {
                name: "assets",
                reason: "at least one asset is required".to_string(),
            });
        }

        let mut index = HashMap::with_capacity(assets.len());
        for (k, asset) in assets.iter().enumerate() {
            if !(asset.spot.is_finite() && asset.spot > 0.0) {
                return Err(ProcessError::InvalidParameter {
                    name: "spot",
                    reason: format!("{} spot must be positive, got {}", asset.alias, asset.spot),
                });
            }
            if !(asset.volatility.is_finite() && asset.volatility >= 0.0) {
                return Err(ProcessError::InvalidParameter {
                    name: "volatility",
                    reason: format!(
                        "{} volatility must be non-negative, got {}",
                        asset.alias, asset.volatility
                    ),
                });
            }
            if index.insert(asset.alias.clone(), k).is_some() {
                return Err(ProcessError::InvalidParameter {
                    name: "alias",
                    reason: format!("duplicate alias {}", asset.alias),
                });
            }
        }

        let cholesky = match correlation {
            Some(matrix) => {
                if matrix.dim() != assets.len() {
                    return Err(ProcessError::DimensionMismatch {
                        what: "correlation matrix",
                        expected: assets.len(),
                        got: matrix.dim(),
                    });
                }
                matrix.cholesky()?
            }
            None => CholeskyFactor::identity(assets.len()),
        };

        Ok(Self {
            assets,
            index,
            cholesky,
            curve,
        })
    }

    /// Asset specifications in state order.
    pub fn assets(&self) -> &[AssetSpec] {
        &self.assets
    }

    /// Position of `alias` in the state vector.
    pub fn index_of(&self, alias: &str) -> Result<usize, ProcessError> {
        self.index
            .get(alias)
            .copied()
            .ok_or_else(|| ProcessError::UnknownAlias(alias.to_string()))
    }

    fn discount(&self, t: f64) -> Result<f64, ProcessError> {
        Ok(self.curve.discount_factor(t)?)
    }

    // ln(P(t0) / P(t0 + dt)), zero growth if the curve cannot answer
    fn log_growth(&self, t0: f64, dt: f64) -> f64 {
        match (self.discount(t0), self.discount(t0 + dt)) {
            (Ok(p0), Ok(p1)) if p0 > 0.0 && p1 > 0.0 => (p0 / p1).ln(),
            _ => 0.0,
        }
    }
}

impl<T, C> StochasticProcess<T> for MultiAssetBlackScholes<C>
where
    T: ActiveFloat,
    C: YieldCurve<f64>,
{
    fn model_name(&self) -> &'static str {
        "MultiAssetBlackScholes"
    }

    fn size(&self) -> usize {
        self.assets.len()
    }

    fn factors(&self) -> usize {
        self.assets.len()
    }

    fn initial_values(&self) -> Vec<T> {
        vec![T::zero(); self.assets.len()]
    }

    fn drift(&self, t: f64, _x: &[T]) -> Vec<T> {
        let r = self.curve.forward_rate(t, t + 1.0 / 365.25).unwrap_or(0.0);
        self.assets
            .iter()
            .map(|a| lift(r - a.dividend_yield - 0.5 * a.volatility * a.volatility))
            .collect()
    }

    fn diffusion(&self, _t: f64, _x: &[T]) -> Vec<T> {
        let n = self.assets.len();
        let mut b = Vec::with_capacity(n * n);
        for (i, a) in self.assets.iter().enumerate() {
            for j in 0..n {
                b.push(lift(a.volatility * self.cholesky.get(i, j)));
            }
        }
        b
    }

    fn evolve(&self, t0: f64, x0: &[T], dt: f64, dw: &[f64], x1: &mut [T]) {
        let growth = self.log_growth(t0, dt);
        let sqrt_dt = dt.sqrt();
        for (k, a) in self.assets.iter().enumerate() {
            let sigma = a.volatility;
            let z: f64 = self.cholesky.transform_row(k, dw);
            let increment =
                growth - a.dividend_yield * dt - 0.5 * sigma * sigma * dt + sigma * sqrt_dt * z;
            x1[k] = x0[k] + lift(increment);
        }
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

    fn asset(&self, _t: f64, x: &[T], alias: &str) -> Result<T, ProcessError> {
        let k = self.index_of(alias)?;
        Ok(lift::<T>(self.assets[k].spot) * x[k].exp())
    }

    fn asset_volatility(&self, _t: f64, _x: &[T], alias: &str) -> Result<T, ProcessError> {
        let k = self.index_of(alias)?;
        Ok(lift(self.assets[k].volatility))
    }

    fn forward_asset(
        &self,
        t: f64,
        settlement: f64,
        x: &[T],
        alias: &str,
    ) -> Result<T, ProcessError> {
        let k = self.index_of(alias)?;
        let spot = self.asset(t, x, alias)?;
        let carry = (-self.assets[k].dividend_yield * (settlement - t)).exp()
            * self.discount(t)?
            / self.discount(settlement)?;
        Ok(spot * lift(carry))
    }

    fn future_asset(
        &self,
        t: f64,
        settlement: f64,
        x: &[T],
        alias: &str,
    ) -> Result<T, ProcessError> {
        // deterministic rates: futures equal forwards
        self.forward_asset(t, settlement, x, alias)
    }
}
