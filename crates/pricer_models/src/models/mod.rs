//! Stochastic processes consumed by the Monte Carlo engine.
//!
//! - [`StochasticProcess`]: the polymorphic model contract
//! - [`rates::HullWhiteProcess`]: short-rate model with bank-account numeraire
//! - [`equity::MultiAssetBlackScholes`]: correlated lognormal assets
//! - [`commodity::TwoFactorMeanReversion`]: two-factor futures model
//!
//! Processes are shared as `Arc<dyn StochasticProcess<T>>` so the simulator,
//! paths and payoffs never depend on a concrete model type.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use pricer_core::market_data::curves::FlatCurve;
//! use pricer_models::models::{rates::HullWhiteProcess, StochasticProcess};
//!
//! let hw = HullWhiteProcess::new(0.05, 0.01, FlatCurve::new(0.02)).unwrap();
//! let process: Arc<dyn StochasticProcess<f64>> = Arc::new(hw);
//! assert_eq!(process.size(), 2);
//! ```

pub mod commodity;
pub mod equity;
pub mod error;
pub mod hybrid;
pub mod rates;
pub mod stochastic;

pub use error::ProcessError;
pub use stochastic::{euler_step, StochasticProcess};
