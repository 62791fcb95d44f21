//! # Pricer Pricing (L3: Monte Carlo Engine)
//!
//! Generic Monte Carlo simulation and payoff pricing over any
//! [`StochasticProcess`](pricer_models::models::StochasticProcess).
//!
//! This crate provides:
//! - [`mc::McSimulation`]: merged time grid, Euler or Richardson stepping,
//!   stored or live Brownian increments, sliced simulation and cached time
//!   interpolation of states
//! - Numeraire, zero bond and asset adjusters reconciling simulated
//!   averages with today's market
//! - [`mc::Path`]: the read interface payoffs evaluate against
//! - [`payoff`]: a composable payoff algebra and [`mc::Pricer`]
//! - [`rng`]: per-path seeded normal streams
//!
//! ## Numeric Types
//!
//! Times and market inputs are `f64`. States, payoff values and prices use
//! the active type `T: ActiveFloat`, so a dual number implementing
//! `num_traits::Float` carries sensitivities through the engine unchanged.
//!
//! ## Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use pricer_core::market_data::curves::FlatCurve;
//! use pricer_models::models::rates::HullWhiteProcess;
//! use pricer_pricing::mc::{McSimulation, Pricer, SimulationConfig};
//! use pricer_pricing::payoff::{CallPut, ModelSwaption, PayoffRef};
//!
//! let process = HullWhiteProcess::new(0.05, 0.01, FlatCurve::new(0.03)).unwrap();
//! let config = SimulationConfig::builder().n_paths(4_096).seed(7).build().unwrap();
//! let times = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
//!
//! let mut sim: McSimulation<f64> =
//!     McSimulation::new(Arc::new(process), &times, &times, config).unwrap();
//! sim.simulate();
//!
//! let swaption: PayoffRef<f64> = Arc::new(ModelSwaption::new(
//!     1.0,
//!     vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
//!     vec![],
//!     0.03,
//!     CallPut::Call,
//! ));
//! let result = Pricer::new(vec![swaption]).price(&sim).unwrap();
//! assert!(result.npv > 0.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
// Allow unknown lints for clippy compatibility across versions
#![allow(unknown_lints)]

pub mod mc;
pub mod payoff;
pub mod rng;

pub use mc::{McSimulation, Path, Pricer, PricingResult, SimulationConfig, SimulationError};
pub use payoff::{Payoff, PayoffRef};
