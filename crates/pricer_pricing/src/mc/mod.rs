//! Monte Carlo path simulation and pricing.
//!
//! # Architecture
//!
//! ```text
//! McSimulation
//! ├── StochasticProcess  (model contract, shared via Arc)
//! ├── SimulationConfig   (paths, seed, stepping and storage switches)
//! ├── TimeGrid           (merged simulation/observation grid)
//! ├── PathWorkspace      (state table, optional Brownian table)
//! ├── Adjusters          (numeraire, zero bond and asset corrections)
//! └── interpolation cache
//!
//! Path ──► Payoff::value ──► Pricer (NPV, NPVs, standard error)
//! ```
//!
//! # Lifecycle
//!
//! 1. [`McSimulation::new`] validates the process and merges the grids.
//! 2. [`McSimulation::simulate`] populates every path in parallel, or
//!    [`McSimulation::prepare_sliced`] followed by
//!    [`McSimulation::simulate_slice`] advances all paths one observation
//!    at a time.
//! 3. Optional adjuster calibration makes the simulated numeraire, zero
//!    bonds and assets reprice the initial market exactly.
//! 4. [`Path`] views feed payoff trees; the [`Pricer`] averages them.
//!
//! # Reproducibility
//!
//! Path `k` draws from its own stream seeded from `(seed, k)`. Full,
//! sliced, stored and live simulation therefore produce identical paths
//! for the same seed, independent of the rayon thread count.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use pricer_core::market_data::curves::FlatCurve;
//! use pricer_models::models::rates::HullWhiteProcess;
//! use pricer_pricing::mc::{McSimulation, Pricer, SimulationConfig};
//! use pricer_pricing::payoff::{Cash, PayoffRef};
//!
//! let process = HullWhiteProcess::new(0.1, 0.01, FlatCurve::new(0.03)).unwrap();
//! let config = SimulationConfig::builder()
//!     .n_paths(2_000)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! let mut sim: McSimulation<f64> =
//!     McSimulation::new(Arc::new(process), &[1.0, 2.0, 5.0], &[1.0, 2.0, 5.0], config).unwrap();
//! sim.simulate();
//! sim.calibrate_numeraire_adjuster(&[1.0, 2.0, 5.0]).unwrap();
//!
//! let cash: PayoffRef<f64> = Arc::new(Cash::new(5.0, 5.0));
//! let npv = Pricer::new(vec![cash]).npv(&sim).unwrap();
//! assert!((npv - (-0.15_f64).exp()).abs() < 1e-10);
//! ```

mod adjusters;
mod config;
mod error;
mod path;
mod pricer;
mod simulation;
mod time_grid;
mod workspace;

pub use adjusters::Adjusters;
pub use config::{SimulationConfig, SimulationConfigBuilder, DEFAULT_SEED, MAX_PATHS};
pub use error::{ConfigError, SimulationError};
pub use path::{BarrierSide, Path};
pub use pricer::{Pricer, PricingResult};
pub use simulation::{McSimulation, Phase, StateRef};
pub use time_grid::{TimeGrid, ONE_DAY};
pub use workspace::PathWorkspace;
