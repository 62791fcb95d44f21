//! # Random Number Generation
//!
//! Seeded pseudo-random streams for the Monte Carlo simulator.
//!
//! ## Design Rationale
//!
//! - **Reproducibility**: every path draws from its own stream, derived from
//!   the master seed and the path index by [`stream_seed`]
//! - **Order independence**: a path's increments do not depend on which
//!   worker thread simulates it, nor on whether increments are stored
//! - **Efficiency**: zero-allocation batch fills via `&mut [f64]` slices
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_pricing::rng::{stream_seed, PricerRng};
//!
//! let mut rng = PricerRng::from_seed(stream_seed(1234, 7));
//!
//! let normal_value = rng.gen_normal();
//!
//! let mut buffer = vec![0.0; 1000];
//! rng.fill_normal(&mut buffer);
//! ```

mod prng;

pub use prng::{stream_seed, PricerRng};
