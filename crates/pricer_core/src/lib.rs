//! # pricer_core: Numerical Foundation for the Monte Carlo Engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core is the bottom layer of the workspace, providing:
//! - The active numeric type bound [`traits::ActiveFloat`] (`traits`)
//! - Yield curve collaborators consumed by the processes (`market_data`)
//! - Linear and bilinear interpolation with flat extrapolation (`math::interpolators`)
//! - Cholesky and Householder least squares (`math::linalg`)
//! - Polynomial regression for conditional expectations (`math::regression`)
//! - Error types: `InterpolationError`, `LinearAlgebraError` (`types::error`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other pricer_* crates, with minimal external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - thiserror: Error derivation
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::market_data::curves::{FlatCurve, YieldCurve};
//! use pricer_core::math::regression::Regression;
//!
//! let curve = FlatCurve::new(0.02_f64);
//! assert!((curve.discount_factor(1.0).unwrap() - (-0.02_f64).exp()).abs() < 1e-15);
//!
//! let controls = vec![vec![0.0_f64], vec![1.0], vec![2.0]];
//! let regression = Regression::new(&controls, &[1.0, 3.0, 5.0], 1);
//! assert!((regression.value(&[4.0]) - 9.0).abs() < 1e-10);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for error types

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod market_data;
pub mod math;
pub mod traits;
pub mod types;
