//! Numerical building blocks for the Monte Carlo engine.
//!
//! - [`interpolators`]: linear and bilinear interpolation with flat extrapolation
//! - [`linalg`]: Cholesky factorisation and Householder least squares
//! - [`regression`]: multivariate polynomial regression

pub mod interpolators;
pub mod linalg;
pub mod regression;

pub use linalg::{cholesky, least_squares};
pub use regression::Regression;
