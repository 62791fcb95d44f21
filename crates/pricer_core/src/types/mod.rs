//! Core error types shared by the numerical utilities.
//!
//! - [`InterpolationError`]: failures of the 1D/2D interpolators
//! - [`LinearAlgebraError`]: failures of the dense factorisations and least-squares solver

pub mod error;

pub use error::{InterpolationError, LinearAlgebraError};
