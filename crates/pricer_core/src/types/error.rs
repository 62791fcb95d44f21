//! Structured error types for numerical utilities.
//!
//! This module provides:
//! - `InterpolationError`: Errors from interpolation operations
//! - `LinearAlgebraError`: Errors from matrix factorisations and least squares

use thiserror::Error;

/// Interpolation operation errors.
///
/// # Variants
/// - `OutOfBounds`: Query point outside valid interpolation domain
/// - `InsufficientData`: Not enough data points for interpolation
/// - `NonMonotonicData`: Abscissae not strictly ascending
/// - `InvalidInput`: General invalid input error
///
/// # Examples
/// ```
/// use pricer_core::types::InterpolationError;
///
/// let err = InterpolationError::OutOfBounds { x: 5.0, min: 0.0, max: 3.0 };
/// assert!(format!("{}", err).contains("outside valid domain"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationError {
    /// Query point outside valid interpolation domain.
    #[error("Query point {x} outside valid domain [{min}, {max}]")]
    OutOfBounds {
        /// The query point that was out of bounds
        x: f64,
        /// Minimum valid value
        min: f64,
        /// Maximum valid value
        max: f64,
    },

    /// Insufficient data points for interpolation.
    #[error("Insufficient data points: got {got}, need at least {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },

    /// Abscissae are not strictly ascending.
    #[error("Data is not strictly ascending at index {index}")]
    NonMonotonicData {
        /// Index where monotonicity violation was detected
        index: usize,
    },

    /// Invalid input data or parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Dense linear algebra errors.
///
/// # Examples
/// ```
/// use pricer_core::types::LinearAlgebraError;
///
/// let err = LinearAlgebraError::NotPositiveDefinite { row: 2 };
/// assert!(format!("{}", err).contains("row 2"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinearAlgebraError {
    /// Operand shapes do not agree.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        got: usize,
    },

    /// Cholesky pivot was not strictly positive.
    #[error("Matrix is not positive definite (pivot failed at row {row})")]
    NotPositiveDefinite {
        /// Row of the failing pivot
        row: usize,
    },

    /// Least-squares design matrix has (numerically) dependent columns.
    #[error("Design matrix is rank deficient at column {column}")]
    RankDeficient {
        /// Column whose Householder norm vanished
        column: usize,
    },
}
