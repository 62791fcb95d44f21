//! Correlation matrices and their Cholesky factors.
//!
//! Multi-asset processes receive independent standard normal drivers from the
//! simulator and correlate them internally:
//!
//! ```text
//! W = L * Z,    C = L * L^T
//! ```
//!
//! ## Usage
//!
//! ```
//! use pricer_models::models::hybrid::{CholeskyFactor, CorrelationMatrix};
//!
//! let corr = CorrelationMatrix::new(&[
//!     1.0_f64, 0.5,
//!     0.5, 1.0,
//! ], 2).unwrap();
//!
//! let l: CholeskyFactor<f64> = corr.cholesky().unwrap();
//! let w = l.transform(&[0.5, 0.8]);
//! assert_eq!(w.len(), 2);
//! ```

use pricer_core::math::cholesky;
use pricer_core::traits::Float;

/// Error types for correlation operations.
#[derive(Debug, Clone, PartialEq)]
pub enum CorrelationError {
    /// Matrix is not positive definite
    NotPositiveDefinite,
    /// Matrix dimensions are invalid
    InvalidDimensions {
        /// Expected element count
        expected: usize,
        /// Supplied element count
        got: usize,
    },
    /// Diagonal elements are not 1.0
    InvalidDiagonal {
        /// Diagonal index
        index: usize,
        /// Offending value
        value: f64,
    },
    /// Matrix is not symmetric
    NotSymmetric {
        /// Row
        i: usize,
        /// Column
        j: usize,
    },
    /// Correlation value out of range [-1, 1]
    OutOfRange {
        /// Row
        i: usize,
        /// Column
        j: usize,
        /// Offending value
        value: f64,
    },
}

impl std::fmt::Display for CorrelationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorrelationError::NotPositiveDefinite => {
                write!(f, "Correlation matrix is not positive definite")
            }
            CorrelationError::InvalidDimensions { expected, got } => {
                write!(
                    f,
                    "Invalid matrix dimensions: expected {} elements, got {}",
                    expected, got
                )
            }
            CorrelationError::InvalidDiagonal { index, value } => {
                write!(
                    f,
                    "Diagonal element at index {} is {}, expected 1.0",
                    index, value
                )
            }
            CorrelationError::NotSymmetric { i, j } => {
                write!(f, "Matrix is not symmetric at ({}, {})", i, j)
            }
            CorrelationError::OutOfRange { i, j, value } => {
                write!(
                    f,
                    "Correlation at ({}, {}) is {}, must be in [-1, 1]",
                    i, j, value
                )
            }
        }
    }
}

impl std::error::Error for CorrelationError {}

/// Validated correlation matrix (row-major, unit diagonal, symmetric).
#[derive(Clone, Debug)]
pub struct CorrelationMatrix<T: Float> {
    data: Vec<T>,
    dim: usize,
}

impl<T: Float> CorrelationMatrix<T> {
    /// Create a correlation matrix from `dim * dim` row-major elements.
    ///
    /// # Errors
    ///
    /// - `InvalidDimensions` if the element count is wrong
    /// - `InvalidDiagonal` if a diagonal entry differs from 1
    /// - `NotSymmetric` / `OutOfRange` for bad off-diagonal entries
    pub fn new(data: &[T], dim: usize) -> Result<Self, CorrelationError> {
        let expected = dim * dim;
        if data.len() != expected {
            return Err(CorrelationError::InvalidDimensions {
                expected,
                got: data.len(),
            });
        }

        let one = T::one();
        let epsilon = T::from(1e-10).unwrap_or(T::zero());

        for i in 0..dim {
            let diag = data[i * dim + i];
            if (diag - one).abs() > epsilon {
                return Err(CorrelationError::InvalidDiagonal {
                    index: i,
                    value: diag.to_f64().unwrap_or(0.0),
                });
            }
        }

        for i in 0..dim {
            for j in (i + 1)..dim {
                let val_ij = data[i * dim + j];
                let val_ji = data[j * dim + i];

                if (val_ij - val_ji).abs() > epsilon {
                    return Err(CorrelationError::NotSymmetric { i, j });
                }
                if val_ij.abs() > one {
                    return Err(CorrelationError::OutOfRange {
                        i,
                        j,
                        value: val_ij.to_f64().unwrap_or(0.0),
                    });
                }
            }
        }

        Ok(Self {
            data: data.to_vec(),
            dim,
        })
    }

    /// Identity correlation matrix (no correlation).
    pub fn identity(dim: usize) -> Self {
        let mut data = vec![T::zero(); dim * dim];
        for i in 0..dim {
            data[i * dim + i] = T::one();
        }
        Self { data, dim }
    }

    /// Matrix dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Element at (i, j).
    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[i * self.dim + j]
    }

    /// Lower triangular L with C = L * L^T.
    pub fn cholesky(&self) -> Result<CholeskyFactor<T>, CorrelationError> {
        let lower =
            cholesky(&self.data, self.dim).map_err(|_| CorrelationError::NotPositiveDefinite)?;
        Ok(CholeskyFactor {
            data: lower,
            dim: self.dim,
        })
    }
}

/// Lower triangular Cholesky factor of a correlation matrix.
#[derive(Clone, Debug)]
pub struct CholeskyFactor<T: Float> {
    data: Vec<T>,
    dim: usize,
}

impl<T: Float> CholeskyFactor<T> {
    /// Identity factor of dimension `dim`.
    pub fn identity(dim: usize) -> Self {
        let CorrelationMatrix { data, dim } = CorrelationMatrix::identity(dim);
        Self { data, dim }
    }

    /// Matrix dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Element at (i, j); zero above the diagonal.
    pub fn get(&self, i: usize, j: usize) -> T {
        if j > i {
            T::zero()
        } else {
            self.data[i * self.dim + j]
        }
    }

    /// Correlated normals W = L * Z.
    ///
    /// Only the first `dim()` entries of `z` are read; missing entries count
    /// as zero.
    pub fn transform(&self, z: &[T]) -> Vec<T> {
        let n = self.dim;
        (0..n)
            .map(|i| {
                (0..=i)
                    .filter_map(|j| z.get(j).map(|&zj| self.get(i, j) * zj))
                    .fold(T::zero(), |acc, v| acc + v)
            })
            .collect()
    }

    /// Row `i` dotted with `z`, i.e. the i-th correlated normal.
    pub fn transform_row(&self, i: usize, z: &[f64]) -> T {
        (0..=i.min(self.dim.saturating_sub(1)))
            .filter_map(|j| {
                z.get(j)
                    .map(|&zj| self.get(i, j) * T::from(zj).unwrap_or(T::zero()))
            })
            .fold(T::zero(), |acc, v| acc + v)
    }
}
