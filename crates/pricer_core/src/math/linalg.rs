//! Dense linear algebra on small row-major matrices.
//!
//! Sized for correlation matrices and regression design matrices, i.e. a
//! handful of columns. Everything is generic over `T: Float` so the routines
//! run on the active numeric type.

use crate::types::LinearAlgebraError;
use num_traits::Float;

/// Cholesky factorisation `A = L Lᵀ` of a symmetric positive definite matrix.
///
/// `a` is row-major `n × n`; the lower-triangular factor is returned in the
/// same layout with zeros above the diagonal.
///
/// # Errors
///
/// * `LinearAlgebraError::DimensionMismatch` - `a.len() != n * n`
/// * `LinearAlgebraError::NotPositiveDefinite` - a pivot is not strictly positive
///
/// # Example
///
/// ```
/// use pricer_core::math::linalg::cholesky;
///
/// let l = cholesky(&[4.0, 2.0, 2.0, 5.0], 2).unwrap();
/// assert_eq!(l, vec![2.0, 0.0, 1.0, 2.0]);
/// ```
pub fn cholesky<T: Float>(a: &[T], n: usize) -> Result<Vec<T>, LinearAlgebraError> {
    if a.len() != n * n {
        return Err(LinearAlgebraError::DimensionMismatch {
            expected: n * n,
            got: a.len(),
        });
    }

    let mut l = vec![T::zero(); n * n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i * n + j];
            for k in 0..j {
                sum = sum - l[i * n + k] * l[j * n + k];
            }

            if i == j {
                if !(sum > T::zero()) {
                    return Err(LinearAlgebraError::NotPositiveDefinite { row: i });
                }
                l[i * n + j] = sum.sqrt();
            } else {
                l[i * n + j] = sum / l[j * n + j];
            }
        }
    }
    Ok(l)
}

/// Least-squares solution of `A x ≈ b` by Householder QR.
///
/// `rows` holds the `m` rows of `A`, each of length `n`, with `m >= n`.
///
/// # Errors
///
/// * `LinearAlgebraError::DimensionMismatch` - ragged rows, `b.len() != m` or `m < n`
/// * `LinearAlgebraError::RankDeficient` - a column is numerically dependent on the previous ones
///
/// # Example
///
/// ```
/// use pricer_core::math::linalg::least_squares;
///
/// // y = 1 + 2 x sampled without noise
/// let rows = vec![vec![1.0_f64, 0.0], vec![1.0, 1.0], vec![1.0, 2.0]];
/// let beta = least_squares(&rows, &[1.0, 3.0, 5.0]).unwrap();
/// assert!((beta[0] - 1.0).abs() < 1e-12);
/// assert!((beta[1] - 2.0).abs() < 1e-12);
/// ```
pub fn least_squares<T: Float>(rows: &[Vec<T>], b: &[T]) -> Result<Vec<T>, LinearAlgebraError> {
    let m = rows.len();
    let n = rows.first().map_or(0, Vec::len);
    if b.len() != m {
        return Err(LinearAlgebraError::DimensionMismatch {
            expected: m,
            got: b.len(),
        });
    }
    if m < n {
        return Err(LinearAlgebraError::DimensionMismatch {
            expected: n,
            got: m,
        });
    }
    if let Some(row) = rows.iter().find(|row| row.len() != n) {
        return Err(LinearAlgebraError::DimensionMismatch {
            expected: n,
            got: row.len(),
        });
    }

    let mut a: Vec<T> = rows.iter().flat_map(|row| row.iter().copied()).collect();
    let mut rhs = b.to_vec();

    let scale = (0..n)
        .map(|j| column_norm(&a, m, n, j, 0))
        .fold(T::zero(), T::max)
        .max(T::one());
    let tolerance = T::epsilon() * scale * T::from(m.max(n)).unwrap_or_else(T::one);

    let mut v = vec![T::zero(); m];
    for k in 0..n {
        let norm = column_norm(&a, m, n, k, k);
        if norm <= tolerance {
            return Err(LinearAlgebraError::RankDeficient { column: k });
        }

        let akk = a[k * n + k];
        let alpha = if akk > T::zero() { -norm } else { norm };

        for i in k..m {
            v[i] = a[i * n + k];
        }
        v[k] = v[k] - alpha;
        let v_norm2 = (k..m).fold(T::zero(), |acc, i| acc + v[i] * v[i]);
        if v_norm2 == T::zero() {
            continue;
        }
        let two = T::one() + T::one();

        for j in k..n {
            let s = (k..m).fold(T::zero(), |acc, i| acc + v[i] * a[i * n + j]);
            let factor = two * s / v_norm2;
            for i in k..m {
                a[i * n + j] = a[i * n + j] - factor * v[i];
            }
        }

        let s = (k..m).fold(T::zero(), |acc, i| acc + v[i] * rhs[i]);
        let factor = two * s / v_norm2;
        for i in k..m {
            rhs[i] = rhs[i] - factor * v[i];
        }
    }

    let mut x = vec![T::zero(); n];
    for i in (0..n).rev() {
        let mut sum = rhs[i];
        for j in (i + 1)..n {
            sum = sum - a[i * n + j] * x[j];
        }
        x[i] = sum / a[i * n + i];
    }
    Ok(x)
}

fn column_norm<T: Float>(a: &[T], m: usize, n: usize, col: usize, from: usize) -> T {
    (from..m)
        .fold(T::zero(), |acc, i| acc + a[i * n + col] * a[i * n + col])
        .sqrt()
}
