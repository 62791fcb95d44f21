//! Multivariate polynomial least-squares regression.
//!
//! Used to estimate conditional expectations from simulated controls, e.g.
//! the continuation value of an early-exercise product. Basis functions are
//! all monomials `x₁^k₁ ⋯ x_d^k_d` of total degree `k₁ + ⋯ + k_d <= max_degree`.
//!
//! The utility is deliberately forgiving: inconsistent inputs produce a model
//! whose coefficients are all zero, and evaluating at a point of the wrong
//! dimension yields zero rather than an error.

use super::linalg::least_squares;
use num_traits::Float;

/// Polynomial regression `y ≈ Σ βᵢ mᵢ(x)` fitted by least squares.
///
/// # Example
///
/// ```
/// use pricer_core::math::regression::Regression;
///
/// // y = 1 + x² on a few points
/// let controls: Vec<Vec<f64>> = (0..5).map(|i| vec![i as f64]).collect();
/// let observations: Vec<f64> = controls.iter().map(|x| 1.0 + x[0] * x[0]).collect();
///
/// let regression = Regression::new(&controls, &observations, 2);
/// assert_eq!(regression.multi_index(), &[vec![0], vec![1], vec![2]]);
/// assert!((regression.value(&[1.5]) - 3.25).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Regression<T: Float> {
    max_degree: usize,
    multi_index: Vec<Vec<usize>>,
    beta: Vec<T>,
}

impl<T: Float> Regression<T> {
    /// Fit a regression of `observations` on `controls`.
    ///
    /// The multi-index is set up from the dimension of the first control. The
    /// fit is attempted only when there is one observation per control, at
    /// least one row, every row has the same dimension and there are at
    /// least as many rows as basis functions. A degenerate design also
    /// leaves the coefficients at zero.
    pub fn new(controls: &[Vec<T>], observations: &[T], max_degree: usize) -> Self {
        let n_rows = if controls.len() == observations.len() {
            controls.len()
        } else {
            0
        };

        let multi_index = match controls.first() {
            Some(first) if n_rows > 0 => multi_indices(first.len(), max_degree),
            _ => Vec::new(),
        };

        let mut regression = Self {
            max_degree,
            beta: vec![T::zero(); multi_index.len()],
            multi_index,
        };

        let n_cols = regression.multi_index.len();
        let dim = controls.first().map_or(0, Vec::len);
        let consistent = controls.iter().all(|row| row.len() == dim);
        if n_rows > 0 && n_rows >= n_cols && consistent {
            let design: Vec<Vec<T>> = controls.iter().map(|x| regression.monomials(x)).collect();
            if let Ok(beta) = least_squares(&design, observations) {
                regression.beta = beta;
            }
        }
        regression
    }

    /// Evaluate every basis monomial at `x`.
    ///
    /// Returns zeros when `x` does not match the fitted dimension.
    pub fn monomials(&self, x: &[T]) -> Vec<T> {
        let mut y = vec![T::zero(); self.multi_index.len()];
        match self.multi_index.first() {
            Some(first) if first.len() == x.len() => {}
            _ => return y,
        }
        for (yi, powers) in y.iter_mut().zip(&self.multi_index) {
            *yi = powers
                .iter()
                .zip(x)
                .fold(T::one(), |acc, (&k, &xj)| {
                    (0..k).fold(acc, |p, _| p * xj)
                });
        }
        y
    }

    /// Evaluate the fitted polynomial at `x` (zero on dimension mismatch).
    pub fn value(&self, x: &[T]) -> T {
        let y = self.monomials(x);
        if y.len() != self.beta.len() {
            return T::zero();
        }
        y.iter()
            .zip(&self.beta)
            .fold(T::zero(), |acc, (&m, &b)| acc + b * m)
    }

    /// Maximum total polynomial degree.
    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    /// Exponent tuples of the basis monomials, ordered by total degree.
    pub fn multi_index(&self) -> &[Vec<usize>] {
        &self.multi_index
    }

    /// Fitted coefficients, one per multi-index entry.
    pub fn beta(&self) -> &[T] {
        &self.beta
    }
}

/// All exponent tuples of length `dim` with total degree `<= max_degree`,
/// ordered by total degree and lexicographically within a degree.
pub fn multi_indices(dim: usize, max_degree: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if dim == 0 {
        out.push(Vec::new());
        return out;
    }
    let mut x = vec![0; dim];
    for degree in 0..=max_degree {
        divide(&mut x, 0, degree, &mut out);
    }
    out
}

fn divide(x: &mut [usize], idx: usize, degree: usize, out: &mut Vec<Vec<usize>>) {
    if idx == x.len() - 1 {
        x[idx] = degree;
        out.push(x.to_vec());
        return;
    }
    for k in 0..=degree {
        x[idx] = k;
        divide(x, idx + 1, degree - k, out);
    }
}
