//! Bilinear 2D interpolation on a rectangular grid.

use super::{find_segment, validate_knots};
use crate::types::InterpolationError;
use num_traits::Float;

/// Bilinear interpolator for grid data `zs[i][j] = z(xs[i], ys[j])`.
///
/// # Example
///
/// ```
/// use pricer_core::math::interpolators::BilinearInterpolator;
///
/// let interp = BilinearInterpolator::new(
///     &[0.0_f64, 1.0],
///     &[0.0_f64, 1.0],
///     vec![vec![0.0, 1.0], vec![2.0, 3.0]],
/// )
/// .unwrap();
/// assert!((interp.interpolate(0.5, 0.5).unwrap() - 1.5).abs() < 1e-12);
/// assert_eq!(interp.interpolate_flat(5.0, -1.0), 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct BilinearInterpolator<T: Float> {
    xs: Vec<T>,
    ys: Vec<T>,
    zs: Vec<Vec<T>>,
}

impl<T: Float> BilinearInterpolator<T> {
    /// Construct a bilinear interpolator from grid data.
    ///
    /// Both axes need at least two strictly ascending knots and `zs` must be
    /// `xs.len()` rows of `ys.len()` values.
    pub fn new(xs: &[T], ys: &[T], zs: Vec<Vec<T>>) -> Result<Self, InterpolationError> {
        validate_knots(xs)?;
        validate_knots(ys)?;

        if zs.len() != xs.len() {
            return Err(InterpolationError::InvalidInput(format!(
                "Grid rows ({}) must match x-axis length ({})",
                zs.len(),
                xs.len()
            )));
        }
        if let Some((i, row)) = zs.iter().enumerate().find(|(_, row)| row.len() != ys.len()) {
            return Err(InterpolationError::InvalidInput(format!(
                "Grid row {} length ({}) must match y-axis length ({})",
                i,
                row.len(),
                ys.len()
            )));
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            zs,
        })
    }

    /// Interpolate at `(x, y)`, failing outside the grid.
    pub fn interpolate(&self, x: T, y: T) -> Result<T, InterpolationError> {
        let (x_min, x_max) = self.domain_x();
        let (y_min, y_max) = self.domain_y();

        if x < x_min || x > x_max {
            return Err(InterpolationError::OutOfBounds {
                x: x.to_f64().unwrap_or(f64::NAN),
                min: x_min.to_f64().unwrap_or(f64::NAN),
                max: x_max.to_f64().unwrap_or(f64::NAN),
            });
        }
        if y < y_min || y > y_max {
            return Err(InterpolationError::OutOfBounds {
                x: y.to_f64().unwrap_or(f64::NAN),
                min: y_min.to_f64().unwrap_or(f64::NAN),
                max: y_max.to_f64().unwrap_or(f64::NAN),
            });
        }

        Ok(self.cell_value(x, y))
    }

    /// Interpolate with flat extrapolation on both axes.
    ///
    /// The query is clamped into the grid before the cell lookup, so the
    /// value beyond an edge equals the value on that edge.
    pub fn interpolate_flat(&self, x: T, y: T) -> T {
        let (x_min, x_max) = self.domain_x();
        let (y_min, y_max) = self.domain_y();
        self.cell_value(x.max(x_min).min(x_max), y.max(y_min).min(y_max))
    }

    fn cell_value(&self, x: T, y: T) -> T {
        let i = find_segment(&self.xs, x);
        let j = find_segment(&self.ys, y);

        let u = (x - self.xs[i]) / (self.xs[i + 1] - self.xs[i]);
        let v = (y - self.ys[j]) / (self.ys[j + 1] - self.ys[j]);

        let z00 = self.zs[i][j];
        let z10 = self.zs[i + 1][j];
        let z01 = self.zs[i][j + 1];
        let z11 = self.zs[i + 1][j + 1];

        let one = T::one();
        (one - u) * (one - v) * z00 + u * (one - v) * z10 + (one - u) * v * z01 + u * v * z11
    }

    /// Return the valid interpolation domain for x.
    #[inline]
    pub fn domain_x(&self) -> (T, T) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Return the valid interpolation domain for y.
    #[inline]
    pub fn domain_y(&self) -> (T, T) {
        (self.ys[0], self.ys[self.ys.len() - 1])
    }

    /// Returns the grid values.
    #[inline]
    pub fn zs(&self) -> &[Vec<T>] {
        &self.zs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid() -> BilinearInterpolator<f64> {
        // z = x + 10 y
        BilinearInterpolator::new(
            &[0.0, 1.0, 3.0],
            &[0.0, 2.0],
            vec![vec![0.0, 20.0], vec![1.0, 21.0], vec![3.0, 23.0]],
        )
        .unwrap()
    }

    // ========================================
    // Construction Tests
    // ========================================

    #[test]
    fn test_new_rejects_ragged_grid() {
        let result =
            BilinearInterpolator::new(&[0.0, 1.0], &[0.0, 1.0], vec![vec![0.0, 1.0], vec![2.0]]);
        assert!(matches!(result, Err(InterpolationError::InvalidInput(_))));
    }

    #[test]
    fn test_new_rejects_row_count_mismatch() {
        let result = BilinearInterpolator::new(&[0.0, 1.0, 2.0], &[0.0, 1.0], vec![vec![0.0, 1.0]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_rejects_unsorted_axis() {
        let result = BilinearInterpolator::new(
            &[0.0, 1.0],
            &[1.0, 0.0],
            vec![vec![0.0, 1.0], vec![2.0, 3.0]],
        );
        assert!(matches!(
            result,
            Err(InterpolationError::NonMonotonicData { index: 1 })
        ));
    }

    // ========================================
    // Interpolation Tests
    // ========================================

    #[test]
    fn test_interpolate_reproduces_plane() {
        let interp = grid();
        assert_relative_eq!(interp.interpolate(2.0, 1.0).unwrap(), 12.0, epsilon = 1e-12);
        assert_relative_eq!(interp.interpolate(0.5, 0.5).unwrap(), 5.5, epsilon = 1e-12);
    }

    #[test]
    fn test_interpolate_out_of_bounds() {
        let interp = grid();
        assert!(interp.interpolate(-1.0, 0.0).is_err());
        assert!(interp.interpolate(1.0, 3.0).is_err());
    }

    #[test]
    fn test_interpolate_flat_clamps_each_axis() {
        let interp = grid();
        assert_relative_eq!(interp.interpolate_flat(10.0, 1.0), 13.0, epsilon = 1e-12);
        assert_relative_eq!(interp.interpolate_flat(-1.0, 5.0), 20.0, epsilon = 1e-12);
        assert_relative_eq!(interp.interpolate_flat(0.5, -3.0), 0.5, epsilon = 1e-12);
    }
}
