//! Interpolation on ascending knots.
//!
//! Both interpolators keep the strict `interpolate` (error outside the knot
//! range) next to an infallible `interpolate_flat` that clamps the query to
//! the domain. The Monte Carlo adjusters read their calibration tables with
//! the flat-extrapolated variant.
//!
//! ## Example
//!
//! ```
//! use pricer_core::math::interpolators::{Interpolator, LinearInterpolator};
//!
//! let interp = LinearInterpolator::new(&[0.0_f64, 1.0, 2.0], &[0.0, 1.0, 4.0]).unwrap();
//! assert!((interp.interpolate(1.5).unwrap() - 2.5).abs() < 1e-12);
//! assert_eq!(interp.interpolate_flat(10.0), 4.0);
//! ```

mod bilinear;
mod linear;

pub use bilinear::BilinearInterpolator;
pub use linear::LinearInterpolator;

use crate::types::InterpolationError;
use num_traits::Float;

/// One-dimensional interpolator over a finite domain.
pub trait Interpolator<T: Float> {
    /// Interpolate at `x`, failing outside [`Interpolator::domain`].
    fn interpolate(&self, x: T) -> Result<T, InterpolationError>;

    /// Return the `(x_min, x_max)` knot range.
    fn domain(&self) -> (T, T);
}

/// Index `i` such that `xs[i] <= x < xs[i + 1]`, clamped to `[0, n - 2]`.
#[inline]
pub(crate) fn find_segment<T: Float>(xs: &[T], x: T) -> usize {
    let pos = xs.partition_point(|&xi| xi <= x);
    if pos == 0 {
        0
    } else if pos >= xs.len() {
        xs.len() - 2
    } else {
        pos - 1
    }
}

/// Reject fewer than two knots or knots that are not strictly ascending.
pub(crate) fn validate_knots<T: Float>(xs: &[T]) -> Result<(), InterpolationError> {
    if xs.len() < 2 {
        return Err(InterpolationError::InsufficientData {
            got: xs.len(),
            need: 2,
        });
    }
    match xs.windows(2).position(|w| !(w[1] > w[0])) {
        Some(i) => Err(InterpolationError::NonMonotonicData { index: i + 1 }),
        None => Ok(()),
    }
}
