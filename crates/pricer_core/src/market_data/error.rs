//! Market data error types.

use crate::types::InterpolationError;
use thiserror::Error;

/// Market data operation errors.
///
/// Raised by term-structure queries that fall outside the curve's valid
/// domain or by curves built from inconsistent pillars.
///
/// # Examples
///
/// ```
/// use pricer_core::market_data::MarketDataError;
///
/// let err = MarketDataError::InvalidMaturity { t: -1.0 };
/// assert!(format!("{}", err).contains("-1"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// Invalid maturity (negative time, or an empty forward period).
    #[error("Invalid maturity: t = {t}")]
    InvalidMaturity {
        /// The invalid maturity value
        t: f64,
    },

    /// Non-positive discount factor supplied as a pillar.
    #[error("Invalid discount factor {value} at pillar {index}")]
    InvalidDiscountFactor {
        /// Pillar index
        index: usize,
        /// Offending discount factor
        value: f64,
    },

    /// Query point outside valid domain.
    #[error("Out of bounds: {x} not in [{min}, {max}]")]
    OutOfBounds {
        /// The query point that was out of bounds
        x: f64,
        /// Minimum valid value
        min: f64,
        /// Maximum valid value
        max: f64,
    },

    /// Interpolation error.
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// Insufficient data for construction.
    #[error("Insufficient data: got {got}, need {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_maturity_display() {
        let err = MarketDataError::InvalidMaturity { t: -1.5 };
        assert_eq!(format!("{}", err), "Invalid maturity: t = -1.5");
    }

    #[test]
    fn test_invalid_discount_factor_display() {
        let err = MarketDataError::InvalidDiscountFactor {
            index: 2,
            value: -0.1,
        };
        assert_eq!(
            format!("{}", err),
            "Invalid discount factor -0.1 at pillar 2"
        );
    }

    #[test]
    fn test_out_of_bounds_display() {
        let err = MarketDataError::OutOfBounds {
            x: 5.0,
            min: 0.0,
            max: 3.0,
        };
        assert_eq!(format!("{}", err), "Out of bounds: 5 not in [0, 3]");
    }

    #[test]
    fn test_from_interpolation_error() {
        let interp_err = InterpolationError::InsufficientData { got: 1, need: 2 };
        let mkt_err: MarketDataError = interp_err.into();
        assert!(matches!(mkt_err, MarketDataError::Interpolation(_)));
    }

    #[test]
    fn test_clone_and_equality() {
        let err1 = MarketDataError::InsufficientData { got: 0, need: 1 };
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
