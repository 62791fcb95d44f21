//! Interpolated yield curve implementation.

use super::YieldCurve;
use crate::market_data::error::MarketDataError;
use crate::math::interpolators::LinearInterpolator;
use num_traits::Float;
use std::str::FromStr;

/// Interpolation method for yield curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveInterpolation {
    /// Linear interpolation on zero rates.
    Linear,

    /// Linear interpolation on `ln D(t)`, i.e. piecewise constant forwards.
    LogLinear,
}

impl FromStr for CurveInterpolation {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "linear" => Ok(CurveInterpolation::Linear),
            "loglinear" => Ok(CurveInterpolation::LogLinear),
            _ => Err(MarketDataError::Interpolation(
                crate::types::InterpolationError::InvalidInput(format!(
                    "unknown curve interpolation '{}'",
                    s
                )),
            )),
        }
    }
}

/// Pillar-based yield curve.
///
/// Zero rates are extrapolated flat before the first and after the last
/// pillar, so the curve answers every non-negative maturity.
///
/// # Example
///
/// ```
/// use pricer_core::market_data::curves::{YieldCurve, InterpolatedCurve, CurveInterpolation};
///
/// let curve = InterpolatedCurve::new(
///     &[0.5, 1.0, 2.0, 5.0],
///     &[0.02, 0.025, 0.03, 0.04],
///     CurveInterpolation::LogLinear,
/// )
/// .unwrap();
///
/// let df = curve.discount_factor(10.0).unwrap();
/// assert!((df - (-0.4_f64).exp()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct InterpolatedCurve<T: Float> {
    tenors: Vec<T>,
    rates: Vec<T>,
    method: CurveInterpolation,
    zero_rates: LinearInterpolator<T>,
    log_discounts: LinearInterpolator<T>,
}

impl<T: Float> InterpolatedCurve<T> {
    /// Construct an interpolated curve from (tenor, zero rate) pillars.
    ///
    /// # Errors
    ///
    /// * `MarketDataError::InsufficientData` - fewer than 2 pillars or mismatched lengths
    /// * `MarketDataError::InvalidMaturity` - a non-positive tenor
    /// * `MarketDataError::Interpolation` - tenors not strictly ascending
    pub fn new(
        tenors: &[T],
        rates: &[T],
        method: CurveInterpolation,
    ) -> Result<Self, MarketDataError> {
        if tenors.len() < 2 {
            return Err(MarketDataError::InsufficientData {
                got: tenors.len(),
                need: 2,
            });
        }
        if tenors.len() != rates.len() {
            return Err(MarketDataError::InsufficientData {
                got: rates.len(),
                need: tenors.len(),
            });
        }
        if let Some(&t) = tenors.iter().find(|&&t| t <= T::zero()) {
            return Err(MarketDataError::InvalidMaturity {
                t: t.to_f64().unwrap_or(0.0),
            });
        }

        let log_dfs: Vec<T> = tenors
            .iter()
            .zip(rates)
            .map(|(&tenor, &rate)| -rate * tenor)
            .collect();

        Ok(Self {
            zero_rates: LinearInterpolator::new(tenors, rates)?,
            log_discounts: LinearInterpolator::new(tenors, &log_dfs)?,
            tenors: tenors.to_vec(),
            rates: rates.to_vec(),
            method,
        })
    }

    /// Construct from (tenor, discount factor) pillars.
    pub fn from_discount_factors(
        tenors: &[T],
        discount_factors: &[T],
        method: CurveInterpolation,
    ) -> Result<Self, MarketDataError> {
        if let Some((index, &df)) = discount_factors
            .iter()
            .enumerate()
            .find(|&(_, &df)| df <= T::zero())
        {
            return Err(MarketDataError::InvalidDiscountFactor {
                index,
                value: df.to_f64().unwrap_or(f64::NAN),
            });
        }
        let rates: Vec<T> = tenors
            .iter()
            .zip(discount_factors)
            .map(|(&t, &df)| -df.ln() / t)
            .collect();
        Self::new(tenors, &rates, method)
    }

    /// Return the pillar tenor range.
    #[inline]
    pub fn domain(&self) -> (T, T) {
        (self.tenors[0], self.tenors[self.tenors.len() - 1])
    }

    /// Return the interpolation method.
    #[inline]
    pub fn method(&self) -> CurveInterpolation {
        self.method
    }

    /// Return the pillar zero rates.
    #[inline]
    pub fn rates(&self) -> &[T] {
        &self.rates
    }

    fn rate_at(&self, t: T) -> T {
        let (t_min, t_max) = self.domain();
        if t <= t_min {
            return self.rates[0];
        }
        if t >= t_max {
            return self.rates[self.rates.len() - 1];
        }
        match self.method {
            CurveInterpolation::Linear => self.zero_rates.interpolate_flat(t),
            CurveInterpolation::LogLinear => -self.log_discounts.interpolate_flat(t) / t,
        }
    }
}

impl<T: Float + Send + Sync> YieldCurve<T> for InterpolatedCurve<T> {
    fn discount_factor(&self, t: T) -> Result<T, MarketDataError> {
        if t < T::zero() {
            return Err(MarketDataError::InvalidMaturity {
                t: t.to_f64().unwrap_or(0.0),
            });
        }
        if t == T::zero() {
            return Ok(T::one());
        }
        Ok((-self.rate_at(t) * t).exp())
    }

    fn zero_rate(&self, t: T) -> Result<T, MarketDataError> {
        if t <= T::zero() {
            return Err(MarketDataError::InvalidMaturity {
                t: t.to_f64().unwrap_or(0.0),
            });
        }
        Ok(self.rate_at(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pillars() -> ([f64; 3], [f64; 3]) {
        ([1.0, 2.0, 5.0], [0.02, 0.03, 0.035])
    }

    // ========================================
    // Construction Tests
    // ========================================

    #[test]
    fn test_new_insufficient_data() {
        match InterpolatedCurve::new(&[1.0_f64], &[0.02], CurveInterpolation::Linear) {
            Err(MarketDataError::InsufficientData { got, need }) => {
                assert_eq!(got, 1);
                assert_eq!(need, 2);
            }
            other => panic!("Expected InsufficientData error, got {:?}", other),
        }
    }

    #[test]
    fn test_new_rejects_non_positive_tenor() {
        let result = InterpolatedCurve::new(&[0.0_f64, 1.0], &[0.02, 0.02], CurveInterpolation::Linear);
        assert!(matches!(result, Err(MarketDataError::InvalidMaturity { .. })));
    }

    #[test]
    fn test_new_rejects_unsorted_tenors() {
        let result = InterpolatedCurve::new(&[2.0_f64, 1.0], &[0.02, 0.02], CurveInterpolation::Linear);
        assert!(matches!(result, Err(MarketDataError::Interpolation(_))));
    }

    #[test]
    fn test_from_discount_factors_rejects_negative() {
        let result = InterpolatedCurve::from_discount_factors(
            &[1.0_f64, 2.0],
            &[0.98, -0.9],
            CurveInterpolation::LogLinear,
        );
        assert_eq!(
            result.unwrap_err(),
            MarketDataError::InvalidDiscountFactor {
                index: 1,
                value: -0.9
            }
        );
    }

    #[test]
    fn test_curve_interpolation_from_str() {
        assert_eq!("linear".parse::<CurveInterpolation>().unwrap(), CurveInterpolation::Linear);
        assert_eq!("log-linear".parse::<CurveInterpolation>().unwrap(), CurveInterpolation::LogLinear);
        assert!("cubic".parse::<CurveInterpolation>().is_err());
    }

    // ========================================
    // Discount Factor Tests
    // ========================================

    #[test]
    fn test_discount_factor_at_pillars() {
        let (tenors, rates) = pillars();
        for method in [CurveInterpolation::Linear, CurveInterpolation::LogLinear] {
            let curve = InterpolatedCurve::new(&tenors, &rates, method).unwrap();
            for (&t, &r) in tenors.iter().zip(&rates) {
                assert_relative_eq!(curve.discount_factor(t).unwrap(), (-r * t).exp(), epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_linear_zero_rate_between_pillars() {
        let (tenors, rates) = pillars();
        let curve = InterpolatedCurve::new(&tenors, &rates, CurveInterpolation::Linear).unwrap();
        assert_relative_eq!(curve.zero_rate(1.5).unwrap(), 0.025, epsilon = 1e-14);
    }

    #[test]
    fn test_log_linear_has_constant_forward_between_pillars() {
        let (tenors, rates) = pillars();
        let curve = InterpolatedCurve::new(&tenors, &rates, CurveInterpolation::LogLinear).unwrap();
        let f1 = curve.forward_rate(2.5, 3.0).unwrap();
        let f2 = curve.forward_rate(4.0, 4.5).unwrap();
        assert_relative_eq!(f1, f2, epsilon = 1e-12);
    }

    #[test]
    fn test_flat_extrapolation_of_zero_rate() {
        let (tenors, rates) = pillars();
        let curve = InterpolatedCurve::new(&tenors, &rates, CurveInterpolation::Linear).unwrap();
        assert_relative_eq!(curve.zero_rate(0.25).unwrap(), 0.02, epsilon = 1e-15);
        assert_relative_eq!(curve.zero_rate(30.0).unwrap(), 0.035, epsilon = 1e-15);
        assert_eq!(curve.discount_factor(0.0).unwrap(), 1.0);
    }
}
