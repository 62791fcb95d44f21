//! Integration tests for module exports.
//!
//! Verify that the public modules and types are reachable via absolute paths.

use approx::assert_relative_eq;

#[test]
fn test_traits_module_exports() {
    use pricer_core::traits::{lift, passive, ActiveFloat, Float};

    fn discount<T: ActiveFloat>(rate: T, t: T) -> T {
        (-rate * t).exp()
    }

    let df = discount(lift::<f64>(0.05), 2.0);
    assert_relative_eq!(passive(df), (-0.1_f64).exp(), epsilon = 1e-15);

    fn generic_sqrt<T: Float>(x: T) -> T {
        x.sqrt()
    }
    assert_eq!(generic_sqrt(9.0_f64), 3.0);
}

#[test]
fn test_market_data_exports() {
    use pricer_core::market_data::{
        CurveEnum, CurveInterpolation, FlatCurve, InterpolatedCurve, MarketDataError, YieldCurve,
    };

    let curve: CurveEnum<f64> =
        InterpolatedCurve::new(&[1.0, 5.0], &[0.01, 0.03], CurveInterpolation::Linear)
            .unwrap()
            .into();
    assert_relative_eq!(curve.zero_rate(3.0).unwrap(), 0.02, epsilon = 1e-14);

    let flat = FlatCurve::new(0.0_f64);
    assert_eq!(flat.discount_factor(7.0).unwrap(), 1.0);

    let err: MarketDataError = MarketDataError::InvalidMaturity { t: -1.0 };
    assert!(err.to_string().contains("-1"));
}

#[test]
fn test_math_module_exports() {
    use pricer_core::math::interpolators::{BilinearInterpolator, Interpolator, LinearInterpolator};
    use pricer_core::math::{cholesky, least_squares, Regression};

    let linear = LinearInterpolator::new(&[0.0, 1.0], &[1.0, 2.0]).unwrap();
    assert_eq!(linear.domain(), (0.0, 1.0));

    let bilinear =
        BilinearInterpolator::new(&[0.0, 1.0], &[0.0, 1.0], vec![vec![1.0, 1.0], vec![1.0, 1.0]])
            .unwrap();
    assert_eq!(bilinear.interpolate_flat(3.0, 3.0), 1.0);

    let l = cholesky(&[9.0], 1).unwrap();
    assert_eq!(l, vec![3.0]);

    let x = least_squares(&[vec![2.0]], &[4.0]).unwrap();
    assert_relative_eq!(x[0], 2.0, epsilon = 1e-15);

    let regression: Regression<f64> = Regression::new(&[], &[], 2);
    assert!(regression.beta().is_empty());
}

#[test]
fn test_types_module_exports() {
    use pricer_core::types::{InterpolationError, LinearAlgebraError};

    let err = InterpolationError::NonMonotonicData { index: 3 };
    assert!(err.to_string().contains("index 3"));
    let err = LinearAlgebraError::RankDeficient { column: 0 };
    assert!(err.to_string().contains("column 0"));
}
