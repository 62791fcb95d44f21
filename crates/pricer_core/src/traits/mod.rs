//! Numeric trait bounds shared by every layer.
//!
//! The Monte Carlo engine separates three numeric roles:
//! - time: always `f64` (simulation and observation grids)
//! - passive: `f64` market data and Brownian increments
//! - active: the generic `T` threaded through processes, paths and payoffs
//!
//! [`ActiveFloat`] is the single substitution point for the active type. Any
//! `num_traits::Float` that can be shared across worker threads qualifies, so
//! a forward-mode dual number implementing `Float` slots in without touching
//! the engine.

/// Generic floating-point trait for numeric computations.
///
/// # Examples
/// ```
/// use pricer_core::traits::Float;
///
/// fn compute_discount<T: Float>(rate: T, time: T) -> T {
///     (-rate * time).exp()
/// }
///
/// let discount_f64: f64 = compute_discount(0.05, 1.0);
/// assert!((discount_f64 - 0.951229).abs() < 1e-5);
/// ```
pub use num_traits::Float;

use std::fmt::Debug;

/// Active numeric type carried by processes, simulated states and payoffs.
///
/// Blanket-implemented for every `Float + Send + Sync + Debug + 'static`.
///
/// # Examples
/// ```
/// use pricer_core::traits::{lift, ActiveFloat};
///
/// fn half<T: ActiveFloat>(x: T) -> T {
///     x * lift::<T>(0.5)
/// }
///
/// assert_eq!(half(3.0_f64), 1.5);
/// ```
pub trait ActiveFloat: Float + Send + Sync + Debug + 'static {}

impl<T> ActiveFloat for T where T: Float + Send + Sync + Debug + 'static {}

/// Lift a passive `f64` into the active type.
///
/// Falls back to zero for types that cannot represent the value.
#[inline]
pub fn lift<T: Float>(x: f64) -> T {
    T::from(x).unwrap_or_else(T::zero)
}

/// Project an active value back onto `f64` (NaN when not representable).
#[inline]
pub fn passive<T: Float>(x: T) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_trait_with_f64() {
        fn generic_sqrt<T: Float>(x: T) -> T {
            x.sqrt()
        }

        assert_eq!(generic_sqrt(4.0_f64), 2.0);
    }

    #[test]
    fn test_lift_and_passive_round_trip() {
        let x: f32 = lift(0.25);
        assert_eq!(x, 0.25_f32);
        assert_eq!(passive(x), 0.25);
    }

    #[test]
    fn test_active_float_is_implemented_for_primitives() {
        fn accepts<T: ActiveFloat>(_: T) {}
        accepts(1.0_f64);
        accepts(1.0_f32);
    }
}
