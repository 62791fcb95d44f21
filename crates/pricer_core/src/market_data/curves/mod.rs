//! Yield curve abstractions.
//!
//! - [`YieldCurve`]: discount factor, zero rate and forward rate queries
//! - [`FlatCurve`]: constant continuously compounded rate
//! - [`InterpolatedCurve`]: pillar-based curve with flat extrapolation
//! - [`CurveEnum`]: static dispatch over the concrete curves

mod curve_enum;
mod flat;
mod interpolated;
mod traits;

pub use curve_enum::CurveEnum;
pub use flat::FlatCurve;
pub use interpolated::{CurveInterpolation, InterpolatedCurve};
pub use traits::YieldCurve;
