//! Commodity processes.
//!
//! - [`TwoFactorMeanReversion`]: two mean-reverting factors on a lognormal futures curve

pub mod two_factor;

pub use two_factor::{FuturesCurve, TwoFactorMeanReversion, TwoFactorParams};
