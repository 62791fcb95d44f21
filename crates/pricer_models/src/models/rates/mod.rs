//! Interest rate processes.
//!
//! - [`HullWhiteProcess`]: one-factor Hull-White with bank-account numeraire

pub mod hull_white;

pub use hull_white::HullWhiteProcess;
