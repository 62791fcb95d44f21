//! Cross-factor correlation for multi-asset processes.

pub mod correlated;

pub use correlated::{CholeskyFactor, CorrelationError, CorrelationMatrix};
