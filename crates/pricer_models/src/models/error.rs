//! Error types for stochastic process construction and queries.

use pricer_core::market_data::MarketDataError;
use thiserror::Error;

use super::hybrid::CorrelationError;

/// Errors raised by [`StochasticProcess`](super::StochasticProcess) implementations.
///
/// Construction-time validation failures and unsupported queries are both
/// fatal for the caller; a process never substitutes a default number for
/// a capability it lacks.
///
/// # Examples
///
/// ```
/// use pricer_models::models::ProcessError;
///
/// let err = ProcessError::Unsupported { operation: "asset", model: "HullWhite" };
/// assert_eq!(format!("{}", err), "HullWhite does not support asset()");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessError {
    /// The process does not implement the requested query.
    #[error("{model} does not support {operation}()")]
    Unsupported {
        /// Name of the queried operation
        operation: &'static str,
        /// Model name
        model: &'static str,
    },

    /// A model parameter failed validation.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Parameter arrays disagree with the declared dimensions.
    #[error("Dimension mismatch for {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Which input is mis-sized
        what: &'static str,
        /// Expected length
        expected: usize,
        /// Actual length
        got: usize,
    },

    /// Asset alias not known to the process.
    #[error("Unknown alias '{0}'")]
    UnknownAlias(String),

    /// Invalid correlation matrix.
    #[error("Correlation error: {0}")]
    Correlation(#[from] CorrelationError),

    /// Term structure query failed.
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_display() {
        let err = ProcessError::InvalidParameter {
            name: "mean_reversion",
            reason: "must be positive, got -0.1".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Invalid parameter mean_reversion: must be positive, got -0.1"
        );
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = ProcessError::DimensionMismatch {
            what: "volatilities",
            expected: 3,
            got: 2,
        };
        assert!(format!("{}", err).contains("volatilities"));
    }

    #[test]
    fn test_from_market_data_error() {
        let err: ProcessError = MarketDataError::InvalidMaturity { t: -1.0 }.into();
        assert!(matches!(err, ProcessError::MarketData(_)));
    }

    #[test]
    fn test_from_correlation_error() {
        let err: ProcessError = CorrelationError::NotPositiveDefinite.into();
        assert!(format!("{}", err).contains("positive definite"));
    }
}
