//! Comparison and boolean combinators.
//!
//! Truth values are encoded as `1` and `0`; any non-zero value counts as
//! true when fed back into a condition.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use pricer_core::traits::ActiveFloat;

use super::{children_times, latest_observation, Payoff, PayoffRef};
use crate::mc::{Path, SimulationError};

/// Comparison or boolean operator of a [`Logical`] node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogicalOp {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl LogicalOp {
    /// Applies the operator.
    pub fn apply<T: ActiveFloat>(self, x: T, y: T) -> bool {
        match self {
            Self::Equal => x == y,
            Self::NotEqual => x != y,
            Self::Less => x < y,
            Self::LessEqual => x <= y,
            Self::Greater => x > y,
            Self::GreaterEqual => x >= y,
            Self::And => x != T::zero() && y != T::zero(),
            Self::Or => x != T::zero() || y != T::zero(),
        }
    }

    /// Operator symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for LogicalOp {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "==" => Ok(Self::Equal),
            "!=" => Ok(Self::NotEqual),
            "<" => Ok(Self::Less),
            "<=" => Ok(Self::LessEqual),
            ">" => Ok(Self::Greater),
            ">=" => Ok(Self::GreaterEqual),
            "&&" => Ok(Self::And),
            "||" => Ok(Self::Or),
            other => Err(SimulationError::InvalidPayoff {
                name: "Logical",
                reason: format!("unknown operator '{}'", other),
            }),
        }
    }
}

/// `op(x, y)` as `1` or `0`.
#[derive(Clone, Debug)]
pub struct Logical<T: ActiveFloat> {
    op: LogicalOp,
    x: PayoffRef<T>,
    y: PayoffRef<T>,
    obs: f64,
}

impl<T: ActiveFloat> Logical<T> {
    /// Compares `x` and `y` with `op`.
    pub fn new(op: LogicalOp, x: PayoffRef<T>, y: PayoffRef<T>) -> Self {
        let obs = latest_observation(&[&x, &y]);
        Self { op, x, y, obs }
    }

    /// Parses `op` from its symbol.
    ///
    /// # Errors
    ///
    /// [`SimulationError::InvalidPayoff`] for an unknown symbol.
    pub fn parse(op: &str, x: PayoffRef<T>, y: PayoffRef<T>) -> Result<Self, SimulationError> {
        Ok(Self::new(op.parse()?, x, y))
    }

    /// The operator.
    pub fn op(&self) -> LogicalOp {
        self.op
    }
}

impl<T: ActiveFloat> Payoff<T> for Logical<T> {
    fn observation_time(&self) -> f64 {
        self.obs
    }

    fn observation_times(&self) -> Vec<f64> {
        children_times(&[&self.x, &self.y])
    }

    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        let (x, y) = (self.x.value(path)?, self.y.value(path)?);
        Ok(if self.op.apply(x, y) {
            T::one()
        } else {
            T::zero()
        })
    }

    fn at(&self, t: f64) -> PayoffRef<T> {
        Arc::new(Self::new(self.op, self.x.at(t), self.y.at(t)))
    }
}

/// `x ≠ 0 ? y : z`.
///
/// Only the selected branch is evaluated.
#[derive(Clone, Debug)]
pub struct IfThenElse<T: ActiveFloat> {
    x: PayoffRef<T>,
    y: PayoffRef<T>,
    z: PayoffRef<T>,
    obs: f64,
}

impl<T: ActiveFloat> IfThenElse<T> {
    /// Selects `y` where `x` is non-zero and `z` elsewhere.
    pub fn new(x: PayoffRef<T>, y: PayoffRef<T>, z: PayoffRef<T>) -> Self {
        let obs = latest_observation(&[&x, &y, &z]);
        Self { x, y, z, obs }
    }
}

impl<T: ActiveFloat> Payoff<T> for IfThenElse<T> {
    fn observation_time(&self) -> f64 {
        self.obs
    }

    fn observation_times(&self) -> Vec<f64> {
        children_times(&[&self.x, &self.y, &self.z])
    }

    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        if self.x.value(path)? != T::zero() {
            self.y.value(path)
        } else {
            self.z.value(path)
        }
    }

    fn at(&self, t: f64) -> PayoffRef<T> {
        Arc::new(Self::new(self.x.at(t), self.y.at(t), self.z.at(t)))
    }
}
