//! Arithmetic combinators.
//!
//! All values are undiscounted. Each node observes at the latest
//! observation time of its operands.

use std::sync::Arc;

use pricer_core::traits::ActiveFloat;

use super::{children_times, latest_observation, Payoff, PayoffRef};
use crate::mc::{Path, SimulationError};

/// `a·x + y`, with `y` optional.
#[derive(Clone, Debug)]
pub struct Axpy<T: ActiveFloat> {
    a: T,
    x: PayoffRef<T>,
    y: Option<PayoffRef<T>>,
    obs: f64,
}

impl<T: ActiveFloat> Axpy<T> {
    /// Creates `a·x + y`.
    pub fn new(a: T, x: PayoffRef<T>, y: Option<PayoffRef<T>>) -> Self {
        let obs = match &y {
            Some(y) => latest_observation(&[&x, y]),
            None => x.observation_time(),
        };
        Self { a, x, y, obs }
    }
}

impl<T: ActiveFloat> Payoff<T> for Axpy<T> {
    fn observation_time(&self) -> f64 {
        self.obs
    }

    fn observation_times(&self) -> Vec<f64> {
        match &self.y {
            Some(y) => children_times(&[&self.x, y]),
            None => self.x.observation_times(),
        }
    }

    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        let ax = self.a * self.x.value(path)?;
        match &self.y {
            Some(y) => Ok(ax + y.value(path)?),
            None => Ok(ax),
        }
    }

    fn at(&self, t: f64) -> PayoffRef<T> {
        Arc::new(Self::new(
            self.a,
            self.x.at(t),
            self.y.as_ref().map(|y| y.at(t)),
        ))
    }
}

macro_rules! binary_node {
    ($(#[$doc:meta])* $name:ident, |$x:ident, $y:ident| $body:expr) => {
        $(#[$doc])*
        #[derive(Clone, Debug)]
        pub struct $name<T: ActiveFloat> {
            x: PayoffRef<T>,
            y: PayoffRef<T>,
            obs: f64,
        }

        impl<T: ActiveFloat> $name<T> {
            /// Combines two operands.
            pub fn new(x: PayoffRef<T>, y: PayoffRef<T>) -> Self {
                let obs = latest_observation(&[&x, &y]);
                Self { x, y, obs }
            }
        }

        impl<T: ActiveFloat> Payoff<T> for $name<T> {
            fn observation_time(&self) -> f64 {
                self.obs
            }

            fn observation_times(&self) -> Vec<f64> {
                children_times(&[&self.x, &self.y])
            }

            fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
                let $x = self.x.value(path)?;
                let $y = self.y.value(path)?;
                Ok($body)
            }

            fn at(&self, t: f64) -> PayoffRef<T> {
                Arc::new(Self::new(self.x.at(t), self.y.at(t)))
            }
        }
    };
}

macro_rules! unary_node {
    ($(#[$doc:meta])* $name:ident, |$x:ident| $body:expr) => {
        $(#[$doc])*
        #[derive(Clone, Debug)]
        pub struct $name<T: ActiveFloat> {
            x: PayoffRef<T>,
        }

        impl<T: ActiveFloat> $name<T> {
            /// Wraps the operand.
            pub fn new(x: PayoffRef<T>) -> Self {
                Self { x }
            }
        }

        impl<T: ActiveFloat> Payoff<T> for $name<T> {
            fn observation_time(&self) -> f64 {
                self.x.observation_time()
            }

            fn observation_times(&self) -> Vec<f64> {
                self.x.observation_times()
            }

            fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
                let $x = self.x.value(path)?;
                Ok($body)
            }

            fn at(&self, t: f64) -> PayoffRef<T> {
                Arc::new(Self::new(self.x.at(t)))
            }
        }
    };
}

binary_node!(
    /// `x · y`.
    Mult,
    |x, y| x * y
);
binary_node!(
    /// `x / y`.
    Division,
    |x, y| x / y
);
binary_node!(
    /// `max(x, y)`.
    Max,
    |x, y| if x > y { x } else { y }
);
binary_node!(
    /// `min(x, y)`.
    Min,
    |x, y| if x < y { x } else { y }
);

unary_node!(
    /// `exp(x)`.
    Exponential,
    |x| x.exp()
);
unary_node!(
    /// `ln(x)`.
    Logarithm,
    |x| x.ln()
);
unary_node!(
    /// `√x`.
    Squareroot,
    |x| x.sqrt()
);
