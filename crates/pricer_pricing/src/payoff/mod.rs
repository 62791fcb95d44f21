//! Payoff algebra evaluated over simulated paths.
//!
//! A payoff is a tree of [`Payoff`] nodes shared through [`PayoffRef`].
//! Every node knows
//!
//! - its nominal observation time (the discounting date)
//! - every time its subtree reads from the path
//! - its undiscounted value on a [`Path`]
//! - how to re-anchor itself at another observation time ([`Payoff::at`])
//!
//! # Node catalogue
//!
//! | Module | Nodes |
//! |--------|-------|
//! | [`basic`] | `FixedAmount`, `Redated`, `Pay`, `Cash`, `ZeroBond`, `Asset`, `AssetBarrierNoHit`, `VanillaOption` |
//! | [`arithmetic`] | `Axpy`, `Mult`, `Division`, `Max`, `Min`, `Exponential`, `Logarithm`, `Squareroot` |
//! | [`logical`] | `Logical`, `IfThenElse` |
//! | [`basket`] | `Basket` |
//! | [`cache`] | `Cache` |
//! | [`rates`] | `GeneralSwaption`, `SwapRate`, `LiborRate`, `CashFlow`, `Annuity`, `ModelSwaption`, correlations, legs |
//!
//! # Re-anchoring
//!
//! Combinators observe at the latest observation time of their children and
//! re-anchor every child. `Pay` and `CashFlow` keep their payment date and
//! `FixedAmount` is always observed today.
//! Index nodes (`SwapRate`, `LiborRate`) shift their schedule with the
//! fixing; product nodes keep theirs.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use pricer_pricing::payoff::{Axpy, FixedAmount, Payoff, PayoffRef, VanillaOption, CallPut};
//!
//! let call: PayoffRef<f64> = Arc::new(VanillaOption::new(1.0, "SPX", 100.0, CallPut::Call));
//! let bonus: PayoffRef<f64> = Arc::new(FixedAmount::new(5.0));
//! let total = Axpy::new(2.0, call, Some(bonus));
//! assert_eq!(total.observation_times(), vec![0.0, 1.0]);
//!
//! assert_eq!(total.observation_time(), 1.0);
//! assert_eq!(total.at(0.5).observation_time(), 0.5);
//! ```

use std::fmt;
use std::sync::Arc;

use pricer_core::traits::ActiveFloat;

use crate::mc::{Path, SimulationError};

pub mod arithmetic;
pub mod basic;
pub mod basket;
pub mod cache;
pub mod logical;
pub mod rates;

pub use arithmetic::{Axpy, Division, Exponential, Logarithm, Max, Min, Mult, Squareroot};
pub use basic::{
    Asset, AssetBarrierNoHit, CallPut, Cash, FixedAmount, Pay, Redated, VanillaOption, ZeroBond,
};
pub use basket::Basket;
pub use cache::Cache;
pub use logical::{IfThenElse, Logical, LogicalOp};
pub use rates::{
    Annuity, CancellableNote, CashFlow, ForwardRateCorrelation, GeneralSwaption, Leg, LiborRate,
    ModelCorrelation, ModelSwaption, Swap, SwapRate,
};

/// A node of a payoff tree.
///
/// Nodes are immutable once built and shared across pricing workers.
pub trait Payoff<T: ActiveFloat>: Send + Sync + fmt::Debug {
    /// Nominal observation (and discounting) time.
    fn observation_time(&self) -> f64;

    /// Every time this subtree reads, ascending and without duplicates.
    fn observation_times(&self) -> Vec<f64> {
        vec![self.observation_time()]
    }

    /// Undiscounted value on `path`.
    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError>;

    /// Value deflated by the numeraire at the observation time.
    fn discounted_value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        Ok(self.value(path)? / path.numeraire(self.observation_time())?)
    }

    /// Copy of this node observed at `t`.
    fn at(&self, t: f64) -> PayoffRef<T>;
}

/// Shared payoff node.
pub type PayoffRef<T> = Arc<dyn Payoff<T>>;

/// Sorted union of two time sets.
pub fn union_times(mut a: Vec<f64>, b: &[f64]) -> Vec<f64> {
    a.extend_from_slice(b);
    a.sort_by(f64::total_cmp);
    a.dedup();
    a
}

/// Union of the observation times of several nodes.
pub fn children_times<T: ActiveFloat>(children: &[&PayoffRef<T>]) -> Vec<f64> {
    children
        .iter()
        .fold(Vec::new(), |acc, x| union_times(acc, &x.observation_times()))
}

/// Latest observation time among `children` (0 for none).
pub fn latest_observation<T: ActiveFloat>(children: &[&PayoffRef<T>]) -> f64 {
    children
        .iter()
        .map(|x| x.observation_time())
        .fold(0.0, f64::max)
}
