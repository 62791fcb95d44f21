//! Read accessor for a single simulated path.
//!
//! [`Path`] is the only view payoffs get of a simulation. Each query looks
//! up the state at the requested time, evaluates the process's closed-form
//! formula on it and applies the matching adjuster.

use std::fmt;

use pricer_core::traits::{lift, ActiveFloat};

use super::error::SimulationError;
use super::simulation::McSimulation;

/// Which barrier levels are monitored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BarrierSide {
    /// Lower barrier only.
    Down,
    /// Upper barrier only.
    Up,
    /// Both barriers.
    Both,
}

impl BarrierSide {
    #[inline]
    fn watches_down(self) -> bool {
        matches!(self, Self::Down | Self::Both)
    }

    #[inline]
    fn watches_up(self) -> bool {
        matches!(self, Self::Up | Self::Both)
    }
}

/// Path `index` of a simulator.
#[derive(Clone, Copy)]
pub struct Path<'a, T: ActiveFloat> {
    sim: &'a McSimulation<T>,
    index: usize,
}

impl<T: ActiveFloat> fmt::Debug for Path<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Path")
            .field("simulation", &self.sim.id())
            .field("generation", &self.sim.generation())
            .field("index", &self.index)
            .finish()
    }
}

impl<'a, T: ActiveFloat> Path<'a, T> {
    /// Caller has bounds-checked `index`.
    pub(super) fn new(sim: &'a McSimulation<T>, index: usize) -> Self {
        Self { sim, index }
    }

    /// Path index.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Owning simulator.
    #[inline]
    pub fn simulation(&self) -> &'a McSimulation<T> {
        self.sim
    }

    /// Adjusted numeraire `N(t)`.
    pub fn numeraire(&self, t: f64) -> Result<T, SimulationError> {
        let state = self.sim.state(self.index, t)?;
        let raw = self.sim.process().numeraire(t, &state)?;
        Ok(raw * self.sim.numeraire_adjustment(t))
    }

    /// Adjusted zero bond `P(t, maturity)`.
    pub fn zero_bond(&self, t: f64, maturity: f64) -> Result<T, SimulationError> {
        let state = self.sim.state(self.index, t)?;
        let raw = self.sim.process().zero_bond(t, maturity, &state)?;
        Ok(raw * self.sim.zero_bond_adjustment(t, maturity))
    }

    /// Zero bond on the curve of `alias`.
    pub fn zero_bond_in(&self, t: f64, maturity: f64, alias: &str) -> Result<T, SimulationError> {
        let state = self.sim.state(self.index, t)?;
        let raw = self.sim.process().zero_bond_in(t, maturity, &state, alias)?;
        Ok(raw * self.sim.zero_bond_adjustment_in(t, maturity, alias))
    }

    /// Adjusted asset value.
    pub fn asset(&self, t: f64, alias: &str) -> Result<T, SimulationError> {
        let state = self.sim.state(self.index, t)?;
        let raw = self.sim.process().asset(t, &state, alias)?;
        Ok(raw + self.sim.asset_adjustment(t, alias))
    }

    /// Forward asset value for settlement at `settlement`.
    pub fn forward_asset(&self, t: f64, settlement: f64, alias: &str) -> Result<T, SimulationError> {
        let state = self.sim.state(self.index, t)?;
        Ok(self
            .sim
            .process()
            .forward_asset(t, settlement, &state, alias)?)
    }

    /// Futures price observed at `t` for settlement at `settlement`.
    pub fn future_asset(&self, t: f64, settlement: f64, alias: &str) -> Result<T, SimulationError> {
        let state = self.sim.state(self.index, t)?;
        Ok(self
            .sim
            .process()
            .future_asset(t, settlement, &state, alias)?)
    }

    /// Probability that the asset stayed strictly inside the barriers on
    /// `[t_start, t_end]`.
    ///
    /// Nodes are `t_start`, every observation time strictly inside the
    /// interval, and `t_end`. A node on or beyond a monitored barrier gives
    /// 0. Between nodes the Brownian-bridge crossing probability
    /// `exp(-2 ln(B/S₁) ln(B/S₂) / v)` with `v = (σ₁² + σ₂²)Δt/2` is summed
    /// over the monitored sides, capped at 1 and compounded.
    pub fn asset_barrier_no_hit(
        &self,
        t_start: f64,
        t_end: f64,
        down: f64,
        up: f64,
        side: BarrierSide,
        alias: &str,
    ) -> Result<T, SimulationError> {
        let mut nodes = vec![t_start];
        nodes.extend(
            self.sim
                .obs_times()
                .iter()
                .copied()
                .filter(|&t| t > t_start && t < t_end),
        );
        nodes.push(t_end);

        let process = self.sim.process();
        let (down_t, up_t): (T, T) = (lift(down), lift(up));
        let two = T::one() + T::one();

        let mut no_hit = T::one();
        let mut previous: Option<(f64, T, T)> = None;
        for &t in &nodes {
            let state = self.sim.state(self.index, t)?;
            let s = process.asset(t, &state, alias)? + self.sim.asset_adjustment(t, alias);
            if (side.watches_down() && s <= down_t) || (side.watches_up() && s >= up_t) {
                return Ok(T::zero());
            }
            let sigma = process.asset_volatility(t, &state, alias)?;

            if let Some((t_prev, s_prev, sigma_prev)) = previous {
                let variance = (sigma_prev * sigma_prev + sigma * sigma) * lift(t - t_prev) / two;
                if variance > T::zero() {
                    let crossing = |barrier: T| {
                        (-two * (barrier / s_prev).ln() * (barrier / s).ln() / variance).exp()
                    };
                    let mut hit = T::zero();
                    if side.watches_down() {
                        hit = hit + crossing(down_t);
                    }
                    if side.watches_up() {
                        hit = hit + crossing(up_t);
                    }
                    no_hit = no_hit * (T::one() - hit.min(T::one()));
                }
            }
            previous = Some((t, s, sigma));
        }
        Ok(no_hit)
    }
}
