//! Path simulator for generic stochastic processes.
//!
//! [`McSimulation`] integrates a [`StochasticProcess`] over a merged
//! [`TimeGrid`], stores one state vector per path and observation time in a
//! [`PathWorkspace`], and serves per-path state queries to [`Path`] and the
//! adjuster calibration.
//!
//! # Random numbers
//!
//! Path `k` owns the stream `PricerRng::for_path(seed, k)`. Each step draws
//! `factors` normals, or two such vectors `(a, b)` with Richardson
//! extrapolation. Stored increments are produced by the same streams, so
//! full, sliced, stored and live simulation all yield identical paths.
//!
//! # Lifecycle
//!
//! ```text
//! Configured --simulate()--> Simulated --simulate()--> Simulated
//!      \                        |
//!       +--prepare_sliced()--> Sliced { next } --simulate_slice(next)--> Sliced { next + 1 }
//! ```
//!
//! Adjuster tables survive `simulate()`; the interpolation cache does not.

use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;
use std::ops::{Deref, Range};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use pricer_core::traits::{lift, ActiveFloat};
use pricer_models::models::StochasticProcess;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::adjusters::Adjusters;
use super::config::SimulationConfig;
use super::error::SimulationError;
use super::path::Path;
use super::time_grid::TimeGrid;
use super::workspace::PathWorkspace;
use crate::rng::PricerRng;

static NEXT_SIMULATION_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle phase of a simulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Grid built and storage allocated; no states yet.
    Configured,
    /// All paths populated by [`McSimulation::simulate`].
    Simulated,
    /// Paths advanced slice by slice.
    Sliced {
        /// Next observation index to populate.
        next: usize,
    },
}

/// State vector returned by [`McSimulation::state`].
///
/// Dereferences to `[T]` of length `process.size()`.
#[derive(Clone, Debug)]
pub enum StateRef<'a, T> {
    /// Row of the stored state table.
    Stored(&'a [T]),
    /// Row of a cached interpolated slab shared by all paths.
    Interpolated {
        /// States of every path at the interpolated time.
        slab: Arc<[T]>,
        /// This path's row within `slab`.
        range: Range<usize>,
    },
}

impl<T> Deref for StateRef<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        match self {
            Self::Stored(row) => row,
            Self::Interpolated { slab, range } => &slab[range.clone()],
        }
    }
}

/// Monte Carlo path simulator.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// use pricer_core::market_data::curves::FlatCurve;
/// use pricer_models::models::rates::HullWhiteProcess;
/// use pricer_pricing::mc::{McSimulation, SimulationConfig};
///
/// let process = HullWhiteProcess::new(0.1, 0.01, FlatCurve::new(0.03)).unwrap();
/// let config = SimulationConfig::builder().n_paths(256).seed(42).build().unwrap();
///
/// let mut sim: McSimulation<f64> =
///     McSimulation::new(Arc::new(process), &[0.0, 1.0, 2.0], &[1.0, 2.0], config).unwrap();
/// sim.simulate();
///
/// let x = sim.state(0, 2.0).unwrap();
/// assert_eq!(x.len(), 2);
/// ```
pub struct McSimulation<T: ActiveFloat> {
    process: Arc<dyn StochasticProcess<T>>,
    config: SimulationConfig,
    grid: TimeGrid,
    workspace: PathWorkspace<T>,
    initial_values: Vec<T>,
    phase: Phase,
    id: u64,
    generation: u64,
    truncations: usize,
    brownians_ready: bool,
    slice_rngs: Vec<PricerRng>,
    interpolated: RwLock<Vec<(f64, Arc<[T]>)>>,
    pub(super) adjusters: Adjusters<T>,
    pub(super) adjuster_epoch: u64,
}

impl<T: ActiveFloat> McSimulation<T> {
    /// Builds the grid and allocates the state table.
    ///
    /// # Errors
    ///
    /// - `SimulationError::Config` for an invalid configuration or time grid
    /// - `SimulationError::DimensionMismatch` if the process reports an
    ///   inconsistent size, factor count or initial state
    pub fn new(
        process: Arc<dyn StochasticProcess<T>>,
        sim_times: &[f64],
        obs_times: &[f64],
        config: SimulationConfig,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let grid = TimeGrid::new(sim_times, obs_times)?;

        let size = process.size();
        if size == 0 {
            return Err(SimulationError::DimensionMismatch {
                what: "state size",
                expected: 1,
                got: 0,
            });
        }
        let factors = process.factors();
        if factors == 0 || factors > size {
            return Err(SimulationError::DimensionMismatch {
                what: "factors",
                expected: size,
                got: factors,
            });
        }
        let initial_values = process.initial_values();
        if initial_values.len() != size {
            return Err(SimulationError::DimensionMismatch {
                what: "initial values",
                expected: size,
                got: initial_values.len(),
            });
        }

        debug!(
            model = process.model_name(),
            n_sim = grid.sim_times().len(),
            n_obs = grid.n_obs(),
            "time grid merged"
        );

        let workspace = PathWorkspace::new(config.n_paths(), grid.n_obs(), size);

        Ok(Self {
            process,
            config,
            grid,
            workspace,
            initial_values,
            phase: Phase::Configured,
            id: NEXT_SIMULATION_ID.fetch_add(1, Ordering::Relaxed),
            generation: 0,
            truncations: 0,
            brownians_ready: false,
            slice_rngs: Vec::new(),
            interpolated: RwLock::new(Vec::new()),
            adjusters: Adjusters::default(),
            adjuster_epoch: 0,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The simulated process.
    #[inline]
    pub fn process(&self) -> &Arc<dyn StochasticProcess<T>> {
        &self.process
    }

    /// Configuration the simulator was built with.
    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Merged time grid.
    #[inline]
    pub fn time_grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Integration times, starting at 0.
    #[inline]
    pub fn sim_times(&self) -> &[f64] {
        self.grid.sim_times()
    }

    /// Observation times, starting at 0.
    #[inline]
    pub fn obs_times(&self) -> &[f64] {
        self.grid.obs_times()
    }

    /// Number of paths.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.config.n_paths()
    }

    /// Current lifecycle phase.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Process-unique simulator id.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Incremented every time the state table is (re)populated.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Incremented every time an adjuster table is calibrated or cleared.
    #[inline]
    pub fn adjuster_epoch(&self) -> u64 {
        self.adjuster_epoch
    }

    /// Number of truncated steps in the last population pass.
    #[inline]
    pub fn truncations(&self) -> usize {
        self.truncations
    }

    /// Initial state of every path.
    #[inline]
    pub fn initial_values(&self) -> &[T] {
        &self.initial_values
    }

    /// Stored Brownian increments of one path, if increments are kept.
    pub fn brownians(&self, path: usize) -> Result<Option<&[f64]>, SimulationError> {
        self.check_path(path)?;
        if !self.brownians_ready {
            return Ok(None);
        }
        Ok(self.workspace.brownians(path))
    }

    /// Normal draws consumed per integration step.
    #[inline]
    pub fn draws_per_step(&self) -> usize {
        let factors = self.process.factors();
        if self.config.richardson() {
            2 * factors
        } else {
            factors
        }
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    /// Populates every path on the full grid.
    ///
    /// Truncated steps are counted and reported, never raised.
    #[tracing::instrument(skip_all, fields(model = self.process.model_name(), n_paths = self.config.n_paths()))]
    pub fn simulate(&mut self) {
        if self.config.store_brownians() {
            self.ensure_brownians();
        }

        let process = self.process.as_ref();
        let grid = &self.grid;
        let x0 = self.initial_values.as_slice();
        let richardson = self.config.richardson();
        let seed = self.config.seed();
        let size = x0.len();
        let draws = self.draws_per_step_for(process.factors());
        let stride = self.workspace.path_stride();
        let per_path = self.workspace.draws_per_path();
        let ready = self.brownians_ready;
        let (states, brownians) = self.workspace.split_mut();
        let brownians = brownians.filter(|_| ready);

        let truncations: usize = states
            .par_chunks_mut(stride)
            .enumerate()
            .map_init(
                || Stepper::new(size, draws),
                |stepper, (k, out)| match brownians {
                    Some(table) => {
                        let mut source = Increments::Stored(&table[k * per_path..(k + 1) * per_path]);
                        stepper.run_path(process, grid, x0, richardson, &mut source, out)
                    }
                    None => {
                        let mut rng = PricerRng::for_path(seed, k);
                        let mut source = Increments::Live(&mut rng);
                        stepper.run_path(process, grid, x0, richardson, &mut source, out)
                    }
                },
            )
            .sum();

        self.finish_pass(truncations, true);
        self.phase = Phase::Simulated;
        info!(
            n_paths = self.config.n_paths(),
            n_steps = self.grid.n_steps(),
            generation = self.generation,
            "simulation complete"
        );
    }

    /// Switches to sliced mode.
    ///
    /// Allocates the Brownian table or one generator per path and resets the
    /// slice cursor to 0.
    ///
    /// # Errors
    ///
    /// `SimulationError::SlicedModeUnavailable` unless every simulation time
    /// is an observation time.
    pub fn prepare_sliced(&mut self) -> Result<(), SimulationError> {
        if !self.grid.is_aligned() {
            return Err(SimulationError::SlicedModeUnavailable(
                "simulation times must equal observation times".to_string(),
            ));
        }
        if self.config.store_brownians() {
            self.ensure_brownians();
            self.slice_rngs.clear();
        } else {
            self.reset_slice_rngs();
        }
        self.phase = Phase::Sliced { next: 0 };
        debug!(n_obs = self.grid.n_obs(), "sliced simulation prepared");
        Ok(())
    }

    /// Populates observation `idx` of every path.
    ///
    /// `idx == 0` writes the initial state (and rewinds the generators);
    /// `idx > 0` advances from observation `idx - 1`. With stored increments
    /// any already populated slice may be recomputed; otherwise slices must
    /// run in order.
    ///
    /// # Errors
    ///
    /// - `SlicedModeUnavailable` if [`prepare_sliced`](Self::prepare_sliced)
    ///   has not been called
    /// - `ObservationOutOfRange` if `idx` is beyond the grid
    /// - `SliceOutOfOrder` if `idx` skips ahead, or repeats without stored
    ///   increments
    pub fn simulate_slice(
        &mut self,
        idx: usize,
        clear_interpolation: bool,
    ) -> Result<(), SimulationError> {
        let next = match self.phase {
            Phase::Sliced { next } => next,
            _ => {
                return Err(SimulationError::SlicedModeUnavailable(
                    "prepare_sliced() has not been called".to_string(),
                ))
            }
        };
        let n_obs = self.grid.n_obs();
        if idx >= n_obs {
            return Err(SimulationError::ObservationOutOfRange { index: idx, n_obs });
        }
        let stored = self.brownians_ready;
        if idx > next || (!stored && idx != next && idx != 0) {
            return Err(SimulationError::SliceOutOfOrder {
                requested: idx,
                expected: next,
            });
        }

        let truncations = if idx == 0 {
            let x0 = self.initial_values.as_slice();
            let size = x0.len();
            let stride = self.workspace.path_stride();
            self.workspace
                .states_mut()
                .par_chunks_mut(stride)
                .for_each(|out| out[..size].copy_from_slice(x0));
            if !stored {
                self.reset_slice_rngs();
            }
            0
        } else {
            self.advance_slice(idx)
        };

        self.truncations = if idx == 0 {
            0
        } else {
            self.truncations + truncations
        };
        self.generation += 1;
        if clear_interpolation {
            self.clear_interpolation_cache();
        }
        if truncations > 0 {
            warn!(truncations, slice = idx, "state truncated during sliced simulation");
        }
        self.phase = Phase::Sliced { next: idx + 1 };
        Ok(())
    }

    fn advance_slice(&mut self, idx: usize) -> usize {
        let process = self.process.as_ref();
        let obs = self.grid.obs_times();
        let t0 = obs[idx - 1];
        let dt = obs[idx] - t0;
        let richardson = self.config.richardson();
        let size = self.initial_values.len();
        let draws = self.draws_per_step_for(process.factors());
        let stride = self.workspace.path_stride();
        let per_path = self.workspace.draws_per_path();
        let ready = self.brownians_ready;
        let (states, brownians) = self.workspace.split_mut();

        match brownians.filter(|_| ready) {
            Some(table) => states
                .par_chunks_mut(stride)
                .enumerate()
                .map_init(
                    || Stepper::new(size, draws),
                    |stepper, (k, out)| {
                        let mut source =
                            Increments::Stored(&table[k * per_path..(k + 1) * per_path]);
                        stepper.run_slice(process, idx, t0, dt, richardson, &mut source, out)
                    },
                )
                .sum(),
            None => states
                .par_chunks_mut(stride)
                .zip(self.slice_rngs.par_iter_mut())
                .map_init(
                    || Stepper::new(size, draws),
                    |stepper, (out, rng)| {
                        let mut source = Increments::Live(rng);
                        stepper.run_slice(process, idx, t0, dt, richardson, &mut source, out)
                    },
                )
                .sum(),
        }
    }

    fn finish_pass(&mut self, truncations: usize, clear_cache: bool) {
        self.truncations = truncations;
        self.generation += 1;
        if clear_cache {
            self.clear_interpolation_cache();
        }
        if truncations > 0 {
            warn!(truncations, "state truncated during simulation");
        }
    }

    fn draws_per_step_for(&self, factors: usize) -> usize {
        if self.config.richardson() {
            2 * factors
        } else {
            factors
        }
    }

    fn reset_slice_rngs(&mut self) {
        let seed = self.config.seed();
        self.slice_rngs = (0..self.config.n_paths())
            .map(|k| PricerRng::for_path(seed, k))
            .collect();
    }

    fn ensure_brownians(&mut self) {
        if self.brownians_ready {
            return;
        }
        let per_path = self.grid.n_steps() * self.draws_per_step();
        let seed = self.config.seed();
        self.workspace.allocate_brownians(per_path);
        if per_path > 0 {
            if let Some(table) = self.workspace.brownians_mut() {
                table
                    .par_chunks_mut(per_path)
                    .enumerate()
                    .for_each(|(k, chunk)| PricerRng::for_path(seed, k).fill_normal(chunk));
            }
        }
        self.brownians_ready = true;
        debug!(
            per_path,
            bytes = self.workspace.memory_bytes(),
            "brownian increments generated"
        );
    }

    // ========================================================================
    // State queries
    // ========================================================================

    fn check_path(&self, path: usize) -> Result<(), SimulationError> {
        let n_paths = self.config.n_paths();
        if path >= n_paths {
            return Err(SimulationError::PathOutOfRange {
                index: path,
                n_paths,
            });
        }
        Ok(())
    }

    fn check_populated(&self) -> Result<(), SimulationError> {
        match self.phase {
            Phase::Configured => Err(SimulationError::NotSimulated),
            _ => Ok(()),
        }
    }

    /// Stored state of `path` at observation index `idx`.
    ///
    /// # Errors
    ///
    /// `NotSimulated`, `PathOutOfRange` or `ObservationOutOfRange`.
    pub fn observation(&self, path: usize, idx: usize) -> Result<&[T], SimulationError> {
        self.check_populated()?;
        self.check_path(path)?;
        let n_obs = self.grid.n_obs();
        if idx >= n_obs {
            return Err(SimulationError::ObservationOutOfRange { index: idx, n_obs });
        }
        Ok(self.workspace.state(path, idx))
    }

    /// State of `path` at time `t`.
    ///
    /// Observation times return the stored row. Other times require time
    /// interpolation: flat before 0 and after the last observation, linear
    /// in between. Interpolated states are computed for all paths at once
    /// and cached until the next population pass.
    ///
    /// # Errors
    ///
    /// `NotSimulated`, `PathOutOfRange`, or `InterpolationDisabled` for an
    /// off-grid `t` without time interpolation.
    pub fn state(&self, path: usize, t: f64) -> Result<StateRef<'_, T>, SimulationError> {
        self.check_populated()?;
        self.check_path(path)?;

        let obs = self.grid.obs_times();
        let i = obs.partition_point(|&s| s < t);
        if i < obs.len() && obs[i] == t {
            return Ok(StateRef::Stored(self.workspace.state(path, i)));
        }
        if !self.config.time_interpolation() {
            return Err(SimulationError::InterpolationDisabled { t });
        }
        if i == 0 {
            return Ok(StateRef::Stored(self.workspace.state(path, 0)));
        }
        if i == obs.len() {
            return Ok(StateRef::Stored(self.workspace.state(path, obs.len() - 1)));
        }

        let size = self.workspace.size();
        let range = path * size..(path + 1) * size;
        let slab = self.interpolated_slab(t, i)?;
        Ok(StateRef::Interpolated { slab, range })
    }

    fn interpolated_slab(&self, t: f64, upper: usize) -> Result<Arc<[T]>, SimulationError> {
        {
            let cache = self.interpolated.read().unwrap_or_else(PoisonError::into_inner);
            let j = cache.partition_point(|(s, _)| *s < t);
            if let Some((s, slab)) = cache.get(j) {
                if *s == t {
                    return Ok(Arc::clone(slab));
                }
            }
        }

        let obs = self.grid.obs_times();
        let (t0, t1) = (obs[upper - 1], obs[upper]);
        let rho: T = lift((t - t0) / (t1 - t0));
        let one_minus = T::one() - rho;
        let size = self.workspace.size();

        let mut values = vec![T::zero(); self.config.n_paths() * size];
        values
            .par_chunks_mut(size)
            .enumerate()
            .for_each(|(k, row)| {
                let lo = self.workspace.state(k, upper - 1);
                let hi = self.workspace.state(k, upper);
                for ((x, &a), &b) in row.iter_mut().zip(lo).zip(hi) {
                    *x = one_minus * a + rho * b;
                }
            });
        let slab: Arc<[T]> = Arc::from(values);

        let mut cache = self.interpolated.write().unwrap_or_else(PoisonError::into_inner);
        let j = cache.partition_point(|(s, _)| *s < t);
        match cache.get(j) {
            Some((s, existing)) if *s == t => Ok(Arc::clone(existing)),
            _ => {
                cache.insert(j, (t, Arc::clone(&slab)));
                Ok(slab)
            }
        }
    }

    /// Populates the interpolation cache for every off-grid time in `times`.
    ///
    /// A no-op without time interpolation. Called before parallel payoff
    /// evaluation so that workers only read the cache.
    pub fn prepare_times(&self, times: &[f64]) -> Result<(), SimulationError> {
        if !self.config.time_interpolation() {
            return Ok(());
        }
        for &t in times {
            self.state(0, t)?;
        }
        Ok(())
    }

    /// Drops every cached interpolated state.
    pub fn clear_interpolation_cache(&self) {
        self.interpolated
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached interpolation times.
    pub fn interpolation_cache_len(&self) -> usize {
        self.interpolated
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Read accessor for path `k`.
    ///
    /// # Errors
    ///
    /// `NotSimulated` or `PathOutOfRange`.
    pub fn path(&self, k: usize) -> Result<Path<'_, T>, SimulationError> {
        self.check_populated()?;
        self.check_path(k)?;
        Ok(Path::new(self, k))
    }
}

impl<T: ActiveFloat> fmt::Debug for McSimulation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("McSimulation")
            .field("model", &self.process.model_name())
            .field("config", &self.config)
            .field("n_sim", &self.grid.sim_times().len())
            .field("n_obs", &self.grid.n_obs())
            .field("phase", &self.phase)
            .field("id", &self.id)
            .field("generation", &self.generation)
            .finish()
    }
}

// ============================================================================
// Per-path stepping
// ============================================================================

enum Increments<'a> {
    Stored(&'a [f64]),
    Live(&'a mut PricerRng),
}

/// Scratch buffers reused by one worker across paths.
struct Stepper<T> {
    x: Vec<T>,
    next: Vec<T>,
    full: Vec<T>,
    half: Vec<T>,
    dw: Vec<f64>,
    dw_full: Vec<f64>,
}

impl<T: ActiveFloat> Stepper<T> {
    fn new(size: usize, draws: usize) -> Self {
        Self {
            x: vec![T::zero(); size],
            next: vec![T::zero(); size],
            full: vec![T::zero(); size],
            half: vec![T::zero(); size],
            dw: vec![0.0; draws],
            dw_full: vec![0.0; draws / 2],
        }
    }

    fn draw(&mut self, source: &mut Increments<'_>, step: usize) {
        let n = self.dw.len();
        match source {
            Increments::Stored(table) => self.dw.copy_from_slice(&table[step * n..(step + 1) * n]),
            Increments::Live(rng) => rng.fill_normal(&mut self.dw),
        }
    }

    /// Moves `self.x` from `t0` to `t0 + dt`; returns whether truncation fired.
    fn advance(
        &mut self,
        process: &dyn StochasticProcess<T>,
        t0: f64,
        dt: f64,
        richardson: bool,
    ) -> bool {
        if richardson {
            let factors = self.dw_full.len();
            let (a, b) = self.dw.split_at(factors);
            for ((w, &wa), &wb) in self.dw_full.iter_mut().zip(a).zip(b) {
                *w = (wa + wb) * FRAC_1_SQRT_2;
            }
            let half_dt = 0.5 * dt;
            process.evolve(t0, &self.x, dt, &self.dw_full, &mut self.full);
            process.evolve(t0, &self.x, half_dt, a, &mut self.half);
            process.evolve(t0 + half_dt, &self.half, half_dt, b, &mut self.next);
            let two = T::one() + T::one();
            for (n, &f) in self.next.iter_mut().zip(&self.full) {
                *n = two * *n - f;
            }
        } else {
            process.evolve(t0, &self.x, dt, &self.dw, &mut self.next);
        }
        let truncated = process.truncate(t0 + dt, &mut self.next);
        std::mem::swap(&mut self.x, &mut self.next);
        truncated
    }

    fn run_path(
        &mut self,
        process: &dyn StochasticProcess<T>,
        grid: &TimeGrid,
        x0: &[T],
        richardson: bool,
        source: &mut Increments<'_>,
        out: &mut [T],
    ) -> usize {
        let size = x0.len();
        let sims = grid.sim_times();
        self.x.copy_from_slice(x0);
        out[..size].copy_from_slice(x0);

        let mut truncations = 0;
        for step in 1..sims.len() {
            let t0 = sims[step - 1];
            self.draw(source, step - 1);
            if self.advance(process, t0, sims[step] - t0, richardson) {
                truncations += 1;
            }
            if let Some(k) = grid.store_index(step) {
                out[k * size..(k + 1) * size].copy_from_slice(&self.x);
            }
        }
        truncations
    }

    #[allow(clippy::too_many_arguments)]
    fn run_slice(
        &mut self,
        process: &dyn StochasticProcess<T>,
        idx: usize,
        t0: f64,
        dt: f64,
        richardson: bool,
        source: &mut Increments<'_>,
        out: &mut [T],
    ) -> usize {
        let size = self.x.len();
        self.x.copy_from_slice(&out[(idx - 1) * size..idx * size]);
        self.draw(source, idx - 1);
        let truncated = self.advance(process, t0, dt, richardson);
        out[idx * size..(idx + 1) * size].copy_from_slice(&self.x);
        usize::from(truncated)
    }
}
