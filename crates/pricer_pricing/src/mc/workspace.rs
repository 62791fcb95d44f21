//! Pre-sized storage arena for simulated paths.
//!
//! This module provides [`PathWorkspace`], which owns the state table and the
//! optional Brownian increment table of a simulator.
//!
//! # Memory Layout
//!
//! Both buffers use path-major contiguous layout:
//! - `states`: n_paths × n_obs × size (one state vector per observation time)
//! - `brownians`: n_paths × n_steps × draws_per_step (standard normals)
//!
//! where `draws_per_step` is `factors` for plain stepping and `2 × factors`
//! with Richardson extrapolation. Simulation-only grid points have no row in
//! `states`.

use num_traits::Zero;

/// Path-major storage for states and increments.
///
/// All allocation happens in [`new`](Self::new) and
/// [`allocate_brownians`](Self::allocate_brownians); simulation writes into
/// the existing buffers.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::PathWorkspace;
///
/// let mut workspace: PathWorkspace<f64> = PathWorkspace::new(100, 4, 2);
/// assert_eq!(workspace.path_stride(), 8);
///
/// workspace.path_mut(3)[0] = 1.5;
/// assert_eq!(workspace.state(3, 0)[0], 1.5);
/// ```
#[derive(Clone, Debug)]
pub struct PathWorkspace<T> {
    /// Observed states (n_paths × n_obs × size).
    states: Vec<T>,
    /// Stored standard normal increments, if any.
    brownians: Option<Vec<f64>>,
    n_paths: usize,
    n_obs: usize,
    size: usize,
    draws_per_path: usize,
}

impl<T: Copy + Zero> PathWorkspace<T> {
    /// Allocates a zeroed state table.
    ///
    /// # Arguments
    ///
    /// * `n_paths` - Number of paths
    /// * `n_obs` - Number of observation times (including 0)
    /// * `size` - State vector dimension
    pub fn new(n_paths: usize, n_obs: usize, size: usize) -> Self {
        Self {
            states: vec![T::zero(); n_paths * n_obs * size],
            brownians: None,
            n_paths,
            n_obs,
            size,
            draws_per_path: 0,
        }
    }

    /// Number of paths.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Number of observation rows per path.
    #[inline]
    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    /// State vector dimension.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of `T` values per path in the state table.
    #[inline]
    pub fn path_stride(&self) -> usize {
        self.n_obs * self.size
    }

    /// State of `path` at observation `obs`.
    ///
    /// Indices are not validated here; callers bounds-check first.
    #[inline]
    pub fn state(&self, path: usize, obs: usize) -> &[T] {
        let start = (path * self.n_obs + obs) * self.size;
        &self.states[start..start + self.size]
    }

    /// All observed states of one path.
    #[inline]
    pub fn path(&self, path: usize) -> &[T] {
        let stride = self.path_stride();
        &self.states[path * stride..(path + 1) * stride]
    }

    /// Mutable view of one path's observed states.
    #[inline]
    pub fn path_mut(&mut self, path: usize) -> &mut [T] {
        let stride = self.path_stride();
        &mut self.states[path * stride..(path + 1) * stride]
    }

    /// The whole state table.
    #[inline]
    pub fn states(&self) -> &[T] {
        &self.states
    }

    /// Mutable state table.
    #[inline]
    pub fn states_mut(&mut self) -> &mut [T] {
        &mut self.states
    }

    /// Allocates the Brownian table with `draws_per_path` values per path.
    ///
    /// An existing table of the same shape is kept as is.
    pub fn allocate_brownians(&mut self, draws_per_path: usize) {
        let len = self.n_paths * draws_per_path;
        match &self.brownians {
            Some(table) if table.len() == len && self.draws_per_path == draws_per_path => {}
            _ => {
                self.brownians = Some(vec![0.0; len]);
                self.draws_per_path = draws_per_path;
            }
        }
    }

    /// Whether a Brownian table is allocated.
    #[inline]
    pub fn has_brownians(&self) -> bool {
        self.brownians.is_some()
    }

    /// Number of stored increments per path (0 without a table).
    #[inline]
    pub fn draws_per_path(&self) -> usize {
        self.draws_per_path
    }

    /// Stored increments of one path.
    pub fn brownians(&self, path: usize) -> Option<&[f64]> {
        let per = self.draws_per_path;
        self.brownians
            .as_deref()
            .map(|table| &table[path * per..(path + 1) * per])
    }

    /// Mutable Brownian table.
    #[inline]
    pub fn brownians_mut(&mut self) -> Option<&mut [f64]> {
        self.brownians.as_deref_mut()
    }

    /// Splits into the mutable state table and the shared Brownian table.
    #[inline]
    pub fn split_mut(&mut self) -> (&mut [T], Option<&[f64]>) {
        (&mut self.states, self.brownians.as_deref())
    }

    /// Zeroes the state table, keeping the increments.
    pub fn clear_states(&mut self) {
        self.states.iter_mut().for_each(|x| *x = T::zero());
    }

    /// Memory held by both tables in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.states.len() * std::mem::size_of::<T>()
            + self.brownians.as_ref().map_or(0, |b| b.len() * 8)
    }
}
