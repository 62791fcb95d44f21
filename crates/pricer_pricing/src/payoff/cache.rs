//! Single-entry memo for shared sub-trees.

use std::sync::{Arc, Mutex, PoisonError};

use pricer_core::traits::ActiveFloat;

use super::{Payoff, PayoffRef};
use crate::mc::{Path, SimulationError};

/// Identifies one path of one simulation pass under one set of adjusters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PathKey {
    simulation: u64,
    generation: u64,
    adjusters: u64,
    path: usize,
}

impl PathKey {
    fn of<T: ActiveFloat>(path: &Path<'_, T>) -> Self {
        let sim = path.simulation();
        Self {
            simulation: sim.id(),
            generation: sim.generation(),
            adjusters: sim.adjuster_epoch(),
            path: path.index(),
        }
    }
}

/// Remembers the value of `x` on the last path it was evaluated on.
///
/// The key includes the simulation pass and the adjuster epoch, so
/// re-simulating, recalibrating or clearing adjusters invalidates the entry.
/// Errors are not cached.
///
/// The lock is released while `x` is evaluated. Workers pricing different
/// paths in parallel overwrite each other's entry; the memo only pays off
/// when the same tree reads `x` several times on one path.
#[derive(Debug)]
pub struct Cache<T: ActiveFloat> {
    x: PayoffRef<T>,
    last: Mutex<Option<(PathKey, T)>>,
}

impl<T: ActiveFloat> Cache<T> {
    /// Wraps `x`.
    pub fn new(x: PayoffRef<T>) -> Self {
        Self {
            x,
            last: Mutex::new(None),
        }
    }
}

impl<T: ActiveFloat> Payoff<T> for Cache<T> {
    fn observation_time(&self) -> f64 {
        self.x.observation_time()
    }

    fn observation_times(&self) -> Vec<f64> {
        self.x.observation_times()
    }

    fn value(&self, path: &Path<'_, T>) -> Result<T, SimulationError> {
        let key = PathKey::of(path);
        {
            let last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some((k, v)) = *last {
                if k == key {
                    return Ok(v);
                }
            }
        }
        let v = self.x.value(path)?;
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some((key, v));
        Ok(v)
    }

    fn at(&self, t: f64) -> PayoffRef<T> {
        Arc::new(Self::new(self.x.at(t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payoff::testing::deterministic_simulation;
    use std::fmt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts evaluations and returns the path index.
    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    impl fmt::Debug for Counting {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Counting")
        }
    }

    impl Payoff<f64> for Counting {
        fn observation_time(&self) -> f64 {
            1.0
        }
        fn value(&self, path: &Path<'_, f64>) -> Result<f64, SimulationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(path.index() as f64)
        }
        fn at(&self, _t: f64) -> PayoffRef<f64> {
            Arc::new(Counting {
                calls: self.calls.clone(),
            })
        }
    }

    #[test]
    fn test_cache_hits_on_same_path() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = Cache::new(Arc::new(Counting {
            calls: calls.clone(),
        }));
        let sim = deterministic_simulation(0.05, 0.0);

        let p0 = sim.path(0).unwrap();
        assert_eq!(cache.value(&p0).unwrap(), 0.0);
        assert_eq!(cache.value(&p0).unwrap(), 0.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let p1 = sim.path(1).unwrap();
        assert_eq!(cache.value(&p1).unwrap(), 1.0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cache_invalidated_by_resimulation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = Cache::new(Arc::new(Counting {
            calls: calls.clone(),
        }));
        let mut sim = deterministic_simulation(0.05, 0.0);

        cache.value(&sim.path(0).unwrap()).unwrap();
        sim.simulate();
        cache.value(&sim.path(0).unwrap()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cache_invalidated_by_adjusters() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = Cache::new(Arc::new(Counting {
            calls: calls.clone(),
        }));
        let mut sim = deterministic_simulation(0.05, 0.0);

        cache.value(&sim.path(0).unwrap()).unwrap();
        sim.calibrate_numeraire_adjuster(&[1.0, 2.0, 5.0]).unwrap();
        cache.value(&sim.path(0).unwrap()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        sim.calibrate_zero_bond_adjuster(&[1.0, 2.0], &[1.0, 3.0]).unwrap();
        cache.value(&sim.path(0).unwrap()).unwrap();
        sim.clear_adjusters();
        cache.value(&sim.path(0).unwrap()).unwrap();
        cache.value(&sim.path(0).unwrap()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(sim.adjuster_epoch(), 3);
    }

    #[test]
    fn test_cache_distinguishes_simulations() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = Cache::new(Arc::new(Counting {
            calls: calls.clone(),
        }));
        let a = deterministic_simulation(0.05, 0.0);
        let b = deterministic_simulation(0.05, 0.0);

        cache.value(&a.path(0).unwrap()).unwrap();
        cache.value(&b.path(0).unwrap()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.at(2.0).observation_time(), 1.0);
    }
}
