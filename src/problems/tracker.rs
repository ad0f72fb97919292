use crate::core::Solution;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Fitness distance from the optimum that counts as converged
pub const CONVERGENCE_TOLERANCE: f64 = 0.001;

#[derive(Debug)]
struct Latches {
    least_call: u64,
    least_call_001: u64,
    params_001: Solution,
}

impl Default for Latches {
    fn default() -> Self {
        Self {
            least_call: u64::MAX,
            least_call_001: u64::MAX,
            params_001: Solution::new(),
        }
    }
}

/// Objective call counters of one problem instance.
///
/// The total counter is a lock-free increment on every evaluation. The two
/// convergence latches are checked through atomic flags first and only take
/// the mutex on the rare crossing path, where concurrent crossers keep the
/// smallest call index.
#[derive(Debug, Default)]
pub struct CallTracker {
    calls: AtomicU64,
    optimum_reached: AtomicBool,
    reached_001: AtomicBool,
    latches: Mutex<Latches>,
}

/// Counter values read back after a solver run.
#[derive(Clone, Debug, PartialEq)]
pub struct CallCounts {
    pub total: u64,
    /// First call that hit the optimum fitness exactly, capped at `total`
    pub least: u64,
    /// First call within [`CONVERGENCE_TOLERANCE`] of the optimum, capped at `total`
    pub least_001: u64,
    /// Candidate evaluated by `least_001`; empty if never reached
    pub params_001: Solution,
}

impl CallTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one evaluation and latch the thresholds it crosses.
    ///
    /// Returns the 1-based index of this call.
    pub fn record(&self, fitness: f64, optimum_fitness: f64, solution: &[f64]) -> u64 {
        let call = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        let diff = (fitness - optimum_fitness).abs();

        if !self.optimum_reached.load(Ordering::Acquire) && diff == 0.0 {
            // several threads of one batch can get here before the flag is visible
            self.optimum_reached.store(true, Ordering::Release);
            let mut latches = self.lock();
            if call < latches.least_call {
                latches.least_call = call;
            }
        }

        if !self.reached_001.load(Ordering::Acquire) && diff < CONVERGENCE_TOLERANCE {
            self.reached_001.store(true, Ordering::Release);
            let mut latches = self.lock();
            if call < latches.least_call_001 {
                latches.least_call_001 = call;
                latches.params_001 = Solution::from(solution);
            }
        }

        call
    }

    /// Start a new counting epoch
    pub fn reset(&self) {
        let mut latches = self.lock();
        *latches = Latches::default();
        self.optimum_reached.store(false, Ordering::Release);
        self.reached_001.store(false, Ordering::Release);
        self.calls.store(0, Ordering::Release);
    }

    pub fn total_calls(&self) -> u64 {
        self.calls.load(Ordering::Acquire)
    }

    pub fn optimum_reached(&self) -> bool {
        self.optimum_reached.load(Ordering::Acquire)
    }

    pub fn reached_001(&self) -> bool {
        self.reached_001.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> CallCounts {
        let latches = self.lock();
        let total = self.calls.load(Ordering::Acquire);
        CallCounts {
            total,
            least: latches.least_call.min(total),
            least_001: latches.least_call_001.min(total),
            params_001: latches.params_001.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Latches> {
        // latches hold plain values, a panicked writer cannot leave them torn
        self.latches.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
