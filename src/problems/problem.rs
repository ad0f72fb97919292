use super::landscape::Landscape;
use super::tracker::{CallCounts, CallTracker};
use crate::core::Solution;
use log::debug;
use rand::Rng;

/// A benchmark landscape bound to a dimensionality, a shift and a tracked
/// optimum.
///
/// `compute_fitness` takes `&self` and is safe to call from many threads at
/// once; all mutable counter state sits in the owned [`CallTracker`].
#[derive(Debug)]
pub struct Problem {
    landscape: Landscape,
    dimensionality: usize,
    bound: f64,
    analytic_optimum: Solution,
    shift: Solution,
    optimum_parameters: Solution,
    optimum_fitness: f64,
    tracker: CallTracker,
}

impl Problem {
    pub fn new(landscape: Landscape, dimensionality: usize) -> Self {
        let mut problem = Self {
            landscape,
            dimensionality,
            bound: landscape.upper_bound(),
            analytic_optimum: Solution::new(),
            shift: Solution::new(),
            optimum_parameters: Solution::new(),
            optimum_fitness: f64::NAN,
            tracker: CallTracker::new(),
        };
        problem.init_optimum();
        problem
    }

    /// Restore the landscape's default optimum placement and recompute the
    /// cached optimum fitness. Counters start a fresh epoch.
    pub fn init_optimum(&mut self) {
        let placement = self.landscape.optimum_placement();
        let n = self.dimensionality;

        self.analytic_optimum.set_constant(placement.analytic, Some(n));
        self.shift.set_constant(placement.shift, Some(n));
        self.optimum_parameters
            .set_constant(placement.analytic + placement.shift, Some(n));

        self.refresh_optimum_fitness();
        self.tracker.reset();
    }

    fn refresh_optimum_fitness(&mut self) {
        self.optimum_fitness = self.fitness_untracked(&self.optimum_parameters);
    }

    /// Evaluate `solution` and account for the call
    pub fn compute_fitness(&self, solution: &[f64]) -> f64 {
        debug_assert_eq!(solution.len(), self.dimensionality);
        let fitness = self.fitness_untracked(solution);
        self.tracker.record(fitness, self.optimum_fitness, solution);
        fitness
    }

    /// Evaluate `solution` without touching the counters
    pub fn fitness_untracked(&self, solution: &[f64]) -> f64 {
        self.landscape.evaluate(solution, &self.shift)
    }

    /// Lower and upper corners of the search box
    pub fn bounds(&self) -> (Solution, Solution) {
        (
            Solution::constant(-self.bound, self.dimensionality),
            Solution::constant(self.bound, self.dimensionality),
        )
    }

    pub fn upper_bound(&self) -> f64 {
        self.bound
    }

    /// Known optimum parameters and their fitness
    pub fn optimum(&self) -> (&Solution, f64) {
        (&self.optimum_parameters, self.optimum_fitness)
    }

    pub fn analytic_optimum(&self) -> &Solution {
        &self.analytic_optimum
    }

    pub fn shift(&self) -> &Solution {
        &self.shift
    }

    pub fn can_be_solved(&self) -> bool {
        self.landscape.can_be_solved(self.dimensionality)
    }

    /// Draw a new shift uniformly inside the box and move the optimum with it.
    ///
    /// Counters and the cached optimum fitness are left alone; callers reset
    /// counters explicitly before the next run.
    pub fn randomize_shift<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.landscape.pins_shift() {
            debug!("{} keeps its optimum at the analytic point", self.name());
            return;
        }

        for i in 0..self.dimensionality {
            self.shift[i] = rng.gen_range(-self.bound..=self.bound);
            self.optimum_parameters[i] = self.analytic_optimum[i] + self.shift[i];
        }
    }

    pub fn reset_counters(&self) {
        self.tracker.reset();
    }

    pub fn objective_calls(&self) -> CallCounts {
        self.tracker.snapshot()
    }

    pub fn tracker(&self) -> &CallTracker {
        &self.tracker
    }

    pub fn name(&self) -> &'static str {
        self.landscape.name()
    }

    pub fn landscape(&self) -> Landscape {
        self.landscape
    }

    pub fn dimensionality(&self) -> usize {
        self.dimensionality
    }
}

impl Clone for Problem {
    /// Copies shift and optimum placement, recomputes the cached optimum
    /// fitness and starts with zeroed counters.
    fn clone(&self) -> Self {
        let mut problem = Self {
            landscape: self.landscape,
            dimensionality: self.dimensionality,
            bound: self.bound,
            analytic_optimum: self.analytic_optimum.clone(),
            shift: self.shift.clone(),
            optimum_parameters: self.optimum_parameters.clone(),
            optimum_fitness: f64::NAN,
            tracker: CallTracker::new(),
        };
        problem.refresh_optimum_fitness();
        problem
    }
}
