use super::traits::{clamp_to_bounds, Solver, SolverDescriptor, SolverProgress, SolverSetup};
use crate::core::SolveError;
use crate::evaluation::BatchFitness;
use argmin::core::{CostFunction, Error, Executor, State};
use argmin::solver::neldermead::NelderMead;

/// Nelder-Mead simplex driven by argmin, one candidate per callback batch.
///
/// Fully deterministic: the simplex is built from the box (or the first
/// hint) without any randomness, so repeated runs on the same problem
/// produce the same result.
pub struct NelderMeadOptimizer {
    descriptor: SolverDescriptor,
    /// Initial simplex edge as a fraction of the box width
    initial_step: f64,
}

impl Default for NelderMeadOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl NelderMeadOptimizer {
    pub fn new() -> Self {
        Self {
            descriptor: SolverDescriptor::new("neldermead", "NelderMead"),
            initial_step: 0.25,
        }
    }

    pub fn with_initial_step(mut self, fraction: f64) -> Self {
        self.initial_step = fraction;
        self
    }

    fn initial_simplex(&self, setup: &SolverSetup<'_>) -> Vec<Vec<f64>> {
        let n = setup.problem_size;
        let start: Vec<f64> = match setup.hints.iter().find(|h| h.len() == n) {
            Some(hint) => hint.to_vec(),
            None => setup
                .lower_bound
                .iter()
                .zip(setup.upper_bound)
                .map(|(lo, hi)| 0.5 * (lo + hi))
                .collect(),
        };

        let mut simplex = Vec::with_capacity(n + 1);
        simplex.push(start.clone());
        for i in 0..n {
            let mut vertex = start.clone();
            vertex[i] += self.initial_step * (setup.upper_bound[i] - setup.lower_bound[i]);
            clamp_to_bounds(&mut vertex, setup.lower_bound, setup.upper_bound);
            simplex.push(vertex);
        }
        simplex
    }
}

/// argmin view of the batch callback; candidates are clamped into the box
/// before evaluation.
struct BoxedCost<'a> {
    objective: &'a dyn BatchFitness,
    lower: &'a [f64],
    upper: &'a [f64],
}

impl CostFunction for BoxedCost<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, Error> {
        let mut candidate = param.clone();
        clamp_to_bounds(&mut candidate, self.lower, self.upper);
        let fitness = self.objective.evaluate_one(&candidate)?;
        // the simplex ordering cannot rank NaN
        Ok(if fitness.is_nan() { f64::INFINITY } else { fitness })
    }
}

impl Solver for NelderMeadOptimizer {
    fn descriptor(&self) -> &SolverDescriptor {
        &self.descriptor
    }

    fn solve(
        &self,
        setup: &mut SolverSetup<'_>,
        progress: &mut SolverProgress,
    ) -> Result<(), SolveError> {
        let cost = BoxedCost {
            objective: setup.objective,
            lower: setup.lower_bound,
            upper: setup.upper_bound,
        };

        let solver = NelderMead::new(self.initial_simplex(setup))
            .with_sd_tolerance(setup.tolerance)
            .map_err(|e| SolveError::Failed(e.to_string()))?;

        let res = Executor::new(cost, solver)
            .configure(|state| state.max_iters(setup.max_generations as u64))
            .run()
            .map_err(|e| SolveError::Failed(e.to_string()))?;

        let state = res.state();
        let mut best = state
            .get_best_param()
            .cloned()
            .ok_or_else(|| SolveError::Failed("simplex produced no parameters".into()))?;
        clamp_to_bounds(&mut best, setup.lower_bound, setup.upper_bound);

        progress.on_generation(state.get_iter() as usize, state.get_best_cost());
        setup.solution.copy_from_slice(&best);
        Ok(())
    }
}
