use super::traits::{best_index, Solver, SolverDescriptor, SolverProgress, SolverSetup};
use crate::core::SolveError;
use rand::Rng;

/// Uniform sampling of the box, one population per generation.
///
/// Serves as the baseline every other solver should beat.
pub struct RandomSearch {
    descriptor: SolverDescriptor,
}

impl Default for RandomSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSearch {
    pub fn new() -> Self {
        Self {
            descriptor: SolverDescriptor::new("random", "RandomSearch"),
        }
    }
}

impl Solver for RandomSearch {
    fn descriptor(&self) -> &SolverDescriptor {
        &self.descriptor
    }

    fn solve(
        &self,
        setup: &mut SolverSetup<'_>,
        progress: &mut SolverProgress,
    ) -> Result<(), SolveError> {
        let n = setup.problem_size;
        let population = setup.population_size.max(1);
        let mut rng = rand::thread_rng();

        let mut candidates = vec![0.0; population * n];
        let mut costs = vec![f64::NAN; population];
        let mut best = vec![f64::NAN; n];
        let mut best_cost = f64::INFINITY;

        for generation in 0..setup.max_generations {
            for (k, value) in candidates.iter_mut().enumerate() {
                let i = k % n;
                *value = rng.gen_range(setup.lower_bound[i]..=setup.upper_bound[i]);
            }

            setup.objective.evaluate(&candidates, &mut costs)?;

            if let Some(idx) = best_index(&costs) {
                if costs[idx] < best_cost {
                    best_cost = costs[idx];
                    best.copy_from_slice(&candidates[idx * n..(idx + 1) * n]);
                }
            }
            progress.on_generation(generation + 1, best_cost);
        }

        if !best_cost.is_finite() {
            return Err(SolveError::Failed("no sample produced a finite fitness".into()));
        }

        setup.solution.copy_from_slice(&best);
        Ok(())
    }
}
