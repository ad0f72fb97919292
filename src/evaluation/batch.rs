use crate::core::EvaluationError;
use crate::problems::Problem;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Batches smaller than this are evaluated on the calling thread
const MIN_PARALLEL_BATCH: usize = 4;

/// Parallel evaluation configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Enable parallel evaluation
    pub enabled: bool,
    /// Number of threads to use (None = use rayon default)
    pub num_threads: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            num_threads: None,
        }
    }
}

impl ParallelConfig {
    /// Threads the global pool will use
    pub fn effective_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(num_cpus::get)
    }

    /// Size the global rayon pool once; later calls keep the existing pool.
    pub fn install_global(&self) {
        if let Some(n) = self.num_threads {
            if rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build_global()
                .is_err()
            {
                debug!("global thread pool already configured, keeping it");
            }
        }
    }
}

/// Callback through which a solver asks for fitness values.
///
/// `solutions` holds candidates back to back, each `dimensionality()` long;
/// one fitness per candidate is written to `fitnesses`. Candidates carry no
/// ordering dependency and may be evaluated concurrently.
pub trait BatchFitness: Sync {
    fn dimensionality(&self) -> usize;

    fn evaluate(&self, solutions: &[f64], fitnesses: &mut [f64]) -> Result<(), EvaluationError>;

    /// Convenience for single-candidate solvers
    fn evaluate_one(&self, solution: &[f64]) -> Result<f64, EvaluationError> {
        let mut fitness = [f64::NAN];
        self.evaluate(solution, &mut fitness)?;
        Ok(fitness[0])
    }
}

/// Batch view of a [`Problem`]; every candidate goes through the problem's
/// call tracking.
#[derive(Clone, Copy)]
pub struct ProblemObjective<'a> {
    problem: &'a Problem,
    parallel: ParallelConfig,
}

impl<'a> ProblemObjective<'a> {
    pub fn new(problem: &'a Problem, parallel: ParallelConfig) -> Self {
        Self { problem, parallel }
    }

    pub fn problem(&self) -> &'a Problem {
        self.problem
    }
}

impl BatchFitness for ProblemObjective<'_> {
    fn dimensionality(&self) -> usize {
        self.problem.dimensionality()
    }

    fn evaluate(&self, solutions: &[f64], fitnesses: &mut [f64]) -> Result<(), EvaluationError> {
        evaluate_batch(self.problem, solutions, fitnesses, &self.parallel)
    }
}

/// Evaluate every candidate of `solutions` into `fitnesses`.
///
/// Only fails when the buffers do not describe whole candidates.
pub fn evaluate_batch(
    problem: &Problem,
    solutions: &[f64],
    fitnesses: &mut [f64],
    config: &ParallelConfig,
) -> Result<(), EvaluationError> {
    let dimensionality = problem.dimensionality();
    if dimensionality == 0 || solutions.len() % dimensionality != 0 {
        return Err(EvaluationError::RaggedSolutions {
            len: solutions.len(),
            dimensionality,
        });
    }

    let count = solutions.len() / dimensionality;
    if fitnesses.len() != count {
        return Err(EvaluationError::FitnessLength {
            expected: count,
            got: fitnesses.len(),
        });
    }

    if !config.enabled || count < MIN_PARALLEL_BATCH {
        for (fitness, candidate) in fitnesses.iter_mut().zip(solutions.chunks(dimensionality)) {
            *fitness = problem.compute_fitness(candidate);
        }
        return Ok(());
    }

    fitnesses
        .par_iter_mut()
        .zip(solutions.par_chunks(dimensionality))
        .for_each(|(fitness, candidate)| *fitness = problem.compute_fitness(candidate));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problems::Landscape;

    fn flatten(candidates: &[Vec<f64>]) -> Vec<f64> {
        candidates.iter().flatten().copied().collect()
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let problem = Problem::new(Landscape::Rastrigin, 3);
        let candidates: Vec<Vec<f64>> = (0..64)
            .map(|i| vec![i as f64 * 0.1, -(i as f64) * 0.05, 1.0])
            .collect();
        let solutions = flatten(&candidates);

        let mut parallel = vec![0.0; 64];
        evaluate_batch(&problem, &solutions, &mut parallel, &ParallelConfig::default()).unwrap();

        let sequential_config = ParallelConfig {
            enabled: false,
            num_threads: None,
        };
        let mut sequential = vec![0.0; 64];
        evaluate_batch(&problem, &solutions, &mut sequential, &sequential_config).unwrap();

        assert_eq!(parallel, sequential);
        for (candidate, fitness) in candidates.iter().zip(&parallel) {
            assert_eq!(*fitness, problem.fitness_untracked(candidate));
        }
        assert_eq!(problem.objective_calls().total, 128);
    }

    #[test]
    fn test_single_exact_hit_latches_once() {
        let problem = Problem::new(Landscape::Sphere, 2);
        let optimum = problem.optimum().0.clone();

        let mut candidates = vec![vec![1.0, 1.0]; 32];
        candidates[13] = optimum.to_vec();
        let solutions = flatten(&candidates);
        let mut fitnesses = vec![0.0; 32];

        let objective = ProblemObjective::new(&problem, ParallelConfig::default());
        objective.evaluate(&solutions, &mut fitnesses).unwrap();

        assert_eq!(fitnesses[13], 0.0);
        assert!(problem.tracker().optimum_reached());

        let counts = problem.objective_calls();
        assert_eq!(counts.total, 32);
        assert!(counts.least >= 1 && counts.least <= 32);
        assert_eq!(counts.params_001.as_slice(), optimum.as_slice());
    }

    #[test]
    fn test_rejects_ragged_buffers() {
        let problem = Problem::new(Landscape::Sphere, 3);
        let mut fitnesses = vec![0.0; 2];
        let err = evaluate_batch(&problem, &[0.0; 7], &mut fitnesses, &ParallelConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            EvaluationError::RaggedSolutions {
                len: 7,
                dimensionality: 3
            }
        );

        let err = evaluate_batch(&problem, &[0.0; 9], &mut fitnesses, &ParallelConfig::default())
            .unwrap_err();
        assert_eq!(err, EvaluationError::FitnessLength { expected: 3, got: 2 });
        assert_eq!(problem.objective_calls().total, 0);
    }

    #[test]
    fn test_evaluate_one() {
        let problem = Problem::new(Landscape::AbsoluteSum, 2);
        let objective = ProblemObjective::new(&problem, ParallelConfig::default());
        assert_eq!(objective.evaluate_one(&[0.0, 0.0]).unwrap(), 2.0);
        assert_eq!(objective.dimensionality(), 2);
    }

    #[test]
    fn test_effective_threads() {
        let config = ParallelConfig {
            enabled: true,
            num_threads: Some(3),
        };
        assert_eq!(config.effective_threads(), 3);
        assert!(ParallelConfig::default().effective_threads() >= 1);
    }
}
