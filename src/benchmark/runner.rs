use super::result::{BenchmarkResult, RunRecord};
use crate::core::SolveError;
use crate::evaluation::{ParallelConfig, ProblemObjective};
use crate::problems::Problem;
use crate::solvers::{SolverDescriptor, SolverProgress, SolverRegistry, SolverSetup};
use log::{debug, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Drives single solver runs against a working problem.
pub struct SolverRunner<'a> {
    registry: &'a SolverRegistry,
    parallel: ParallelConfig,
}

impl<'a> SolverRunner<'a> {
    pub fn new(registry: &'a SolverRegistry, parallel: ParallelConfig) -> Self {
        Self { registry, parallel }
    }

    /// Run `descriptor` once and append the measurements to `result`.
    ///
    /// Counters are reset first. A failing, panicking or NaN-producing run
    /// still records its metrics and bumps `result.fail_count`; the failure
    /// is returned for the caller to log but never unwinds.
    pub fn run(
        &self,
        descriptor: &SolverDescriptor,
        problem: &Problem,
        max_generations: usize,
        population_size: usize,
        result: &mut BenchmarkResult,
    ) -> Result<(), SolveError> {
        problem.reset_counters();

        let n = problem.dimensionality();
        let (lower, upper) = problem.bounds();
        let (optimum, optimum_fitness) = problem.optimum();
        let objective = ProblemObjective::new(problem, self.parallel);
        let mut parameters = vec![f64::NAN; n];
        let mut progress = SolverProgress::default();

        let start = Instant::now();
        let outcome = {
            let mut setup = SolverSetup {
                problem_size: n,
                lower_bound: &lower,
                upper_bound: &upper,
                hints: &[],
                solution: &mut parameters,
                objective: &objective,
                max_generations,
                population_size,
                tolerance: f64::MIN_POSITIVE,
            };
            panic::catch_unwind(AssertUnwindSafe(|| {
                self.registry.solve(&descriptor.id, &mut setup, &mut progress)
            }))
            .unwrap_or_else(|payload| Err(SolveError::Panicked(panic_message(payload))))
        };
        let seconds = start.elapsed().as_secs_f64();

        let counts = problem.objective_calls();
        let fitness = problem.fitness_untracked(&parameters);

        debug!(
            "{} finished after {} generations, {} calls, fitness {:e}",
            descriptor.description, progress.generation, counts.total, fitness
        );

        result.record(&RunRecord {
            seconds,
            total_calls: counts.total,
            least_calls: counts.least,
            least_calls_001: counts.least_001,
            fitness,
            optimum_fitness,
            parameters,
            optimum: optimum.to_vec(),
            params_001: counts.params_001.into_inner(),
        });

        let outcome = outcome.and_then(|()| {
            if fitness.is_nan() {
                Err(SolveError::Failed("returned parameters evaluate to NaN".into()))
            } else {
                Ok(())
            }
        });

        if let Err(e) = &outcome {
            result.fail_count += 1;
            warn!("{} on {}: {}", result.name, problem.name(), e);
        }
        outcome
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problems::Landscape;
    use crate::solvers::Solver;

    /// Writes the optimum straight into the output buffer after one batch
    struct Oracle(SolverDescriptor);

    impl Solver for Oracle {
        fn descriptor(&self) -> &SolverDescriptor {
            &self.0
        }

        fn solve(
            &self,
            setup: &mut SolverSetup<'_>,
            progress: &mut SolverProgress,
        ) -> Result<(), SolveError> {
            let target = vec![-4.0; setup.problem_size];
            let fitness = setup.objective.evaluate_one(&target)?;
            progress.on_generation(1, fitness);
            setup.solution.copy_from_slice(&target);
            Ok(())
        }
    }

    struct Exploding(SolverDescriptor);

    impl Solver for Exploding {
        fn descriptor(&self) -> &SolverDescriptor {
            &self.0
        }

        fn solve(
            &self,
            _setup: &mut SolverSetup<'_>,
            _progress: &mut SolverProgress,
        ) -> Result<(), SolveError> {
            panic!("solver blew up");
        }
    }

    /// Reports success without touching the output buffer
    struct Silent(SolverDescriptor);

    impl Solver for Silent {
        fn descriptor(&self) -> &SolverDescriptor {
            &self.0
        }

        fn solve(
            &self,
            _setup: &mut SolverSetup<'_>,
            _progress: &mut SolverProgress,
        ) -> Result<(), SolveError> {
            Ok(())
        }
    }

    fn registry() -> SolverRegistry {
        SolverRegistry::new()
            .with_solver(Oracle(SolverDescriptor::new("oracle", "Oracle")))
            .with_solver(Exploding(SolverDescriptor::new("boom", "Boom")))
            .with_solver(Silent(SolverDescriptor::new("silent", "Silent")))
    }

    #[test]
    fn test_successful_run_records_metrics() {
        let registry = registry();
        let runner = SolverRunner::new(&registry, ParallelConfig::default());
        let problem = Problem::new(Landscape::Sphere, 3);
        let descriptors = registry.descriptors();
        let descriptor = &descriptors[0];
        let mut result = BenchmarkResult::new(descriptor, 7, 3);

        runner.run(descriptor, &problem, 10, 7, &mut result).unwrap();
        // a stale count from an earlier run must not leak into the next one
        runner.run(descriptor, &problem, 10, 7, &mut result).unwrap();

        assert_eq!(result.fail_count, 0);
        assert_eq!(result.total_calls.values(), &[1.0, 1.0]);
        assert_eq!(result.least_calls.values(), &[1.0, 1.0]);
        assert_eq!(result.least_calls_001.values(), &[1.0, 1.0]);
        assert_eq!(result.fitness_error.values(), &[0.0, 0.0]);
        assert_eq!(result.abs_parameter_error.len(), 6);
        assert_eq!(result.abs_parameter_error_001.len(), 6);
        assert!(result.seconds.values().iter().all(|&s| s >= 0.0));
    }

    #[test]
    fn test_panic_is_counted_not_propagated() {
        let registry = registry();
        let runner = SolverRunner::new(&registry, ParallelConfig::default());
        let problem = Problem::new(Landscape::Rastrigin, 2);
        let descriptors = registry.descriptors();
        let descriptor = &descriptors[1];
        let mut result = BenchmarkResult::new(descriptor, 7, 2);

        let err = runner.run(descriptor, &problem, 10, 7, &mut result).unwrap_err();
        assert_eq!(err, SolveError::Panicked("solver blew up".into()));
        assert_eq!(result.fail_count, 1);
        assert_eq!(result.repetitions(), 1);
        assert!(result.fitness.values()[0].is_nan());
    }

    #[test]
    fn test_nan_fitness_is_a_failure() {
        let registry = registry();
        let runner = SolverRunner::new(&registry, ParallelConfig::default());
        let problem = Problem::new(Landscape::Sphere, 2);
        let descriptors = registry.descriptors();
        let descriptor = &descriptors[2];
        let mut result = BenchmarkResult::new(descriptor, 7, 2);

        let err = runner.run(descriptor, &problem, 10, 7, &mut result).unwrap_err();
        assert!(err.is_solver_failure());
        assert_eq!(result.fail_count, 1);
        assert_eq!(result.total_calls.values(), &[0.0]);
    }
}
