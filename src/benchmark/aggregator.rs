use super::config::BenchmarkConfig;
use super::result::BenchmarkResult;
use super::runner::SolverRunner;
use crate::core::{BenchmarkError, Stats};
use crate::problems::Problem;
use crate::solvers::SolverRegistry;
use indexmap::IndexMap;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Ranked outcome of benchmarking every eligible solver on one problem.
#[derive(Debug, Clone)]
pub struct Ranking {
    pub problem: String,
    pub dimensionality: usize,
    /// Best first, ordered by [`compare_results`]
    pub results: Vec<BenchmarkResult>,
    /// Optimum fitness faced across all runs; only when the optimum was
    /// randomized
    pub optimum_fitness: Option<Stats>,
}

/// Runs every allowed solver over all population sizes and repetitions.
pub struct Aggregator {
    config: BenchmarkConfig,
    registry: SolverRegistry,
    rng: StdRng,
}

impl Aggregator {
    pub fn new(config: BenchmarkConfig, registry: SolverRegistry) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            registry,
            rng,
        }
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    pub fn registry(&self) -> &SolverRegistry {
        &self.registry
    }

    /// Benchmark all eligible solvers on a private clone of `problem`.
    pub fn run(&mut self, problem: &Problem) -> Result<Ranking, BenchmarkError> {
        if !problem.can_be_solved() {
            return Err(BenchmarkError::Unsolvable {
                problem: problem.name().to_string(),
                dimensionality: problem.dimensionality(),
            });
        }

        let n = problem.dimensionality();
        let descriptors = self.registry.descriptors();
        let runner = SolverRunner::new(&self.registry, self.config.parallel);
        let mut working = problem.clone();
        let mut results = Vec::new();

        info!(
            "Evaluating {} solvers on {} with problem size {}",
            descriptors.len(),
            problem.name(),
            n
        );

        for &population_size in &self.config.population_sizes {
            let mut working_results: IndexMap<String, BenchmarkResult> = descriptors
                .iter()
                .filter(|d| self.config.is_allowed(&d.id))
                .map(|d| (d.id.clone(), BenchmarkResult::new(d, population_size, n)))
                .collect();
            let mut failed_once = HashSet::new();

            info!("Executing repetitions with population size {}", population_size);

            for repetition in 0..self.config.repetitions {
                // every solver in a repetition faces the same shifted problem
                if self.config.randomize_optimum {
                    working.randomize_shift(&mut self.rng);
                }
                debug!(
                    "repetition {}: optimum parameters {:?}",
                    repetition,
                    working.optimum().0.as_slice()
                );

                for descriptor in &descriptors {
                    let Some(result) = working_results.get_mut(&descriptor.id) else {
                        continue;
                    };

                    if descriptor.specialized {
                        result.fail_count += 1;
                        continue;
                    }

                    if self.config.is_faulty(&descriptor.id, n) {
                        warn!(
                            "skipping {} at problem size {}, known to fail",
                            descriptor.description, n
                        );
                        result.fail_count += 1;
                        continue;
                    }

                    let replicate = repetition > 0
                        && self.config.run_deterministic_once
                        && !self.config.randomize_optimum
                        && self.config.is_deterministic(&descriptor.id);
                    if replicate && result.repeat_last_repetition() {
                        if failed_once.contains(&descriptor.id) {
                            result.fail_count += 1;
                        }
                        continue;
                    }

                    let outcome = runner.run(
                        descriptor,
                        &working,
                        self.config.max_generations,
                        population_size,
                        result,
                    );
                    if outcome.is_err() {
                        failed_once.insert(descriptor.id.clone());
                    }
                }
            }

            results.extend(working_results.into_values());
        }

        if results.is_empty() {
            return Err(BenchmarkError::NoResults {
                problem: problem.name().to_string(),
            });
        }

        for result in results.iter_mut() {
            result.calculate_stats();
        }
        results.sort_by(compare_results);

        let optimum_fitness = self.config.randomize_optimum.then(|| {
            let faced: Vec<f64> = results
                .iter()
                .flat_map(|r| r.optimum_fitness.values().iter().copied())
                .collect();
            Stats::calculate(&faced)
        });

        Ok(Ranking {
            problem: problem.name().to_string(),
            dimensionality: n,
            results,
            optimum_fitness,
        })
    }
}

/// Lexicographic ranking: fewer failures, then lower mean parameter error,
/// fitness error, 0.001 parameter error and least call to 0.001, then name.
///
/// Stats must already be calculated.
pub fn compare_results(a: &BenchmarkResult, b: &BenchmarkResult) -> Ordering {
    a.fail_count
        .cmp(&b.fail_count)
        .then_with(|| compare_means(a.parameter_error().avg, b.parameter_error().avg))
        .then_with(|| compare_means(a.fitness_error.stats().avg, b.fitness_error.stats().avg))
        .then_with(|| compare_means(a.parameter_error_001().avg, b.parameter_error_001().avg))
        .then_with(|| {
            compare_means(
                a.least_calls_001.stats().avg,
                b.least_calls_001.stats().avg,
            )
        })
        .then_with(|| a.name.cmp(&b.name))
}

/// NaN sorts after every number
fn compare_means(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}
