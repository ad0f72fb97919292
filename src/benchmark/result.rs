use crate::core::{Samples, Stats};
use crate::solvers::SolverDescriptor;
use serde::{Deserialize, Serialize};

/// Everything recorded for one (solver, population size) pair across all
/// repetitions.
///
/// Every repetition appends one value to the scalar samples and one value
/// per dimension to `parameters`/`optimum`. The two parameter-error samples
/// are flattened across dimensions; `abs_parameter_error_001` only grows in
/// repetitions that reached the 0.001 threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub solver_id: String,
    /// `<description>_<population size>`
    pub name: String,
    pub population_size: usize,
    pub fail_count: usize,

    pub seconds: Samples,
    pub total_calls: Samples,
    pub least_calls: Samples,
    pub least_calls_001: Samples,

    pub fitness: Samples,
    pub fitness_error: Samples,
    pub abs_parameter_error: Samples,
    pub abs_parameter_error_001: Samples,

    pub optimum_fitness: Samples,
    pub optimum: Vec<Samples>,
    pub parameters: Vec<Samples>,

    #[serde(skip)]
    last_run: Option<RunRecord>,
}

/// Values measured in a single solver run
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub seconds: f64,
    pub total_calls: u64,
    pub least_calls: u64,
    pub least_calls_001: u64,
    pub fitness: f64,
    pub optimum_fitness: f64,
    pub parameters: Vec<f64>,
    pub optimum: Vec<f64>,
    /// Empty when the 0.001 threshold was never crossed
    pub params_001: Vec<f64>,
}

impl BenchmarkResult {
    pub fn new(descriptor: &SolverDescriptor, population_size: usize, dimensionality: usize) -> Self {
        let name = if population_size > 0 {
            format!("{}_{}", descriptor.description, population_size)
        } else {
            descriptor.description.clone()
        };

        Self {
            solver_id: descriptor.id.clone(),
            name,
            population_size,
            fail_count: 0,
            seconds: Samples::new(),
            total_calls: Samples::new(),
            least_calls: Samples::new(),
            least_calls_001: Samples::new(),
            fitness: Samples::new(),
            fitness_error: Samples::new(),
            abs_parameter_error: Samples::new(),
            abs_parameter_error_001: Samples::new(),
            optimum_fitness: Samples::new(),
            optimum: vec![Samples::new(); dimensionality],
            parameters: vec![Samples::new(); dimensionality],
            last_run: None,
        }
    }

    pub fn dimensionality(&self) -> usize {
        self.parameters.len()
    }

    /// Append one repetition's measurements
    pub fn record(&mut self, run: &RunRecord) {
        self.seconds.push(run.seconds);
        self.total_calls.push(run.total_calls as f64);
        self.least_calls.push(run.least_calls as f64);
        self.least_calls_001.push(run.least_calls_001 as f64);

        self.optimum_fitness.push(run.optimum_fitness);
        self.fitness.push(run.fitness);
        self.fitness_error.push((run.fitness - run.optimum_fitness).abs());

        for (i, (&found, &optimum)) in run.parameters.iter().zip(&run.optimum).enumerate() {
            self.optimum[i].push(optimum);
            self.parameters[i].push(found);
            self.abs_parameter_error.push((found - optimum).abs());
        }

        for (&found, &optimum) in run.params_001.iter().zip(&run.optimum) {
            self.abs_parameter_error_001.push((found - optimum).abs());
        }

        self.last_run = Some(run.clone());
    }

    /// Number of completed (non-skipped) repetitions
    pub fn repetitions(&self) -> usize {
        self.seconds.len()
    }

    /// Duplicate the most recent repetition; used for deterministic solvers
    /// that are run only once.
    ///
    /// Returns `false` when there is nothing to repeat.
    pub fn repeat_last_repetition(&mut self) -> bool {
        match self.last_run.take() {
            Some(run) => {
                self.record(&run);
                true
            }
            None => false,
        }
    }

    /// Compute the summary of every sample
    pub fn calculate_stats(&mut self) {
        for samples in [
            &mut self.seconds,
            &mut self.total_calls,
            &mut self.least_calls,
            &mut self.least_calls_001,
            &mut self.fitness,
            &mut self.fitness_error,
            &mut self.abs_parameter_error,
            &mut self.abs_parameter_error_001,
            &mut self.optimum_fitness,
        ] {
            samples.calculate();
        }
        for samples in self.optimum.iter_mut().chain(self.parameters.iter_mut()) {
            samples.calculate();
        }
    }

    pub fn parameter_error(&self) -> &Stats {
        self.abs_parameter_error.stats()
    }

    pub fn parameter_error_001(&self) -> &Stats {
        self.abs_parameter_error_001.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn run(fitness: f64, parameters: Vec<f64>, params_001: Vec<f64>) -> RunRecord {
        RunRecord {
            seconds: 0.5,
            total_calls: 100,
            least_calls: 100,
            least_calls_001: 40,
            fitness,
            optimum_fitness: 0.0,
            parameters,
            optimum: vec![1.0, 1.0],
            params_001,
        }
    }

    #[test]
    fn test_name_includes_population() {
        let descriptor = SolverDescriptor::new("pso", "PSO");
        assert_eq!(BenchmarkResult::new(&descriptor, 25, 2).name, "PSO_25");
        assert_eq!(BenchmarkResult::new(&descriptor, 0, 2).name, "PSO");
    }

    #[test]
    fn test_record_and_stats() {
        let descriptor = SolverDescriptor::new("pso", "PSO");
        let mut result = BenchmarkResult::new(&descriptor, 7, 2);

        result.record(&run(0.25, vec![1.5, 0.5], vec![]));
        result.record(&run(0.75, vec![2.0, 1.0], vec![1.0, 1.0]));
        result.calculate_stats();

        assert_eq!(result.repetitions(), 2);
        assert_eq!(result.abs_parameter_error.values(), &[0.5, 0.5, 1.0, 0.0]);
        assert_eq!(result.abs_parameter_error_001.values(), &[0.0, 0.0]);
        assert_relative_eq!(result.fitness_error.stats().avg, 0.5);
        assert_relative_eq!(result.parameter_error().avg, 0.5);
        assert_eq!(result.parameters[0].values(), &[1.5, 2.0]);
        assert_eq!(result.optimum[1].values(), &[1.0, 1.0]);
        assert_eq!(result.total_calls.stats().stddev, 0.0);
    }

    #[test]
    fn test_never_converged_has_nan_001_error() {
        let descriptor = SolverDescriptor::new("random", "Random");
        let mut result = BenchmarkResult::new(&descriptor, 7, 2);
        result.record(&run(3.0, vec![0.0, 0.0], vec![]));
        result.calculate_stats();
        assert!(result.parameter_error_001().avg.is_nan());
    }

    #[test]
    fn test_repeat_last_repetition() {
        let descriptor = SolverDescriptor::new("neldermead", "NelderMead");
        let mut result = BenchmarkResult::new(&descriptor, 7, 2);
        assert!(!result.repeat_last_repetition());

        result.record(&run(0.25, vec![1.5, 0.5], vec![1.0, 1.0]));
        assert!(result.repeat_last_repetition());

        assert_eq!(result.repetitions(), 2);
        assert_eq!(result.fitness.values(), &[0.25, 0.25]);
        assert_eq!(result.abs_parameter_error.values(), &[0.5, 0.5, 0.5, 0.5]);
        assert_eq!(result.abs_parameter_error_001.len(), 4);
        assert!(result.repeat_last_repetition());
        assert_eq!(result.repetitions(), 3);
        assert_eq!(result.parameters[1].values(), &[0.5, 0.5]);
    }
}
