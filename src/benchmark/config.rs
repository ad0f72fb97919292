use crate::core::ConfigError;
use crate::evaluation::ParallelConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Everything the aggregator needs to know about a benchmark run.
///
/// Passed in explicitly at construction; nothing is read from global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Population sizes tried for every solver
    pub population_sizes: Vec<usize>,
    /// Generation budget handed to every solver run
    pub max_generations: usize,
    /// Repetitions per (solver, population size)
    pub repetitions: usize,
    /// Draw a new shift before each repetition
    pub randomize_optimum: bool,
    /// Solver ids to run; `None` runs every registered solver
    pub allowed_solvers: Option<Vec<String>>,
    /// Solver id -> dimensionality at which the solver is skipped
    pub faulty_solvers: BTreeMap<String, usize>,
    /// Solvers that produce the same result on every repetition
    pub deterministic_solvers: BTreeSet<String>,
    /// Run deterministic solvers only on the first repetition of a fixed
    /// optimum and replicate their sample
    pub run_deterministic_once: bool,
    /// Seed for shift randomization; entropy when absent
    pub seed: Option<u64>,
    pub parallel: ParallelConfig,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            population_sizes: vec![7, 15, 25, 40, 60, 100],
            max_generations: 100_000,
            repetitions: 1,
            randomize_optimum: false,
            allowed_solvers: None,
            faulty_solvers: BTreeMap::new(),
            deterministic_solvers: BTreeSet::from(["neldermead".to_string()]),
            run_deterministic_once: false,
            seed: None,
            parallel: ParallelConfig::default(),
        }
    }
}

impl BenchmarkConfig {
    /// Load a JSON configuration; missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_sizes.is_empty() {
            return Err(ConfigError::NoPopulationSizes);
        }
        if self.population_sizes.contains(&0) {
            return Err(ConfigError::ZeroPopulation);
        }
        if self.max_generations == 0 {
            return Err(ConfigError::ZeroGenerations);
        }
        if self.repetitions == 0 {
            return Err(ConfigError::ZeroRepetitions);
        }
        Ok(())
    }

    pub fn is_allowed(&self, solver_id: &str) -> bool {
        self.allowed_solvers
            .as_ref()
            .is_none_or(|ids| ids.iter().any(|id| id == solver_id))
    }

    /// Whether `solver_id` is known to fail at this dimensionality
    pub fn is_faulty(&self, solver_id: &str, dimensionality: usize) -> bool {
        self.faulty_solvers
            .get(solver_id)
            .is_some_and(|&threshold| dimensionality >= threshold)
    }

    pub fn is_deterministic(&self, solver_id: &str) -> bool {
        self.deterministic_solvers.contains(solver_id)
    }

    /// Builder-style setters used by the driver
    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn with_randomized_optimum(mut self, randomize: bool) -> Self {
        self.randomize_optimum = randomize;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
