//! Error types shared across the benchmark.
//!
//! Solver failures never escape the aggregator: they are mapped onto
//! per-result failure counters. These types exist so every boundary
//! returns an explicit `Result` instead of unwinding.

use thiserror::Error;

/// Batch evaluation was handed buffers that do not describe whole candidates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("solution buffer of {len} values is not a multiple of dimensionality {dimensionality}")]
    RaggedSolutions { len: usize, dimensionality: usize },

    #[error("fitness buffer holds {got} slots, {expected} candidates were supplied")]
    FitnessLength { expected: usize, got: usize },
}

/// Outcome signalled by an external solver.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolveError {
    #[error("solver '{0}' is not registered")]
    UnknownSolver(String),

    #[error("solver failed: {0}")]
    Failed(String),

    #[error("solver panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// Configuration rejected before any run starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("at least one population size is required")]
    NoPopulationSizes,

    #[error("population size must be positive")]
    ZeroPopulation,

    #[error("max_generations must be positive")]
    ZeroGenerations,

    #[error("repetitions must be positive")]
    ZeroRepetitions,

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Reasons a whole problem produces no ranking.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BenchmarkError {
    #[error("{problem} cannot be solved with dimensionality {dimensionality}")]
    Unsolvable {
        problem: String,
        dimensionality: usize,
    },

    #[error("no eligible solver produced results for {problem}")]
    NoResults { problem: String },
}

impl SolveError {
    /// Returns `true` if the solver itself signalled the failure (as opposed
    /// to an unknown id or a malformed batch).
    pub fn is_solver_failure(&self) -> bool {
        matches!(self, SolveError::Failed(_) | SolveError::Panicked(_))
    }
}
