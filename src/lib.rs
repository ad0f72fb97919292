//! Benchmark harness that ranks black-box optimizers on canonical test
//! landscapes with call-tracked convergence and robust statistics.

pub mod benchmark;
pub mod core;
pub mod evaluation;
pub mod problems;
pub mod solvers;

pub use crate::core::{
    BenchmarkError, ConfigError, EvaluationError, Samples, Solution, SolveError, Stats,
};
pub use benchmark::{Aggregator, BenchmarkConfig, BenchmarkResult, Ranking};
pub use evaluation::{BatchFitness, ParallelConfig};
pub use problems::{create_problem_collection, Landscape, Problem};
pub use solvers::{reference_registry, Solver, SolverDescriptor, SolverRegistry};
