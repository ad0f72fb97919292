pub mod error;
pub mod solution;
pub mod stats;

pub use error::{BenchmarkError, ConfigError, EvaluationError, SolveError};
pub use solution::Solution;
pub use stats::{Samples, Stats};
