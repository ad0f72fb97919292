pub mod aggregator;
pub mod config;
pub mod report;
pub mod result;
pub mod runner;

pub use aggregator::{compare_results, Aggregator, Ranking};
pub use config::BenchmarkConfig;
pub use result::{BenchmarkResult, RunRecord};
pub use runner::SolverRunner;
