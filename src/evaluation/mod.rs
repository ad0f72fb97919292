pub mod batch;

pub use batch::{evaluate_batch, BatchFitness, ParallelConfig, ProblemObjective};
