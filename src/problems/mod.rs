pub mod catalog;
pub mod landscape;
pub mod problem;
pub mod tracker;

pub use catalog::create_problem_collection;
pub use landscape::{Landscape, OptimumPlacement};
pub use problem::Problem;
pub use tracker::{CallCounts, CallTracker, CONVERGENCE_TOLERANCE};
