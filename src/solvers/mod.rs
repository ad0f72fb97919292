//! Solver seam and the bundled reference baselines.
//!
//! The harness ranks solvers it does not own: anything implementing
//! [`Solver`] can be registered. The four optimizers here only stand in
//! for an external solver library so the binary has something to rank;
//! they are kept small and are not part of what is being measured.

pub mod cma_es;
pub mod nelder_mead;
pub mod particle;
pub mod random_search;
pub mod traits;

pub use cma_es::CmaEsOptimizer;
pub use nelder_mead::NelderMeadOptimizer;
pub use particle::ParticleOptimizer;
pub use random_search::RandomSearch;
pub use traits::{Solver, SolverDescriptor, SolverProgress, SolverRegistry, SolverSetup};

/// Registry with every bundled solver, in report order
pub fn reference_registry() -> SolverRegistry {
    SolverRegistry::new()
        .with_solver(ParticleOptimizer::new())
        .with_solver(CmaEsOptimizer::new())
        .with_solver(NelderMeadOptimizer::new())
        .with_solver(RandomSearch::new())
}
