use crate::core::{Solution, SolveError};
use crate::evaluation::BatchFitness;

/// Identity of a solver as enumerated by the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverDescriptor {
    pub id: String,
    pub description: String,
    /// Specialized solvers target a narrow problem class and are excluded
    /// from general benchmarks.
    pub specialized: bool,
}

impl SolverDescriptor {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            specialized: false,
        }
    }

    pub fn specialized(mut self) -> Self {
        self.specialized = true;
        self
    }
}

/// Everything a solver gets for one run.
pub struct SolverSetup<'a> {
    pub problem_size: usize,
    pub lower_bound: &'a [f64],
    pub upper_bound: &'a [f64],
    /// Optional starting points
    pub hints: &'a [Solution],
    /// Output buffer for the best parameters found
    pub solution: &'a mut [f64],
    /// The only way back into the benchmark
    pub objective: &'a dyn BatchFitness,
    pub max_generations: usize,
    pub population_size: usize,
    /// Minimum fitness improvement that still counts as progress
    pub tolerance: f64,
}

/// Progress a solver reports while running
#[derive(Clone, Debug)]
pub struct SolverProgress {
    pub generation: usize,
    pub best_fitness: f64,
}

impl Default for SolverProgress {
    fn default() -> Self {
        Self {
            generation: 0,
            best_fitness: f64::INFINITY,
        }
    }
}

impl SolverProgress {
    /// Called once per generation with the best fitness so far
    pub fn on_generation(&mut self, generation: usize, best_fitness: f64) {
        self.generation = generation;
        self.best_fitness = best_fitness;
    }
}

/// Solver interface - takes a setup record and a progress sink
pub trait Solver: Send + Sync {
    fn descriptor(&self) -> &SolverDescriptor;

    /// Run to completion, writing the best parameters to `setup.solution`.
    fn solve(
        &self,
        setup: &mut SolverSetup<'_>,
        progress: &mut SolverProgress,
    ) -> Result<(), SolveError>;
}

/// Ordered collection of solvers behind one generic solve entry point.
#[derive(Default)]
pub struct SolverRegistry {
    solvers: Vec<Box<dyn Solver>>,
}

impl SolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_solver(mut self, solver: impl Solver + 'static) -> Self {
        self.register(solver);
        self
    }

    pub fn register(&mut self, solver: impl Solver + 'static) {
        self.solvers.push(Box::new(solver));
    }

    /// Descriptors in registration order
    pub fn descriptors(&self) -> Vec<SolverDescriptor> {
        self.solvers.iter().map(|s| s.descriptor().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.solvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solvers.is_empty()
    }

    /// Generic entry point: run the solver registered under `id`
    pub fn solve(
        &self,
        id: &str,
        setup: &mut SolverSetup<'_>,
        progress: &mut SolverProgress,
    ) -> Result<(), SolveError> {
        let solver = self
            .solvers
            .iter()
            .find(|s| s.descriptor().id == id)
            .ok_or_else(|| SolveError::UnknownSolver(id.to_string()))?;
        solver.solve(setup, progress)
    }
}

/// Clamp every coordinate into its box
#[inline]
pub(crate) fn clamp_to_bounds(params: &mut [f64], lower: &[f64], upper: &[f64]) {
    for ((p, &lo), &hi) in params.iter_mut().zip(lower).zip(upper) {
        *p = p.clamp(lo, hi);
    }
}

/// Index of the smallest fitness; NaN never wins
pub(crate) fn best_index(fitnesses: &[f64]) -> Option<usize> {
    fitnesses
        .iter()
        .enumerate()
        .filter(|(_, f)| !f.is_nan())
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
}
