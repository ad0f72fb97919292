use super::traits::{best_index, clamp_to_bounds, Solver, SolverDescriptor, SolverProgress, SolverSetup};
use crate::core::SolveError;
use rand::Rng;

/// Particle Swarm Optimization over the whole swarm as one fitness batch
pub struct ParticleOptimizer {
    descriptor: SolverDescriptor,
    inertia: f64,   // w - velocity inertia weight
    cognitive: f64, // c1 - personal best influence
    social: f64,    // c2 - global best influence
    stagnation_limit: usize,
}

impl Default for ParticleOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticleOptimizer {
    pub fn new() -> Self {
        Self {
            descriptor: SolverDescriptor::new("pso", "PSO"),
            inertia: 0.7,
            cognitive: 1.5,
            social: 1.5,
            stagnation_limit: 200,
        }
    }

    /// Configure PSO parameters (defaults: w=0.7, c1=1.5, c2=1.5)
    pub fn with_pso_params(mut self, inertia: f64, cognitive: f64, social: f64) -> Self {
        self.inertia = inertia;
        self.cognitive = cognitive;
        self.social = social;
        self
    }

    /// Generations without improvement before giving up (default: 200)
    pub fn with_stagnation_limit(mut self, generations: usize) -> Self {
        self.stagnation_limit = generations;
        self
    }

    /// Initialize particle positions uniformly within bounds
    fn initialize_particles<R: Rng>(&self, rng: &mut R, setup: &SolverSetup<'_>, swarm: usize) -> Vec<f64> {
        let n = setup.problem_size;
        let mut particles = Vec::with_capacity(swarm * n);

        for p in 0..swarm {
            // hints seed the first particles
            if let Some(hint) = setup.hints.get(p).filter(|h| h.len() == n) {
                particles.extend_from_slice(hint);
                continue;
            }
            for i in 0..n {
                particles.push(rng.gen_range(setup.lower_bound[i]..=setup.upper_bound[i]));
            }
        }

        particles
    }

    /// Initialize velocities (small random values)
    fn initialize_velocities<R: Rng>(&self, rng: &mut R, setup: &SolverSetup<'_>, swarm: usize) -> Vec<f64> {
        let n = setup.problem_size;
        (0..swarm * n)
            .map(|k| {
                let i = k % n;
                let range = setup.upper_bound[i] - setup.lower_bound[i];
                rng.gen_range(-range * 0.1..=range * 0.1)
            })
            .collect()
    }
}

impl Solver for ParticleOptimizer {
    fn descriptor(&self) -> &SolverDescriptor {
        &self.descriptor
    }

    fn solve(
        &self,
        setup: &mut SolverSetup<'_>,
        progress: &mut SolverProgress,
    ) -> Result<(), SolveError> {
        let n = setup.problem_size;
        let swarm = setup.population_size.max(2);
        let mut rng = rand::thread_rng();

        let mut particles = self.initialize_particles(&mut rng, setup, swarm);
        let mut velocities = self.initialize_velocities(&mut rng, setup, swarm);
        for particle in particles.chunks_mut(n) {
            clamp_to_bounds(particle, setup.lower_bound, setup.upper_bound);
        }

        let mut personal_best_positions = particles.clone();
        let mut personal_best_costs = vec![f64::INFINITY; swarm];
        let mut global_best = particles[..n].to_vec();
        let mut global_best_cost = f64::INFINITY;

        let mut costs = vec![f64::NAN; swarm];
        let mut stagnation = 0;

        for generation in 0..setup.max_generations {
            setup.objective.evaluate(&particles, &mut costs)?;

            let previous_best = global_best_cost;
            for p in 0..swarm {
                if costs[p] < personal_best_costs[p] {
                    personal_best_costs[p] = costs[p];
                    personal_best_positions[p * n..(p + 1) * n]
                        .copy_from_slice(&particles[p * n..(p + 1) * n]);
                }
            }
            if let Some(best) = best_index(&personal_best_costs) {
                if personal_best_costs[best] < global_best_cost {
                    global_best_cost = personal_best_costs[best];
                    global_best.copy_from_slice(&personal_best_positions[best * n..(best + 1) * n]);
                }
            }

            progress.on_generation(generation + 1, global_best_cost);

            if previous_best - global_best_cost < setup.tolerance {
                stagnation += 1;
                if stagnation >= self.stagnation_limit {
                    break;
                }
            } else {
                stagnation = 0;
            }

            // Update velocities and positions for all particles
            for p in 0..swarm {
                for i in 0..n {
                    let k = p * n + i;
                    let r1 = rng.r#gen::<f64>();
                    let r2 = rng.r#gen::<f64>();

                    velocities[k] = self.inertia * velocities[k]
                        + self.cognitive * r1 * (personal_best_positions[k] - particles[k])
                        + self.social * r2 * (global_best[i] - particles[k]);

                    // Clamp velocity to fraction of search space
                    let v_max = (setup.upper_bound[i] - setup.lower_bound[i]) * 0.2;
                    velocities[k] = velocities[k].clamp(-v_max, v_max);

                    particles[k] += velocities[k];
                }

                clamp_to_bounds(
                    &mut particles[p * n..(p + 1) * n],
                    setup.lower_bound,
                    setup.upper_bound,
                );
            }
        }

        if !global_best_cost.is_finite() {
            return Err(SolveError::Failed("swarm never produced a finite fitness".into()));
        }

        setup.solution.copy_from_slice(&global_best);
        Ok(())
    }
}
