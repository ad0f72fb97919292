use super::traits::{best_index, clamp_to_bounds, Solver, SolverDescriptor, SolverProgress, SolverSetup};
use crate::core::SolveError;
use rand_distr::{Distribution, StandardNormal};

/// CMA-ES: weighted recombination, cumulative step-size adaptation and
/// rank-one plus rank-mu covariance updates, sampled through the Cholesky
/// factor of `C`. Learning rates scale with the variance-effective
/// selection mass, so any population size keeps `C` positive definite.
pub struct CmaEsOptimizer {
    descriptor: SolverDescriptor,
    /// Initial step size as a fraction of the box width
    sigma: f64,
    stagnation_limit: usize,
}

impl Default for CmaEsOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CmaEsOptimizer {
    pub fn new() -> Self {
        Self {
            descriptor: SolverDescriptor::new("cmaes", "CMA-ES"),
            sigma: 0.3,
            stagnation_limit: 200,
        }
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn with_stagnation_limit(mut self, generations: usize) -> Self {
        self.stagnation_limit = generations;
        self
    }

    /// Default offspring count for `n` parameters when the caller gives none
    fn default_lambda(n: usize) -> usize {
        4 + (3.0 * (n as f64).ln()).floor() as usize
    }
}

impl Solver for CmaEsOptimizer {
    fn descriptor(&self) -> &SolverDescriptor {
        &self.descriptor
    }

    fn solve(
        &self,
        setup: &mut SolverSetup<'_>,
        progress: &mut SolverProgress,
    ) -> Result<(), SolveError> {
        let n = setup.problem_size;
        let mut rng = rand::thread_rng();

        let lambda = if setup.population_size >= 2 {
            setup.population_size
        } else {
            Self::default_lambda(n)
        };
        let mu = (lambda / 2).max(1);

        // Start from the first usable hint, else the centre of the box
        let mut mean: Vec<f64> = match setup.hints.iter().find(|h| h.len() == n) {
            Some(hint) => hint.to_vec(),
            None => setup
                .lower_bound
                .iter()
                .zip(setup.upper_bound)
                .map(|(lo, hi)| 0.5 * (lo + hi))
                .collect(),
        };

        let width = setup
            .lower_bound
            .iter()
            .zip(setup.upper_bound)
            .map(|(lo, hi)| hi - lo)
            .sum::<f64>()
            / n as f64;

        let mut cov = identity(n);

        // Step size and evolution paths
        let mut sigma = self.sigma * width;
        let mut ps = vec![0.0; n];
        let mut pc = vec![0.0; n];

        // Recombination weights
        let mut weights: Vec<f64> = (0..mu)
            .map(|i| ((mu as f64 + 0.5).ln() - (i as f64 + 1.0).ln()).max(0.0))
            .collect();
        let sum_weights: f64 = weights.iter().sum();
        for w in weights.iter_mut() {
            *w /= sum_weights;
        }
        let mu_eff = 1.0 / weights.iter().map(|w| w * w).sum::<f64>();

        // Strategy parameters; c1 + cmu never exceeds one
        let nf = n as f64;
        let cc = (4.0 + mu_eff / nf) / (nf + 4.0 + 2.0 * mu_eff / nf);
        let cs = (mu_eff + 2.0) / (nf + mu_eff + 5.0);
        let c1 = 2.0 / ((nf + 1.3).powi(2) + mu_eff);
        let cmu = (1.0 - c1).min(2.0 * (mu_eff - 2.0 + 1.0 / mu_eff) / ((nf + 2.0).powi(2) + mu_eff));
        let damps = 1.0 + 2.0 * (0.0_f64).max(((mu_eff - 1.0) / (nf + 1.0)).sqrt() - 1.0) + cs;
        let expectation_norm = nf.sqrt() * (1.0 - 1.0 / (4.0 * nf) + 1.0 / (21.0 * nf * nf));

        let mut population = vec![0.0; lambda * n];
        let mut costs = vec![f64::NAN; lambda];
        let mut best_cost = f64::INFINITY;
        let mut best_params = mean.clone();
        let mut stagnation = 0;

        for generation in 0..setup.max_generations {
            let factor = match cholesky(&cov) {
                Some(factor) => factor,
                None => {
                    // numerically broken covariance, restart the adaptation
                    cov = identity(n);
                    pc.iter_mut().for_each(|v| *v = 0.0);
                    identity(n)
                }
            };

            // y = mean + sigma * L * z with C = L * L^T
            for offspring in population.chunks_mut(n) {
                let z: Vec<f64> = (0..n).map(|_| StandardNormal.sample(&mut rng)).collect();
                for i in 0..n {
                    let lz: f64 = factor[i][..=i].iter().zip(&z).map(|(l, zj)| l * zj).sum();
                    offspring[i] = mean[i] + sigma * lz;
                }
                clamp_to_bounds(offspring, setup.lower_bound, setup.upper_bound);
            }

            setup.objective.evaluate(&population, &mut costs)?;

            let previous_best = best_cost;
            if let Some(best) = best_index(&costs) {
                if costs[best] < best_cost {
                    best_cost = costs[best];
                    best_params.copy_from_slice(&population[best * n..(best + 1) * n]);
                }
            }

            progress.on_generation(generation + 1, best_cost);

            if previous_best - best_cost < setup.tolerance {
                stagnation += 1;
                if stagnation >= self.stagnation_limit {
                    break;
                }
            } else {
                stagnation = 0;
            }

            // NaN candidates rank last
            let mut indices: Vec<usize> = (0..lambda).collect();
            indices.sort_by(|&a, &b| {
                costs[a]
                    .is_nan()
                    .cmp(&costs[b].is_nan())
                    .then(costs[a].total_cmp(&costs[b]))
            });

            // Steps of the selected offspring in units of sigma
            let steps: Vec<Vec<f64>> = indices[..mu]
                .iter()
                .map(|&idx| {
                    population[idx * n..(idx + 1) * n]
                        .iter()
                        .zip(&mean)
                        .map(|(x, m)| (x - m) / sigma)
                        .collect()
                })
                .collect();

            let mean_shift: Vec<f64> = (0..n)
                .map(|j| weights.iter().zip(&steps).map(|(w, y)| w * y[j]).sum::<f64>())
                .collect();
            for j in 0..n {
                mean[j] += sigma * mean_shift[j];
            }

            let whitened = forward_substitute(&factor, &mean_shift);
            let ps_scale = (cs * (2.0 - cs) * mu_eff).sqrt();
            for i in 0..n {
                ps[i] = (1.0 - cs) * ps[i] + ps_scale * whitened[i];
            }
            let ps_norm = ps.iter().map(|x| x * x).sum::<f64>().sqrt();

            // Stall pc while the step size is growing fast
            let decay = 1.0 - (1.0 - cs).powi(2 * (generation as i32 + 1));
            let hsig = ps_norm / decay.sqrt() / expectation_norm < 1.4 + 2.0 / (nf + 1.0);
            let pc_scale = if hsig { (cc * (2.0 - cc) * mu_eff).sqrt() } else { 0.0 };
            for i in 0..n {
                pc[i] = (1.0 - cc) * pc[i] + pc_scale * mean_shift[i];
            }

            // Rank-one and rank-mu update
            let correction = if hsig { 0.0 } else { c1 * cc * (2.0 - cc) };
            for i in 0..n {
                for j in 0..=i {
                    let rank_mu: f64 = weights.iter().zip(&steps).map(|(w, y)| w * y[i] * y[j]).sum();
                    let updated = (1.0 - c1 - cmu + correction) * cov[i][j]
                        + c1 * pc[i] * pc[j]
                        + cmu * rank_mu;
                    cov[i][j] = updated;
                    cov[j][i] = updated;
                }
            }

            sigma *= ((cs / damps) * (ps_norm / expectation_norm - 1.0)).exp();

            if !sigma.is_finite() || sigma < f64::EPSILON {
                break;
            }
        }

        if !best_cost.is_finite() {
            return Err(SolveError::Failed("no offspring produced a finite fitness".into()));
        }

        setup.solution.copy_from_slice(&best_params);
        Ok(())
    }
}

fn identity(n: usize) -> Vec<Vec<f64>> {
    let mut m = vec![vec![0.0; n]; n];
    for (i, row) in m.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    m
}

/// Lower triangular `L` with `L * L^T = C`, `None` unless `C` is positive definite
fn cholesky(c: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = c.len();
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let dot: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();
            if i == j {
                let d = c[i][i] - dot;
                if d <= 0.0 || !d.is_finite() {
                    return None;
                }
                l[i][i] = d.sqrt();
            } else {
                l[i][j] = (c[i][j] - dot) / l[j][j];
            }
        }
    }
    Some(l)
}

/// Solve `L * x = b` for lower triangular `L`
fn forward_substitute(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let mut x = vec![0.0; b.len()];
    for i in 0..b.len() {
        let dot: f64 = (0..i).map(|k| l[i][k] * x[k]).sum();
        x[i] = (b[i] - dot) / l[i][i];
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::{ParallelConfig, ProblemObjective};
    use crate::problems::{Landscape, Problem};
    use approx::assert_relative_eq;

    #[test]
    fn test_default_lambda() {
        assert_eq!(CmaEsOptimizer::default_lambda(1), 4);
        assert_eq!(CmaEsOptimizer::default_lambda(10), 10);
    }

    fn sphere_fitness(population_size: usize, max_generations: usize) -> f64 {
        let problem = Problem::new(Landscape::Sphere, 3);
        let (lower, upper) = problem.bounds();
        let objective = ProblemObjective::new(&problem, ParallelConfig::default());
        let mut found = vec![f64::NAN; 3];

        let mut setup = SolverSetup {
            problem_size: 3,
            lower_bound: &lower,
            upper_bound: &upper,
            hints: &[],
            solution: &mut found,
            objective: &objective,
            max_generations,
            population_size,
            tolerance: f64::MIN_POSITIVE,
        };
        let mut progress = SolverProgress::default();
        CmaEsOptimizer::new().solve(&mut setup, &mut progress).unwrap();
        problem.fitness_untracked(&found)
    }

    #[test]
    fn test_cholesky_reconstructs_matrix() {
        let c = vec![vec![4.0, 2.0], vec![2.0, 3.0]];
        let l = cholesky(&c).unwrap();
        assert_relative_eq!(l[0][0], 2.0);
        assert_relative_eq!(l[1][0], 1.0);
        assert_relative_eq!(l[1][1], 2.0_f64.sqrt());
        assert_eq!(l[0][1], 0.0);

        let x = forward_substitute(&l, &[2.0, 1.0 + 2.0_f64.sqrt()]);
        assert_relative_eq!(x[0], 1.0);
        assert_relative_eq!(x[1], 1.0);

        assert!(cholesky(&[vec![1.0, 2.0], vec![2.0, 1.0]]).is_none());
        assert!(cholesky(&[vec![f64::NAN]]).is_none());
    }

    #[test]
    fn test_large_population_converges() {
        let small = sphere_fitness(7, 600);
        let large = sphere_fitness(100, 600);

        assert!(small < 1e-8, "population 7 reached {small:e}");
        assert!(large < 1e-8, "population 100 reached {large:e}");
        assert!(large <= small.max(1e-12), "{large:e} vs {small:e}");
    }

    #[test]
    fn test_cmaes_improves_on_start() {
        let problem = Problem::new(Landscape::Sphere, 3);
        let (lower, upper) = problem.bounds();
        let objective = ProblemObjective::new(&problem, ParallelConfig::default());
        let mut found = vec![f64::NAN; 3];

        let mut setup = SolverSetup {
            problem_size: 3,
            lower_bound: &lower,
            upper_bound: &upper,
            hints: &[],
            solution: &mut found,
            objective: &objective,
            max_generations: 200,
            population_size: 12,
            tolerance: f64::MIN_POSITIVE,
        };
        let mut progress = SolverProgress::default();
        CmaEsOptimizer::new().solve(&mut setup, &mut progress).unwrap();

        // the box centre scores 48 on the shifted sphere
        let fitness = problem.fitness_untracked(&found);
        assert!(fitness < 48.0);
        assert_eq!(fitness, progress.best_fitness);
        assert!(found.iter().all(|v| v.abs() <= 5.0));
        assert_eq!(problem.objective_calls().total, 12 * progress.generation as u64);
    }
}
