use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Canonical benchmark fitness landscapes.
///
/// Each variant owns its formula, its symmetric box bound and the policy
/// that places its optimum. Counter state lives in [`super::Problem`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Landscape {
    /// De Jong 1
    Sphere,
    /// De Jong 2
    Rosenbrock,
    /// De Jong 3
    AbsoluteSum,
    DeJong4,
    Rastrigin,
    Schwefel,
    Griewank,
    Masters,
    StretchedSineV,
}

/// Where a landscape puts its optimum before any randomization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OptimumPlacement {
    /// Per-dimension optimum of the unshifted formula
    pub analytic: f64,
    /// Per-dimension offset subtracted from candidates before evaluation
    pub shift: f64,
}

/// Schwefel's optimum coordinate (unshifted)
pub const SCHWEFEL_OPTIMUM: f64 = 420.9687;

impl Landscape {
    /// Default catalog order; ordinals used by the driver index into this.
    pub const CATALOG: [Landscape; 8] = [
        Landscape::Sphere,
        Landscape::Rosenbrock,
        Landscape::AbsoluteSum,
        Landscape::DeJong4,
        Landscape::Rastrigin,
        Landscape::Schwefel,
        Landscape::Griewank,
        Landscape::Masters,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sphere => "Sphere",
            Self::Rosenbrock => "Rosenbrock",
            Self::AbsoluteSum => "AbsSum",
            Self::DeJong4 => "DeJong4",
            Self::Rastrigin => "Rastrigin",
            Self::Schwefel => "Schwefel",
            Self::Griewank => "Griewank",
            Self::Masters => "Masters",
            Self::StretchedSineV => "StretchedSineV",
        }
    }

    /// Upper bound of the symmetric per-dimension box `[-b, b]`
    pub fn upper_bound(&self) -> f64 {
        match self {
            Self::Sphere => 5.0,
            Self::Rosenbrock => 2.0,
            Self::AbsoluteSum => 2.0,
            Self::DeJong4 => 1.28,
            Self::Rastrigin => 5.12,
            Self::Schwefel => 512.0,
            Self::Griewank => 600.0,
            Self::Masters => 5.0,
            Self::StretchedSineV => 10.0,
        }
    }

    /// Smallest dimensionality for which the formula is meaningful
    pub fn min_dimensionality(&self) -> usize {
        match self {
            Self::Rosenbrock | Self::Masters | Self::StretchedSineV => 2,
            _ => 1,
        }
    }

    pub fn can_be_solved(&self, dimensionality: usize) -> bool {
        dimensionality >= self.min_dimensionality()
    }

    pub fn optimum_placement(&self) -> OptimumPlacement {
        match self {
            Self::Rosenbrock => OptimumPlacement {
                analytic: 1.0,
                shift: 0.0,
            },
            Self::AbsoluteSum | Self::DeJong4 => OptimumPlacement {
                analytic: 0.0,
                shift: -1.0,
            },
            Self::Schwefel => OptimumPlacement {
                analytic: SCHWEFEL_OPTIMUM,
                shift: 0.0,
            },
            // keeps lucky hits at the centre of the box from looking like convergence
            _ => OptimumPlacement {
                analytic: 0.0,
                shift: -4.0,
            },
        }
    }

    /// Schwefel's optimum sits at the analytic coordinate directly; its shift
    /// never moves.
    pub fn pins_shift(&self) -> bool {
        matches!(self, Self::Schwefel)
    }

    /// Evaluate the formula on `solution - shift`.
    pub fn evaluate(&self, solution: &[f64], shift: &[f64]) -> f64 {
        let adjusted = solution.iter().zip(shift).map(|(s, o)| s - o);

        match self {
            Self::Sphere => adjusted.map(|x| x * x).sum(),
            Self::Rosenbrock => pairwise(adjusted, |prev, cur| {
                let a = prev * prev - cur;
                let b = prev - 1.0;
                100.0 * a * a + b * b
            }),
            Self::AbsoluteSum => adjusted.map(f64::abs).sum(),
            Self::DeJong4 => adjusted
                .enumerate()
                .map(|(i, x)| (i + 1) as f64 * x.powi(4))
                .sum(),
            Self::Rastrigin => {
                let base = 10.0 * solution.len() as f64;
                base + adjusted
                    .map(|x| x * x - 10.0 * (2.0 * PI * x).cos())
                    .sum::<f64>()
            }
            Self::Schwefel => adjusted.map(|x| -x * x.abs().sqrt().sin()).sum(),
            Self::Griewank => {
                let mut sum = 0.0;
                let mut product = 1.0;
                for (i, x) in adjusted.enumerate() {
                    sum += x * x;
                    product *= (x / ((i + 1) as f64).sqrt()).cos();
                }
                1.0 + sum / 4000.0 - product
            }
            Self::Masters => -pairwise(adjusted, |prev, cur| {
                let q = prev * prev + cur * cur + 0.5 * prev * cur;
                (-q / 8.0).exp() * (4.0 * q.sqrt()).cos()
            }),
            Self::StretchedSineV => pairwise(adjusted, |prev, cur| {
                let sum = prev * prev + cur * cur;
                sum.powf(0.25) * ((50.0 * sum.powf(0.1)).sin().powi(2) + 1.0)
            }),
        }
    }
}

impl fmt::Display for Landscape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sum `term(x_i, x_{i+1})` over consecutive pairs
fn pairwise(mut values: impl Iterator<Item = f64>, term: impl Fn(f64, f64) -> f64) -> f64 {
    let Some(mut prev) = values.next() else {
        return 0.0;
    };

    let mut result = 0.0;
    for cur in values {
        result += term(prev, cur);
        prev = cur;
    }
    result
}
