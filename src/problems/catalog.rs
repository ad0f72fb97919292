use super::landscape::Landscape;
use super::problem::Problem;

/// Build the benchmark catalog for one dimensionality.
///
/// Order follows [`Landscape::CATALOG`]; the optional stretched sine landscape
/// is appended last so the ordinals of the default catalog stay stable.
pub fn create_problem_collection(dimensionality: usize, include_stretched_sine: bool) -> Vec<Problem> {
    let mut problems: Vec<Problem> = Landscape::CATALOG
        .iter()
        .map(|&landscape| Problem::new(landscape, dimensionality))
        .collect();

    if include_stretched_sine {
        problems.push(Problem::new(Landscape::StretchedSineV, dimensionality));
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_collection() {
        let problems = create_problem_collection(3, false);
        let names: Vec<&str> = problems.iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            [
                "Sphere",
                "Rosenbrock",
                "AbsSum",
                "DeJong4",
                "Rastrigin",
                "Schwefel",
                "Griewank",
                "Masters"
            ]
        );
        assert!(problems.iter().all(|p| p.dimensionality() == 3));
    }

    #[test]
    fn test_stretched_sine_is_appended() {
        let problems = create_problem_collection(2, true);
        assert_eq!(problems.len(), 9);
        assert_eq!(problems[8].landscape(), Landscape::StretchedSineV);
    }

    #[test]
    fn test_unsolvable_members_at_dimension_one() {
        let unsolvable: Vec<&str> = create_problem_collection(1, true)
            .iter()
            .filter(|p| !p.can_be_solved())
            .map(|p| p.name())
            .collect();
        assert_eq!(unsolvable, ["Rosenbrock", "Masters", "StretchedSineV"]);
    }
}
