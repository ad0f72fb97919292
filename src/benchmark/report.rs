//! Semicolon-separated text report of a ranking.
//!
//! One title row, one header row and one row per ranked result. Each row
//! starts with the fail count and `avg ± stddev` summaries, followed by
//! seven blocks (average, standard deviation, minimum, Q25, median, Q75,
//! maximum) of every tracked metric and every parameter.

use super::aggregator::Ranking;
use super::result::BenchmarkResult;
use crate::core::{Samples, Stats};
use crate::problems::Problem;
use std::io::{self, Write};

const BLOCKS: [(&str, fn(&Stats) -> f64); 7] = [
    ("Average", |s| s.avg),
    ("Standard Deviation", |s| s.stddev),
    ("Minimum", |s| s.min),
    ("Q25", |s| s.q25),
    ("Median", |s| s.median),
    ("Q75", |s| s.q75),
    ("Maximum", |s| s.max),
];

/// Digits needed to round-trip an f64
const FULL_PRECISION: usize = 16;

pub fn write_prolog<W: Write>(out: &mut W, problem: &Problem, ordinal: usize) -> io::Result<()> {
    let (optimum, fitness) = problem.optimum();
    writeln!(
        out,
        "--=== Evaluating solvers on {} with problem size = {}... ===--",
        problem.name(),
        problem.dimensionality()
    )?;
    writeln!(out, "Problem ordinal number: {}", ordinal)?;
    writeln!(
        out,
        "upper_bound[0]={:.3}, optimum_analytical_parameter[0]={:.3}, optimum_fitness={:.3}",
        problem.upper_bound(),
        optimum.first().copied().unwrap_or(f64::NAN),
        fitness
    )?;
    writeln!(out)
}

pub fn write_epilog<W: Write>(out: &mut W, problem: &Problem) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "--=== {} evaluation completed. ===--", problem.name())?;
    writeln!(out)
}

pub fn write_unsolvable<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "This problem cannot be solved with the chosen problem size.")
}

pub fn write_ranking<W: Write>(out: &mut W, ranking: &Ranking) -> io::Result<()> {
    if let Some(stats) = &ranking.optimum_fitness {
        writeln!(
            out,
            "randomized optimum_fitness={} +/- {}",
            stats.avg, stats.stddev
        )?;
        writeln!(out)?;
    }

    let (title, header) = header_lines(ranking.dimensionality);
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", header)?;

    for result in &ranking.results {
        write_row(out, result)?;
    }
    Ok(())
}

fn header_lines(dimensionality: usize) -> (String, String) {
    let mut title = String::from("general;;;;;;;;");
    let mut header =
        String::from("solver; fails; param_err; fitness_err; least_calls; lc_001; param_err001; ");

    for (name, _) in BLOCKS {
        title.push_str(name);
        title.push_str(";;;;;;;;;");
        header.push_str("; fitness; fitness_err; param_err; time; total calls; least calls; lc_001; pe_001; ");
        for i in 0..dimensionality {
            title.push_str("; ");
            header.push_str(&format!("{}; ", i));
        }
    }
    (title, header)
}

fn write_row<W: Write>(out: &mut W, result: &BenchmarkResult) -> io::Result<()> {
    write!(out, "{}; {}; ", result.name, result.fail_count)?;

    for samples in [
        &result.abs_parameter_error,
        &result.fitness_error,
        &result.least_calls,
        &result.least_calls_001,
        &result.abs_parameter_error_001,
    ] {
        let stats = samples.stats();
        write!(out, "{:.3e} ± {:.3e}; ", stats.avg, stats.stddev)?;
    }
    write!(out, ";")?;

    for (_, pick) in BLOCKS {
        write_block(out, result, pick)?;
    }
    writeln!(out)
}

fn write_block<W: Write>(
    out: &mut W,
    result: &BenchmarkResult,
    pick: fn(&Stats) -> f64,
) -> io::Result<()> {
    let value = |samples: &Samples| pick(samples.stats());

    write!(out, "{:.*e}; ", FULL_PRECISION, value(&result.fitness))?;
    write!(out, "{:.*e}; ", FULL_PRECISION, value(&result.fitness_error))?;
    write!(out, "{:.*e}; ", FULL_PRECISION, value(&result.abs_parameter_error))?;
    write!(out, "{:.3e}; ", value(&result.seconds))?;
    write!(out, "{:.*e}; ", FULL_PRECISION, value(&result.total_calls))?;
    write!(out, "{:.*e}; ", FULL_PRECISION, value(&result.least_calls))?;
    write!(out, "{:.*e}; ", FULL_PRECISION, value(&result.least_calls_001))?;
    write!(out, "{:.*e}", FULL_PRECISION, value(&result.abs_parameter_error_001))?;

    for parameter in &result.parameters {
        write!(out, "; {:.*e}", FULL_PRECISION, value(parameter))?;
    }
    write!(out, ";;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::result::RunRecord;
    use crate::problems::Landscape;
    use crate::solvers::SolverDescriptor;

    fn ranking() -> Ranking {
        let mut result = BenchmarkResult::new(&SolverDescriptor::new("pso", "PSO"), 7, 2);
        result.record(&RunRecord {
            seconds: 0.25,
            total_calls: 70,
            least_calls: 70,
            least_calls_001: 21,
            fitness: 0.5,
            optimum_fitness: 0.0,
            parameters: vec![1.0, 2.0],
            optimum: vec![1.0, 1.5],
            params_001: vec![],
        });
        result.calculate_stats();

        Ranking {
            problem: "Sphere".into(),
            dimensionality: 2,
            results: vec![result],
            optimum_fitness: None,
        }
    }

    #[test]
    fn test_header_has_a_column_per_parameter() {
        let (title, header) = header_lines(2);
        assert!(title.starts_with("general;;;;;;;;Average;;;;;;;;;; ; "));
        assert!(header.starts_with("solver; fails; param_err;"));
        assert_eq!(header.matches("pe_001").count(), 7);
        assert_eq!(header.matches("; 1; ").count(), 7);
    }

    #[test]
    fn test_row_layout() {
        let mut out = Vec::new();
        write_ranking(&mut out, &ranking()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let row = text.lines().last().unwrap();

        assert!(row.starts_with("PSO_7; 0; 2.500e-1 ± 5.000e-1; 5.000e-1 ± 0.000e0; "));
        assert!(row.ends_with(";;"));
        // never reached 0.001, so the last summary is NaN
        assert!(row.contains("NaN ± NaN; ;"));
        assert_eq!(row.matches(";;").count(), 7);
        assert!(!text.contains("randomized"));
    }

    #[test]
    fn test_prolog_and_unsolvable() {
        let problem = Problem::new(Landscape::Sphere, 3);
        let mut out = Vec::new();
        write_prolog(&mut out, &problem, 0).unwrap();
        write_unsolvable(&mut out).unwrap();
        write_epilog(&mut out, &problem).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("--=== Evaluating solvers on Sphere with problem size = 3... ===--\n"));
        assert!(text.contains("upper_bound[0]=5.000, optimum_analytical_parameter[0]=-4.000, optimum_fitness=0.000"));
        assert!(text.contains("--=== Sphere evaluation completed. ===--"));
    }
}
