use clap::Parser;
use log::info;
use solverbench::benchmark::report;
use solverbench::{
    create_problem_collection, reference_registry, Aggregator, BenchmarkConfig, ConfigError,
    Problem,
};
use std::io::{self, Write};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(
    name = "solverbench",
    about = "Rank the bundled optimizers on the canonical benchmark landscapes"
)]
struct Cli {
    /// Dimensionality of every benchmark problem
    #[arg(default_value_t = 3)]
    problem_size: usize,

    /// Repetitions per solver and population size (overrides the config file)
    repetitions: Option<usize>,

    /// Evaluate only the problem with this catalog ordinal
    problem_ordinal: Option<usize>,

    /// Draw a new optimum position before every repetition
    #[arg(long)]
    randomize: bool,

    /// JSON benchmark configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of threads for batch evaluation (default: all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Seed for optimum randomization
    #[arg(long)]
    seed: Option<u64>,

    /// Append the StretchedSineV landscape to the catalog
    #[arg(long)]
    stretched_sine: bool,
}

fn build_config(args: &Cli) -> Result<BenchmarkConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => BenchmarkConfig::from_file(path)?,
        None => BenchmarkConfig::default(),
    };

    if let Some(repetitions) = args.repetitions {
        config = config.with_repetitions(repetitions);
    }
    if args.randomize {
        config = config.with_randomized_optimum(true);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if args.threads.is_some() {
        config.parallel.num_threads = args.threads;
    }

    config.validate()?;
    Ok(config)
}

/// Catalog ordinals to evaluate; an out-of-range selector is ignored
fn select_problems(count: usize, ordinal: Option<usize>) -> RangeInclusive<usize> {
    let all = 0..=count.saturating_sub(1);
    match ordinal {
        Some(n) if all.contains(&n) => n..=n,
        Some(_) => {
            println!("problem_ordinal_number out of bounds, ignoring it...");
            all
        }
        None => all,
    }
}

fn evaluate<W: Write>(
    aggregator: &mut Aggregator,
    problem: &Problem,
    ordinal: usize,
    out: &mut W,
) -> io::Result<()> {
    report::write_prolog(out, problem, ordinal)?;
    match aggregator.run(problem) {
        Ok(ranking) => report::write_ranking(out, &ranking)?,
        Err(e) => {
            info!("{}", e);
            report::write_unsolvable(out)?;
        }
    }
    report::write_epilog(out, problem)?;
    out.flush()
}

fn main() {
    env_logger::init();
    let args = Cli::parse();

    println!("Welcome to the solver benchmark.");
    println!();

    if args.problem_size == 0 {
        eprintln!("Error: problem_size must be greater than zero.");
        process::exit(2);
    }

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    if config.randomize_optimum {
        println!("Will randomize optimum solutions.");
    }

    config.parallel.install_global();
    info!(
        "Batch evaluation on {} threads, {} repetitions, population sizes {:?}",
        config.parallel.effective_threads(),
        config.repetitions,
        config.population_sizes
    );

    let problems = create_problem_collection(args.problem_size, args.stretched_sine);
    let selected = select_problems(problems.len(), args.problem_ordinal);
    let mut aggregator = Aggregator::new(config, reference_registry());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for ordinal in selected {
        if let Err(e) = evaluate(&mut aggregator, &problems[ordinal], ordinal, &mut out) {
            eprintln!("Error: failed to write report: {}", e);
            process::exit(1);
        }
    }
}
