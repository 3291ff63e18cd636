//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initialises logging
//! - parses CLI arguments
//! - runs estimation + comparison
//! - prints reports
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, EstimateArgs, ShowArgs, SimulateArgs};
use crate::domain::{ComparisonRow, ModelKind, RunConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `mc` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` may carry MODE_CHOICE_DATA and RUST_LOG; a missing file is fine.
    dotenvy::dotenv().ok();
    init_logging();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Estimate(args) => handle_estimate(args, OutputMode::Full),
        Command::Compare(args) => handle_estimate(args, OutputMode::ComparisonOnly),
        Command::Show(args) => handle_show(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("warn");
    // A second init (e.g. from tests) is harmless.
    let _ = env_logger::Builder::from_env(env).format_timestamp(None).try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    ComparisonOnly,
}

fn handle_estimate(args: EstimateArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let run = pipeline::run_estimation(&config)?;

    if mode == OutputMode::Full {
        println!("{}", crate::report::format_dataset_summary(&run.ingest, &config));
        println!("{}", crate::report::format_run_summary(&run.comparison));
    }

    println!("{}", crate::report::format_comparison(&run.comparison.rows));

    if let Some(path) = &config.export_comparison {
        crate::io::export::write_comparison_csv(path, &run.comparison.rows)?;
        log::info!("Wrote comparison CSV to '{}'", path.display());
    }
    if let Some(path) = &config.export_results {
        let results = crate::io::results::results_file(&run.comparison, &config);
        crate::io::results::write_results_json(path, &results)?;
        log::info!("Wrote results JSON to '{}'", path.display());
    }

    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let results = crate::io::results::read_results_json(&args.results)?;

    if args.params {
        for model in &results.models {
            println!("{}", crate::report::format_estimation(model));
        }
    }

    let mut rows: Vec<ComparisonRow> = results.models.iter().map(ComparisonRow::from).collect();
    crate::fit::sort_comparison(&mut rows);
    println!("{}", crate::report::format_comparison(&rows));
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let config = crate::data::SampleConfig {
        n_obs: args.n_obs,
        seed: args.seed,
        n_purposes: args.purposes,
    };
    let sample = crate::data::generate_sample(&config)?;
    crate::io::export::write_observations_csv(&args.out, &sample.observations)?;

    println!(
        "Wrote {} synthetic trips to '{}'. Generating parameters:",
        sample.observations.len(),
        args.out.display()
    );
    for (name, value) in &sample.parameters {
        println!("  {name:<10} {value:>8.4}");
    }
    Ok(())
}

pub fn run_config_from_args(args: &EstimateArgs) -> RunConfig {
    let models = if args.models.is_empty() {
        ModelKind::ALL.to_vec()
    } else {
        args.models.clone()
    };

    RunConfig {
        data_path: args.data.clone(),
        models,
        null_model: args.null,
        purpose: args.purpose,
        max_iterations: args.max_iter,
        tolerance: args.tolerance,
        export_comparison: args.export.clone(),
        export_results: args.export_results.clone(),
    }
}

/// Rewrite argv so `mc` defaults to `mc estimate`.
///
/// Rules:
/// - `mc -d survey.csv ...`    -> `mc estimate -d survey.csv ...`
/// - `mc`                      -> `mc estimate` (uses MODE_CHOICE_DATA)
/// - `mc --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("estimate".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "estimate" | "compare" | "show" | "simulate");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "estimate".to_string());
        return argv;
    }

    argv
}
