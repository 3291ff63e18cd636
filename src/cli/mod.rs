//! Command-line parsing for the mode-choice estimator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{ModelKind, NullModel};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mc", version, about = "Car vs. rail mode-choice logit estimation and model comparison")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate the models, print parameter tables and the comparison, optionally export.
    Estimate(EstimateArgs),
    /// Print the comparison table only (useful for scripting).
    Compare(EstimateArgs),
    /// Re-print the comparison stored in a results JSON.
    Show(ShowArgs),
    /// Write a synthetic survey CSV drawn from known Full-model parameters.
    Simulate(SimulateArgs),
}

/// Common options for estimating and comparing.
#[derive(Debug, Parser, Clone)]
pub struct EstimateArgs {
    /// Survey CSV (columns CHOICE, TTRAIL, TCRAIL, OVTRAIL, CHANGES, TTCAR, TCCAR, OVTCAR, PURPOSE).
    #[arg(short = 'd', long, value_name = "CSV", env = "MODE_CHOICE_DATA")]
    pub data: PathBuf,

    /// Model(s) to estimate; repeat the flag for several. Defaults to all four.
    #[arg(short = 'm', long = "model", value_enum)]
    pub models: Vec<ModelKind>,

    /// Reference model for rho-squared.
    #[arg(long, value_enum, default_value_t = NullModel::Constants)]
    pub null: NullModel,

    /// Only use trips with this PURPOSE code.
    #[arg(long)]
    pub purpose: Option<i64>,

    /// Maximum Newton iterations per model.
    #[arg(long, default_value_t = 100)]
    pub max_iter: usize,

    /// Convergence tolerance on half the Newton decrement.
    #[arg(long, default_value_t = 1e-10)]
    pub tolerance: f64,

    /// Export the sorted comparison (with BIC, adjusted rho-squared, LR) to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export every estimation result to JSON.
    #[arg(long = "export-results", value_name = "JSON")]
    pub export_results: Option<PathBuf>,
}

/// Options for re-printing saved results.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Results JSON produced by `mc estimate --export-results`.
    #[arg(long, value_name = "JSON")]
    pub results: PathBuf,

    /// Also print every model's parameter table.
    #[arg(long)]
    pub params: bool,
}

/// Options for synthetic survey generation.
#[derive(Debug, Parser)]
pub struct SimulateArgs {
    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub out: PathBuf,

    /// Number of trips to generate.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub n_obs: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of distinct PURPOSE codes (drawn from 1..=N).
    #[arg(long, default_value_t = 4)]
    pub purposes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_args_parse_repeated_models() {
        let cli = Cli::try_parse_from([
            "mc", "estimate", "--data", "survey.csv", "-m", "full", "-m", "reduced2", "--null", "equal-shares",
        ])
        .unwrap();
        let Command::Estimate(args) = cli.command else {
            panic!("expected estimate");
        };
        assert_eq!(args.models, vec![ModelKind::Full, ModelKind::Reduced2]);
        assert_eq!(args.null, NullModel::EqualShares);
        assert_eq!(args.max_iter, 100);
        assert!(args.export.is_none());
    }

    #[test]
    fn simulate_defaults() {
        let cli = Cli::try_parse_from(["mc", "simulate", "--out", "s.csv"]).unwrap();
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.n_obs, 1000);
        assert_eq!(args.seed, 42);
        assert_eq!(args.purposes, 4);
    }
}
