//! Shared "estimation pipeline" logic used by the `estimate` and `compare` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load CSV -> validate -> estimate each model -> null LL -> statistics -> ranking
//!
//! The commands can then focus on presentation.

use crate::domain::RunConfig;
use crate::error::AppError;
use crate::fit::{EstimatorOptions, ModelComparison, estimate_and_compare};
use crate::io::ingest::{IngestedData, load_observations};

/// All computed outputs of a single `mc estimate` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub comparison: ModelComparison,
}

/// Execute the full estimation pipeline and return the computed outputs.
pub fn run_estimation(config: &RunConfig) -> Result<RunOutput, AppError> {
    let ingest = load_observations(&config.data_path, config.purpose)?;
    run_estimation_with_data(config, ingest)
}

/// Execute the estimation pipeline on already-loaded observations.
pub fn run_estimation_with_data(config: &RunConfig, ingest: IngestedData) -> Result<RunOutput, AppError> {
    if !(config.tolerance.is_finite() && config.tolerance > 0.0) {
        return Err(AppError::input("Tolerance must be a positive number."));
    }

    let opts = EstimatorOptions {
        max_iterations: config.max_iterations,
        tolerance: config.tolerance,
        ..EstimatorOptions::default()
    };

    let comparison = estimate_and_compare(&ingest.observations, &config.models, config.null_model, &opts)?;

    Ok(RunOutput { ingest, comparison })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SampleConfig, generate_sample};
    use crate::domain::{ModelKind, NullModel};
    use crate::io::ingest::compute_stats;
    use std::path::PathBuf;

    fn config() -> RunConfig {
        RunConfig {
            data_path: PathBuf::from("synthetic.csv"),
            models: ModelKind::ALL.to_vec(),
            null_model: NullModel::Constants,
            purpose: None,
            max_iterations: 100,
            tolerance: 1e-10,
            export_comparison: None,
            export_results: None,
        }
    }

    #[test]
    fn synthetic_full_model_beats_baseline() {
        let sample = generate_sample(&SampleConfig {
            n_obs: 1500,
            seed: 3,
            n_purposes: 2,
        })
        .unwrap();
        let ingest = IngestedData {
            stats: compute_stats(&sample.observations),
            rows_read: sample.observations.len(),
            observations: sample.observations,
            row_errors: Vec::new(),
            rows_filtered: 0,
        };

        let run = run_estimation_with_data(&config(), ingest).unwrap();
        let rows = &run.comparison.rows;
        assert_eq!(rows.len(), 4);
        assert_eq!(rows.last().unwrap().model, ModelKind::Baseline);

        for pair in rows.windows(2) {
            assert!(pair[0].aic <= pair[1].aic);
        }
        for r in rows {
            let expected = 1.0 - r.log_likelihood / run.comparison.null_log_likelihood;
            assert!((r.rho_squared - expected).abs() < 1e-12);
            assert!((r.aic - (2.0 * r.n_params as f64 - 2.0 * r.log_likelihood)).abs() < 1e-9);
        }
    }

    #[test]
    fn invalid_tolerance_is_rejected() {
        let ingest = IngestedData {
            observations: Vec::new(),
            stats: compute_stats(&[]),
            row_errors: Vec::new(),
            rows_read: 0,
            rows_filtered: 0,
        };
        let mut cfg = config();
        cfg.tolerance = 0.0;
        let err = run_estimation_with_data(&cfg, ingest).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
    }
}
