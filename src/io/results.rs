//! Read/write results JSON files.
//!
//! Results JSON is the "portable" representation of a run:
//! - every estimated model (parameters, standard errors, fit statistics)
//! - run metadata (data path, purpose filter, null model, timestamp)
//!
//! The schema is defined by `domain::ResultsFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::domain::{ResultsFile, RunConfig};
use crate::error::AppError;
use crate::fit::ModelComparison;

pub const TOOL_NAME: &str = "mc";

/// Assemble the results file for a finished comparison.
pub fn results_file(comparison: &ModelComparison, config: &RunConfig) -> ResultsFile {
    ResultsFile {
        tool: TOOL_NAME.to_string(),
        generated_at: Utc::now(),
        data_path: config.data_path.display().to_string(),
        purpose: config.purpose,
        null_model: comparison.null_model,
        null_log_likelihood: comparison.null_log_likelihood,
        models: comparison.results.clone(),
    }
}

/// Write a results JSON file.
pub fn write_results_json(path: &Path, results: &ResultsFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create results JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, results)
        .map_err(|e| AppError::input(format!("Failed to write results JSON: {e}")))?;

    Ok(())
}

/// Read a results JSON file.
pub fn read_results_json(path: &Path) -> Result<ResultsFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open results JSON '{}': {e}", path.display())))?;
    let results: ResultsFile =
        serde_json::from_reader(file).map_err(|e| AppError::input(format!("Invalid results JSON: {e}")))?;
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EstimationResult, FitStatistics, ModelKind, NullModel, ParameterEstimate};

    #[test]
    fn results_json_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");

        let results = ResultsFile {
            tool: TOOL_NAME.to_string(),
            generated_at: Utc::now(),
            data_path: "survey.csv".to_string(),
            purpose: Some(2),
            null_model: NullModel::EqualShares,
            null_log_likelihood: -69.31,
            models: vec![EstimationResult {
                model: ModelKind::Baseline,
                display_name: "Baseline".to_string(),
                parameters: vec![ParameterEstimate {
                    name: "ASC_CAR".to_string(),
                    value: 0.4,
                    std_error: 0.2,
                    t_stat: 2.0,
                    p_value: 0.0455,
                    fixed: false,
                }],
                statistics: FitStatistics::compute(-67.0, -69.31, -69.31, 1, 100),
                iterations: 4,
                converged: true,
                gradient_norm: 1e-12,
                predicted_shares: vec![0.6, 0.4],
            }],
        };

        write_results_json(&path, &results).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"null_model\": \"equal-shares\""));
        assert!(text.contains("\"model\": \"baseline\""));

        let back = read_results_json(&path).unwrap();
        assert_eq!(back.models.len(), 1);
        assert_eq!(back.models[0].parameters, results.models[0].parameters);
        assert_eq!(back.purpose, Some(2));
    }

    #[test]
    fn invalid_json_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = read_results_json(&path).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
    }
}
