//! CSV exports: the extended comparison table and survey observations.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{ComparisonRow, Observation};
use crate::error::AppError;

/// Write the sorted comparison table (with the extended statistics) to CSV.
pub fn write_comparison_csv(path: &Path, rows: &[ComparisonRow]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writeln!(
        file,
        "model,log_likelihood,aic,rho_squared,n_observations,n_params,bic,adjusted_rho_squared,likelihood_ratio"
    )
    .map_err(|e| AppError::input(format!("Failed to write export CSV header: {e}")))?;

    for r in rows {
        writeln!(
            file,
            "{},{:.6},{:.6},{:.6},{},{},{:.6},{:.6},{:.6}",
            r.display_name,
            r.log_likelihood,
            r.aic,
            r.rho_squared,
            r.n_obs,
            r.n_params,
            r.bic,
            r.adjusted_rho_squared,
            r.likelihood_ratio,
        )
        .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Write observations in the survey schema (readable by `load_observations`).
pub fn write_observations_csv(path: &Path, observations: &[Observation]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create survey CSV '{}': {e}", path.display())))?;

    writeln!(file, "CHOICE,TTRAIL,TCRAIL,OVTRAIL,CHANGES,TTCAR,TCCAR,OVTCAR,PURPOSE")
        .map_err(|e| AppError::input(format!("Failed to write survey CSV header: {e}")))?;

    for o in observations {
        writeln!(
            file,
            "{},{:.2},{:.2},{:.2},{},{:.2},{:.2},{:.2},{}",
            o.choice.code(),
            o.tt_rail,
            o.tc_rail,
            o.ovt_rail,
            o.changes,
            o.tt_car,
            o.tc_car,
            o.ovt_car,
            o.purpose,
        )
        .map_err(|e| AppError::input(format!("Failed to write survey CSV row: {e}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Alternative, ModelKind};
    use crate::io::ingest::load_observations;

    #[test]
    fn comparison_csv_has_one_line_per_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comparison.csv");
        let rows = vec![ComparisonRow {
            model: ModelKind::Full,
            display_name: "Full".to_string(),
            log_likelihood: -100.5,
            aic: 217.0,
            rho_squared: 0.25,
            n_obs: 300,
            n_params: 8,
            bic: 246.6,
            adjusted_rho_squared: 0.19,
            likelihood_ratio: 67.0,
        }];

        write_comparison_csv(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("model,log_likelihood,aic,rho_squared,n_observations"));
        assert!(lines[1].starts_with("Full,-100.500000,217.000000,0.250000,300,8,"));
    }

    #[test]
    fn survey_csv_is_readable_by_ingest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.csv");
        let observations = vec![Observation {
            line: 2,
            choice: Alternative::Rail,
            tt_rail: 41.5,
            tc_rail: 9.25,
            ovt_rail: 11.0,
            changes: 2.0,
            tt_car: 52.0,
            tc_car: 0.0,
            ovt_car: 3.5,
            purpose: 4,
        }];

        write_observations_csv(&path, &observations).unwrap();
        let data = load_observations(&path, None).unwrap();
        assert_eq!(data.observations, observations);
    }
}
