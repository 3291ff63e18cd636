//! CSV ingest and validation.
//!
//! This module is responsible for turning the survey export into a clean set
//! of `Observation`s that are safe to estimate on.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Separation of concerns**: no estimation logic here

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{Alternative, Column, Observation};
use crate::error::AppError;

pub const CHOICE: &str = "CHOICE";
pub const PURPOSE: &str = "PURPOSE";

/// Summary stats about the observations actually used for estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub n_obs: usize,
    /// Observed choice counts indexed by `Alternative::index()`.
    pub choice_counts: [usize; 2],
    pub purpose_counts: BTreeMap<i64, usize>,
}

impl DatasetStats {
    pub fn share(&self, alternative: Alternative) -> f64 {
        if self.n_obs == 0 {
            return f64::NAN;
        }
        self.choice_counts[alternative.index()] as f64 / self.n_obs as f64
    }
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: validated observations + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub observations: Vec<Observation>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    /// Rows dropped by the purpose filter (not errors).
    pub rows_filtered: usize,
}

/// Load and validate a survey CSV, optionally keeping only one trip purpose.
pub fn load_observations(path: &Path, purpose: Option<i64>) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let data = read_observations(file, purpose)?;
    log::info!(
        "Loaded {} observations from '{}' ({} rows read, {} row errors, {} filtered)",
        data.stats.n_obs,
        path.display(),
        data.rows_read,
        data.row_errors.len(),
        data.rows_filtered
    );
    Ok(data)
}

/// Parse observations from any reader (file, in-memory buffer).
pub fn read_observations<R: Read>(reader: R, purpose: Option<i64>) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut observations = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_filtered = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, which is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map, line) {
            Ok(obs) => {
                if purpose.is_some_and(|p| p != obs.purpose) {
                    rows_filtered += 1;
                } else {
                    observations.push(obs);
                }
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    for err in row_errors.iter().take(10) {
        log::warn!("Skipping line {}: {}", err.line, err.message);
    }
    if row_errors.len() > 10 {
        log::warn!("... and {} more invalid rows", row_errors.len() - 10);
    }

    if observations.is_empty() {
        return Err(AppError::data(match purpose {
            Some(p) => format!("No valid rows remain for PURPOSE={p}."),
            None => "No valid rows remain after validation.".to_string(),
        }));
    }

    let stats = compute_stats(&observations);

    Ok(IngestedData {
        observations,
        stats,
        row_errors,
        rows_read,
        rows_filtered,
    })
}

pub fn compute_stats(observations: &[Observation]) -> DatasetStats {
    let mut choice_counts = [0usize; 2];
    let mut purpose_counts = BTreeMap::new();
    for obs in observations {
        choice_counts[obs.choice.index()] += 1;
        *purpose_counts.entry(obs.purpose).or_insert(0) += 1;
    }
    DatasetStats {
        n_obs: observations.len(),
        choice_counts,
        purpose_counts,
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_uppercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = std::iter::once(CHOICE)
        .chain(Column::ALL.iter().map(|c| c.header()))
        .chain(std::iter::once(PURPOSE))
        .filter(|name| !header_map.contains_key(*name))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::input(format!(
            "Missing required column(s): {}",
            missing.join(", ")
        )))
    }
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>, line: usize) -> Result<Observation, String> {
    let choice_code = get_f64(record, header_map, CHOICE)?;
    let choice = Alternative::from_code(choice_code)
        .ok_or_else(|| format!("Invalid `{CHOICE}` value {choice_code} (expected 0 = car or 1 = rail)."))?;

    let purpose_raw = get_f64(record, header_map, PURPOSE)?;
    if purpose_raw.fract() != 0.0 {
        return Err(format!("Invalid `{PURPOSE}` value {purpose_raw} (expected an integer code)."));
    }

    Ok(Observation {
        line,
        choice,
        tt_rail: get_f64(record, header_map, Column::TtRail.header())?,
        tc_rail: get_f64(record, header_map, Column::TcRail.header())?,
        ovt_rail: get_f64(record, header_map, Column::OvtRail.header())?,
        changes: get_f64(record, header_map, Column::Changes.header())?,
        tt_car: get_f64(record, header_map, Column::TtCar.header())?,
        tc_car: get_f64(record, header_map, Column::TcCar.header())?,
        ovt_car: get_f64(record, header_map, Column::OvtCar.header())?,
        purpose: purpose_raw as i64,
    })
}

fn get_f64(record: &StringRecord, header_map: &HashMap<String, usize>, key: &str) -> Result<f64, String> {
    let raw = header_map
        .get(key)
        .and_then(|&idx| record.get(idx))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing `{key}` value."))?;
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("Invalid `{key}` value '{raw}'."))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("Non-finite `{key}` value '{raw}'."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "CHOICE,TTRAIL,TCRAIL,OVTRAIL,CHANGES,TTCAR,TCCAR,OVTCAR,PURPOSE";

    #[test]
    fn parses_valid_rows_case_insensitively() {
        let csv = "\u{feff}choice, ttrail,tcrail,ovtrail,changes,ttcar,tccar,ovtcar,purpose,extra\n\
                   0,40,10,12,1,30,5,4,1,x\n\
                   1.0,35,8,10,0,45,6,3,2,y\n";
        let data = read_observations(csv.as_bytes(), None).unwrap();

        assert_eq!(data.rows_read, 2);
        assert!(data.row_errors.is_empty());
        assert_eq!(data.observations[0].choice, Alternative::Car);
        assert_eq!(data.observations[1].choice, Alternative::Rail);
        assert_eq!(data.observations[1].line, 3);
        assert_eq!(data.observations[1].tt_car, 45.0);
        assert_eq!(data.stats.choice_counts, [1, 1]);
        assert_eq!(data.stats.purpose_counts.get(&2), Some(&1));
    }

    #[test]
    fn invalid_rows_are_reported_and_skipped() {
        let csv = format!(
            "{HEADER}\n0,40,10,12,1,30,5,4,1\n2,40,10,12,1,30,5,4,1\n1,abc,10,12,1,30,5,4,1\n1,40,10,12,1,30,5,4,1.5\n1,40,,12,1,30,5,4,1\n"
        );
        let data = read_observations(csv.as_bytes(), None).unwrap();

        assert_eq!(data.rows_read, 5);
        assert_eq!(data.observations.len(), 1);
        let lines: Vec<usize> = data.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5, 6]);
        assert!(data.row_errors[0].message.contains("CHOICE"));
    }

    #[test]
    fn missing_columns_fail_with_input_error() {
        let csv = "CHOICE,TTRAIL,TCRAIL\n0,1,2\n";
        let err = read_observations(csv.as_bytes(), None).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
        assert!(err.message().contains("OVTRAIL"));
        assert!(err.message().contains("PURPOSE"));
    }

    #[test]
    fn purpose_filter_keeps_matching_trips() {
        let csv = format!("{HEADER}\n0,40,10,12,1,30,5,4,1\n1,40,10,12,1,30,5,4,2\n1,41,10,12,1,30,5,4,2\n");
        let data = read_observations(csv.as_bytes(), Some(2)).unwrap();
        assert_eq!(data.observations.len(), 2);
        assert_eq!(data.rows_filtered, 1);

        let err = read_observations(csv.as_bytes(), Some(9)).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "1,40,10,12,1,30,5,4,3").unwrap();
        let data = load_observations(file.path(), None).unwrap();
        assert_eq!(data.stats.n_obs, 1);

        let err = load_observations(Path::new("/definitely/not/here.csv"), None).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
    }
}
