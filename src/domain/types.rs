//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during estimation
//! - exported to JSON/CSV
//! - reloaded later for re-printing comparisons

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A travel mode the respondent could choose.
///
/// The survey codes `CHOICE` as `0 = car`, `1 = rail`; the enum index matches
/// that code so it can be used directly as a position in per-alternative arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alternative {
    Car,
    Rail,
}

impl Alternative {
    pub const ALL: [Alternative; 2] = [Alternative::Car, Alternative::Rail];

    pub fn index(self) -> usize {
        match self {
            Alternative::Car => 0,
            Alternative::Rail => 1,
        }
    }

    /// Map a survey `CHOICE` code to an alternative.
    pub fn from_code(code: f64) -> Option<Self> {
        if code == 0.0 {
            Some(Alternative::Car)
        } else if code == 1.0 {
            Some(Alternative::Rail)
        } else {
            None
        }
    }

    pub fn code(self) -> u8 {
        self.index() as u8
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Alternative::Car => "Car",
            Alternative::Rail => "Rail",
        }
    }
}

/// Numeric survey attributes that utilities can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Column {
    TtRail,
    TcRail,
    OvtRail,
    Changes,
    TtCar,
    TcCar,
    OvtCar,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::TtRail,
        Column::TcRail,
        Column::OvtRail,
        Column::Changes,
        Column::TtCar,
        Column::TcCar,
        Column::OvtCar,
    ];

    /// Header name in the survey file.
    pub fn header(self) -> &'static str {
        match self {
            Column::TtRail => "TTRAIL",
            Column::TcRail => "TCRAIL",
            Column::OvtRail => "OVTRAIL",
            Column::Changes => "CHANGES",
            Column::TtCar => "TTCAR",
            Column::TcCar => "TCCAR",
            Column::OvtCar => "OVTCAR",
        }
    }
}

/// One surveyed trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// 1-based line in the source file (header is line 1).
    pub line: usize,
    pub choice: Alternative,
    pub tt_rail: f64,
    pub tc_rail: f64,
    pub ovt_rail: f64,
    pub changes: f64,
    pub tt_car: f64,
    pub tc_car: f64,
    pub ovt_car: f64,
    pub purpose: i64,
}

impl Observation {
    pub fn value(&self, column: Column) -> f64 {
        match column {
            Column::TtRail => self.tt_rail,
            Column::TcRail => self.tc_rail,
            Column::OvtRail => self.ovt_rail,
            Column::Changes => self.changes,
            Column::TtCar => self.tt_car,
            Column::TcCar => self.tc_car,
            Column::OvtCar => self.ovt_car,
        }
    }
}

/// The four utility specifications compared by the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Alternative-specific constants only.
    Baseline,
    /// Constants plus every time, cost and transfer attribute.
    Full,
    /// Full without rail out-of-vehicle time.
    Reduced1,
    /// Full with log-transformed costs.
    Reduced2,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::Baseline,
        ModelKind::Full,
        ModelKind::Reduced1,
        ModelKind::Reduced2,
    ];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Baseline => "Baseline",
            ModelKind::Full => "Full",
            ModelKind::Reduced1 => "Reduced1",
            ModelKind::Reduced2 => "Reduced2",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ModelKind::Baseline => "alternative-specific constants only",
            ModelKind::Full => "all travel time, cost, out-of-vehicle time and transfer attributes",
            ModelKind::Reduced1 => "full model without rail out-of-vehicle time",
            ModelKind::Reduced2 => "full model with log-transformed travel costs",
        }
    }

    /// Position in the canonical specification order (used as a final sort tiebreak).
    pub fn order(self) -> usize {
        match self {
            ModelKind::Baseline => 0,
            ModelKind::Full => 1,
            ModelKind::Reduced1 => 2,
            ModelKind::Reduced2 => 3,
        }
    }
}

/// Which reference log-likelihood rho-squared is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NullModel {
    /// Log-likelihood of the estimated constants-only (Baseline) model.
    Constants,
    /// Log-likelihood when every alternative is equally likely: `N · ln(1/J)`.
    EqualShares,
}

impl NullModel {
    pub fn display_name(self) -> &'static str {
        match self {
            NullModel::Constants => "constants-only",
            NullModel::EqualShares => "equal shares",
        }
    }
}

/// A single estimated (or fixed) coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterEstimate {
    pub name: String,
    pub value: f64,
    /// Asymptotic standard error (NaN for fixed parameters or singular information).
    #[serde(with = "nan_as_null")]
    pub std_error: f64,
    #[serde(with = "nan_as_null")]
    pub t_stat: f64,
    #[serde(with = "nan_as_null")]
    pub p_value: f64,
    pub fixed: bool,
}

/// Likelihood-based fit statistics for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitStatistics {
    pub log_likelihood: f64,
    pub null_log_likelihood: f64,
    /// Log-likelihood at the starting values.
    pub initial_log_likelihood: f64,
    /// Number of free (estimated) parameters.
    pub n_params: usize,
    pub n_obs: usize,
    pub aic: f64,
    pub bic: f64,
    #[serde(with = "nan_as_null")]
    pub rho_squared: f64,
    #[serde(with = "nan_as_null")]
    pub adjusted_rho_squared: f64,
    /// `-2 (LL0 - LL)`.
    pub likelihood_ratio: f64,
}

/// Estimation output for a single model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimationResult {
    pub model: ModelKind,
    pub display_name: String,
    pub parameters: Vec<ParameterEstimate>,
    pub statistics: FitStatistics,
    pub iterations: usize,
    pub converged: bool,
    /// Largest absolute gradient component at the final estimate.
    pub gradient_norm: f64,
    /// Sample-average predicted probability per alternative (car, rail).
    pub predicted_shares: Vec<f64>,
}

/// One line of the model comparison table.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub model: ModelKind,
    pub display_name: String,
    pub log_likelihood: f64,
    pub aic: f64,
    pub rho_squared: f64,
    pub n_obs: usize,
    pub n_params: usize,
    pub bic: f64,
    pub adjusted_rho_squared: f64,
    pub likelihood_ratio: f64,
}

impl From<&EstimationResult> for ComparisonRow {
    fn from(result: &EstimationResult) -> Self {
        let s = &result.statistics;
        Self {
            model: result.model,
            display_name: result.display_name.clone(),
            log_likelihood: s.log_likelihood,
            aic: s.aic,
            rho_squared: s.rho_squared,
            n_obs: s.n_obs,
            n_params: s.n_params,
            bic: s.bic,
            adjusted_rho_squared: s.adjusted_rho_squared,
            likelihood_ratio: s.likelihood_ratio,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and `.env`).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_path: PathBuf,
    /// Specifications to estimate, in canonical order.
    pub models: Vec<ModelKind>,
    pub null_model: NullModel,
    /// Keep only trips with this purpose code.
    pub purpose: Option<i64>,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub export_comparison: Option<PathBuf>,
    pub export_results: Option<PathBuf>,
}

/// A saved results file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub data_path: String,
    pub purpose: Option<i64>,
    pub null_model: NullModel,
    pub null_log_likelihood: f64,
    pub models: Vec<EstimationResult>,
}

/// JSON has no NaN: write it as `null` and read `null` back as NaN.
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_codes_map_to_alternatives() {
        assert_eq!(Alternative::from_code(0.0), Some(Alternative::Car));
        assert_eq!(Alternative::from_code(1.0), Some(Alternative::Rail));
        assert_eq!(Alternative::from_code(2.0), None);
        assert_eq!(Alternative::from_code(0.5), None);
        for alt in Alternative::ALL {
            assert_eq!(Alternative::from_code(alt.code() as f64), Some(alt));
        }
    }

    #[test]
    fn nan_statistics_survive_json() {
        let p = ParameterEstimate {
            name: "ASC_RAIL".to_string(),
            value: 0.0,
            std_error: f64::NAN,
            t_stat: f64::NAN,
            p_value: f64::NAN,
            fixed: true,
        };
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"std_error\":null"));
        let back: ParameterEstimate = serde_json::from_str(&json).unwrap();
        assert!(back.std_error.is_nan() && back.p_value.is_nan());
        assert!(back.fixed);
    }

    #[test]
    fn model_order_matches_all() {
        for (i, kind) in ModelKind::ALL.iter().enumerate() {
            assert_eq!(kind.order(), i);
        }
    }
}
