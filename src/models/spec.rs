//! Utility specifications for the Baseline / Full / Reduced1 / Reduced2 models.
//!
//! Every specification draws from one shared parameter list. A model only
//! "owns" the parameters that actually appear in its utilities, so the
//! constants-only Baseline has a single free parameter while Full has eight.

use crate::domain::{Alternative, Column, ModelKind, Observation};

/// Name, starting value and fixed flag of a coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDef {
    pub name: &'static str,
    pub start: f64,
    /// Fixed parameters keep `start` and are not estimated.
    pub fixed: bool,
}

impl ParamDef {
    const fn free(name: &'static str) -> Self {
        Self {
            name,
            start: 0.0,
            fixed: false,
        }
    }

    const fn fixed(name: &'static str, value: f64) -> Self {
        Self {
            name,
            start: value,
            fixed: true,
        }
    }
}

pub const ASC_CAR: &str = "ASC_CAR";
pub const ASC_RAIL: &str = "ASC_RAIL";
pub const B_TTCAR: &str = "B_TTCAR";
pub const B_TCCAR: &str = "B_TCCAR";
pub const B_OVTCAR: &str = "B_OVTCAR";
pub const B_TTRAIL: &str = "B_TTRAIL";
pub const B_TCRAIL: &str = "B_TCRAIL";
pub const B_OVTRAIL: &str = "B_OVTRAIL";
pub const B_CHANGES: &str = "B_CHANGES";

/// Shared parameter list in reporting order.
///
/// `ASC_RAIL` is normalised to zero; only utility differences are identified.
pub const PARAMETERS: [ParamDef; 9] = [
    ParamDef::free(ASC_CAR),
    ParamDef::fixed(ASC_RAIL, 0.0),
    ParamDef::free(B_TTCAR),
    ParamDef::free(B_TCCAR),
    ParamDef::free(B_OVTCAR),
    ParamDef::free(B_TTRAIL),
    ParamDef::free(B_TCRAIL),
    ParamDef::free(B_OVTRAIL),
    ParamDef::free(B_CHANGES),
];

/// What a coefficient multiplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    /// Alternative-specific constant.
    One,
    Raw(Column),
    /// Natural log, with non-positive values mapped to zero.
    Log(Column),
}

impl Attribute {
    pub fn value(self, obs: &Observation) -> f64 {
        match self {
            Attribute::One => 1.0,
            Attribute::Raw(column) => obs.value(column),
            Attribute::Log(column) => log_or_zero(obs.value(column)),
        }
    }

    pub fn label(self) -> String {
        match self {
            Attribute::One => "1".to_string(),
            Attribute::Raw(column) => column.header().to_string(),
            Attribute::Log(column) => format!("log({})", column.header()),
        }
    }
}

/// `ln(x)` for positive `x`, otherwise `0`.
///
/// Zero costs (e.g. free parking, season tickets) would otherwise produce `-inf`.
pub fn log_or_zero(x: f64) -> f64 {
    if x > 0.0 { x.ln() } else { 0.0 }
}

/// `param × attribute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
    pub param: &'static str,
    pub attribute: Attribute,
}

const fn term(param: &'static str, attribute: Attribute) -> Term {
    Term { param, attribute }
}

/// Linear-in-parameters utilities for every alternative.
#[derive(Debug, Clone, PartialEq)]
pub struct UtilitySpec {
    pub kind: ModelKind,
    /// Indexed by `Alternative::index()`.
    pub utilities: [Vec<Term>; 2],
}

impl UtilitySpec {
    pub fn utility(&self, alternative: Alternative) -> &[Term] {
        &self.utilities[alternative.index()]
    }

    /// Parameters used by this specification, in `PARAMETERS` order.
    pub fn params(&self) -> Vec<ParamDef> {
        PARAMETERS
            .iter()
            .filter(|p| {
                self.utilities
                    .iter()
                    .flatten()
                    .any(|t| t.param == p.name)
            })
            .copied()
            .collect()
    }

    pub fn free_params(&self) -> Vec<ParamDef> {
        self.params().into_iter().filter(|p| !p.fixed).collect()
    }

    /// Render a utility as `ASC_CAR + B_TTCAR * TTCAR + ...`.
    pub fn formula(&self, alternative: Alternative) -> String {
        let parts: Vec<String> = self
            .utility(alternative)
            .iter()
            .map(|t| match t.attribute {
                Attribute::One => t.param.to_string(),
                other => format!("{} * {}", t.param, other.label()),
            })
            .collect();
        parts.join(" + ")
    }
}

/// Build the utility specification for a model kind.
pub fn spec_for(kind: ModelKind) -> UtilitySpec {
    use Attribute::{Log, One, Raw};

    let car_full = vec![
        term(ASC_CAR, One),
        term(B_TTCAR, Raw(Column::TtCar)),
        term(B_TCCAR, Raw(Column::TcCar)),
        term(B_OVTCAR, Raw(Column::OvtCar)),
    ];
    let rail_full = vec![
        term(ASC_RAIL, One),
        term(B_TTRAIL, Raw(Column::TtRail)),
        term(B_TCRAIL, Raw(Column::TcRail)),
        term(B_OVTRAIL, Raw(Column::OvtRail)),
        term(B_CHANGES, Raw(Column::Changes)),
    ];

    let utilities = match kind {
        ModelKind::Baseline => [vec![term(ASC_CAR, One)], vec![term(ASC_RAIL, One)]],
        ModelKind::Full => [car_full, rail_full],
        ModelKind::Reduced1 => {
            let rail = rail_full
                .into_iter()
                .filter(|t| t.param != B_OVTRAIL)
                .collect();
            [car_full, rail]
        }
        ModelKind::Reduced2 => {
            let car = car_full
                .into_iter()
                .map(|t| if t.param == B_TCCAR { term(B_TCCAR, Log(Column::TcCar)) } else { t })
                .collect();
            let rail = rail_full
                .into_iter()
                .map(|t| if t.param == B_TCRAIL { term(B_TCRAIL, Log(Column::TcRail)) } else { t })
                .collect();
            [car, rail]
        }
    };

    UtilitySpec { kind, utilities }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(params: &[ParamDef]) -> Vec<&'static str> {
        params.iter().map(|p| p.name).collect()
    }

    #[test]
    fn baseline_has_one_free_constant() {
        let spec = spec_for(ModelKind::Baseline);
        assert_eq!(names(&spec.params()), vec![ASC_CAR, ASC_RAIL]);
        assert_eq!(names(&spec.free_params()), vec![ASC_CAR]);
    }

    #[test]
    fn parameter_counts_per_model() {
        assert_eq!(spec_for(ModelKind::Full).free_params().len(), 8);
        assert_eq!(spec_for(ModelKind::Reduced1).free_params().len(), 7);
        assert_eq!(spec_for(ModelKind::Reduced2).free_params().len(), 8);
    }

    #[test]
    fn reduced1_drops_rail_out_of_vehicle_time() {
        let spec = spec_for(ModelKind::Reduced1);
        assert!(!names(&spec.params()).contains(&B_OVTRAIL));
        assert!(names(&spec.params()).contains(&B_OVTCAR));
    }

    #[test]
    fn reduced2_logs_costs_only() {
        let spec = spec_for(ModelKind::Reduced2);
        assert_eq!(
            spec.formula(Alternative::Car),
            "ASC_CAR + B_TTCAR * TTCAR + B_TCCAR * log(TCCAR) + B_OVTCAR * OVTCAR"
        );
        assert_eq!(
            spec.formula(Alternative::Rail),
            "ASC_RAIL + B_TTRAIL * TTRAIL + B_TCRAIL * log(TCRAIL) + B_OVTRAIL * OVTRAIL + B_CHANGES * CHANGES"
        );
    }

    #[test]
    fn log_or_zero_maps_non_positive_to_zero() {
        assert_eq!(log_or_zero(0.0), 0.0);
        assert_eq!(log_or_zero(-3.0), 0.0);
        assert!((log_or_zero(std::f64::consts::E) - 1.0).abs() < 1e-12);
    }
}
