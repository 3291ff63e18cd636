//! Choice design: per-alternative design matrices for a utility specification.
//!
//! The estimator relies on two primitive operations:
//! - the systematic utility `V_nj = x_njᵀ β + c_nj` of each alternative
//! - the index of the chosen alternative
//!
//! `x_nj` holds the attribute multiplying each *free* parameter (zero when the
//! parameter does not enter alternative `j`); fixed parameters are folded into
//! the offset `c_nj`.

use nalgebra::{DMatrix, DVector};

use crate::domain::{Alternative, Observation};
use crate::error::AppError;
use crate::models::spec::{ParamDef, UtilitySpec};

#[derive(Debug, Clone)]
pub struct ChoiceDesign {
    pub free: Vec<ParamDef>,
    pub fixed: Vec<ParamDef>,
    /// One `n_obs × n_params` matrix per alternative.
    pub x: Vec<DMatrix<f64>>,
    /// One length-`n_obs` offset per alternative.
    pub offset: Vec<DVector<f64>>,
    pub chosen: Vec<usize>,
}

impl ChoiceDesign {
    pub fn n_obs(&self) -> usize {
        self.chosen.len()
    }

    pub fn n_params(&self) -> usize {
        self.free.len()
    }

    pub fn n_alternatives(&self) -> usize {
        self.x.len()
    }

    /// Starting values of the free parameters.
    pub fn start(&self) -> DVector<f64> {
        DVector::from_iterator(self.free.len(), self.free.iter().map(|p| p.start))
    }

    /// Fill `out[j] = V_ij` for observation `i`.
    ///
    /// # Panics
    /// Panics if `out.len() != n_alternatives()` or `beta.len() != n_params()`.
    pub fn fill_utilities(&self, beta: &DVector<f64>, i: usize, out: &mut [f64]) {
        for (j, v) in out.iter_mut().enumerate() {
            let x = &self.x[j];
            let mut acc = self.offset[j][i];
            for k in 0..beta.len() {
                acc += x[(i, k)] * beta[k];
            }
            *v = acc;
        }
    }

    /// `n_obs × n_alternatives` matrix of systematic utilities at `beta`.
    pub fn utilities(&self, beta: &DVector<f64>) -> DMatrix<f64> {
        let mut out = DMatrix::<f64>::zeros(self.n_obs(), self.n_alternatives());
        for j in 0..self.n_alternatives() {
            let col = &self.x[j] * beta + &self.offset[j];
            out.set_column(j, &col);
        }
        out
    }
}

/// Evaluate a specification's attributes on the observations.
pub fn build_design(spec: &UtilitySpec, observations: &[Observation]) -> Result<ChoiceDesign, AppError> {
    let params = spec.params();
    let free: Vec<ParamDef> = params.iter().filter(|p| !p.fixed).copied().collect();
    let fixed: Vec<ParamDef> = params.iter().filter(|p| p.fixed).copied().collect();

    let n = observations.len();
    let k = free.len();
    let mut x = Vec::with_capacity(Alternative::ALL.len());
    let mut offset = Vec::with_capacity(Alternative::ALL.len());

    for alternative in Alternative::ALL {
        let mut xj = DMatrix::<f64>::zeros(n, k);
        let mut cj = DVector::<f64>::zeros(n);

        for term in spec.utility(alternative) {
            let free_idx = free.iter().position(|p| p.name == term.param);
            let fixed_value = fixed.iter().find(|p| p.name == term.param).map(|p| p.start);

            for (i, obs) in observations.iter().enumerate() {
                let value = term.attribute.value(obs);
                if !value.is_finite() {
                    return Err(AppError::input(format!(
                        "Non-finite {} on line {} for model {}.",
                        term.attribute.label(),
                        obs.line,
                        spec.kind.display_name()
                    )));
                }
                match (free_idx, fixed_value) {
                    (Some(col), _) => xj[(i, col)] += value,
                    (None, Some(beta)) => cj[i] += beta * value,
                    (None, None) => {
                        return Err(AppError::input(format!(
                            "Unknown parameter `{}` in model {}.",
                            term.param,
                            spec.kind.display_name()
                        )));
                    }
                }
            }
        }

        x.push(xj);
        offset.push(cj);
    }

    let chosen = observations.iter().map(|o| o.choice.index()).collect();

    Ok(ChoiceDesign {
        free,
        fixed,
        x,
        offset,
        chosen,
    })
}
