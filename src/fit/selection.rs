//! Model comparison (Baseline vs Full vs Reduced1 vs Reduced2).
//!
//! The tool estimates each selected specification and computes:
//! - final / initial / null log-likelihood
//! - AIC, BIC, ρ², ρ̄² and the LR statistic against the null model
//!
//! Comparison rules:
//! 1. Skip underdetermined models: require `n >= k + 1`
//! 2. Skip (with the reason) models whose estimation fails
//! 3. Sort by ascending AIC, then descending ρ², then specification order

use std::cmp::Ordering;

use crate::domain::{
    Alternative, ComparisonRow, EstimationResult, FitStatistics, ModelKind, NullModel, Observation,
    ParameterEstimate,
};
use crate::error::AppError;
use crate::fit::estimator::{EstimatorOptions, MaxLikelihoodFit, estimate};
use crate::math::pvalue_two_sided;
use crate::models::{ChoiceDesign, build_design, spec_for};

/// Minimum number of extra observations beyond parameter count.
const MIN_N_BUFFER: usize = 1;

/// Output of estimation + comparison.
#[derive(Debug, Clone)]
pub struct ModelComparison {
    /// Results for every estimated model, in specification order.
    pub results: Vec<EstimationResult>,
    /// Comparison rows, sorted best first.
    pub rows: Vec<ComparisonRow>,
    /// Models that were skipped and why.
    pub skipped: Vec<(ModelKind, String)>,
    pub null_model: NullModel,
    pub null_log_likelihood: f64,
}

/// Estimate every requested model and rank them.
pub fn estimate_and_compare(
    observations: &[Observation],
    models: &[ModelKind],
    null_model: NullModel,
    opts: &EstimatorOptions,
) -> Result<ModelComparison, AppError> {
    if models.is_empty() {
        return Err(AppError::input("No models selected."));
    }
    let n = observations.len();

    // Under the constants null the Baseline fit doubles as the reference model.
    let (null_ll, mut baseline_fit) = match null_model {
        NullModel::Constants => {
            let fitted = fit_model(ModelKind::Baseline, observations, opts)?;
            (fitted.1.log_likelihood, Some(fitted))
        }
        NullModel::EqualShares => (null_log_likelihood(observations, null_model, opts)?, None),
    };
    log::info!("Null log-likelihood ({}): {null_ll:.4}", null_model.display_name());

    let mut kinds = models.to_vec();
    kinds.sort_by_key(|k| k.order());
    kinds.dedup();

    let mut results = Vec::new();
    let mut skipped = Vec::new();

    for kind in kinds {
        let k = spec_for(kind).free_params().len();
        if n < k + MIN_N_BUFFER {
            log::warn!("Skipping {}: {n} observations for {k} parameters", kind.display_name());
            skipped.push((
                kind,
                format!("Underdetermined: n={n} < k+{MIN_N_BUFFER}={}", k + MIN_N_BUFFER),
            ));
            continue;
        }

        let fitted = match baseline_fit.take_if(|_| kind == ModelKind::Baseline) {
            Some(fitted) => Ok(fitted),
            None => fit_model(kind, observations, opts),
        };
        match fitted.map(|(design, fit)| assemble_result(kind, &design, &fit, null_ll)) {
            Ok(result) => results.push(result),
            Err(err) => {
                log::warn!("Skipping {}: {err}", kind.display_name());
                skipped.push((kind, err.message().to_string()));
            }
        }
    }

    if results.is_empty() {
        return Err(AppError::data("No model could be estimated."));
    }

    let mut rows: Vec<ComparisonRow> = results.iter().map(ComparisonRow::from).collect();
    sort_comparison(&mut rows);

    Ok(ModelComparison {
        results,
        rows,
        skipped,
        null_model,
        null_log_likelihood: null_ll,
    })
}

/// Reference log-likelihood for ρ².
pub fn null_log_likelihood(
    observations: &[Observation],
    null_model: NullModel,
    opts: &EstimatorOptions,
) -> Result<f64, AppError> {
    if observations.is_empty() {
        return Err(AppError::data("No observations to estimate."));
    }
    match null_model {
        NullModel::EqualShares => {
            let j = Alternative::ALL.len() as f64;
            Ok(observations.len() as f64 * (1.0 / j).ln())
        }
        NullModel::Constants => {
            let (_, fit) = fit_model(ModelKind::Baseline, observations, opts)?;
            Ok(fit.log_likelihood)
        }
    }
}

/// Estimate a single specification and assemble its reported result.
pub fn estimate_model(
    kind: ModelKind,
    observations: &[Observation],
    null_log_likelihood: f64,
    opts: &EstimatorOptions,
) -> Result<EstimationResult, AppError> {
    let (design, fit) = fit_model(kind, observations, opts)?;
    Ok(assemble_result(kind, &design, &fit, null_log_likelihood))
}

fn fit_model(
    kind: ModelKind,
    observations: &[Observation],
    opts: &EstimatorOptions,
) -> Result<(ChoiceDesign, MaxLikelihoodFit), AppError> {
    let design = build_design(&spec_for(kind), observations)?;
    log::info!(
        "Estimating {} ({} free parameters, {} observations)",
        kind.display_name(),
        design.n_params(),
        design.n_obs()
    );
    let fit = estimate(&design, opts)?;
    Ok((design, fit))
}

fn assemble_result(
    kind: ModelKind,
    design: &ChoiceDesign,
    fit: &MaxLikelihoodFit,
    null_log_likelihood: f64,
) -> EstimationResult {
    let std_errors = fit.std_errors();

    let parameters = spec_for(kind)
        .params()
        .into_iter()
        .filter_map(|p| {
            if let Some(idx) = design.free.iter().position(|f| f.name == p.name) {
                let value = fit.beta[idx];
                let std_error = std_errors[idx];
                let t_stat = value / std_error;
                return Some(ParameterEstimate {
                    name: p.name.to_string(),
                    value,
                    std_error,
                    t_stat,
                    p_value: pvalue_two_sided(t_stat),
                    fixed: false,
                });
            }
            design.fixed.iter().find(|f| f.name == p.name).map(|f| ParameterEstimate {
                name: f.name.to_string(),
                value: f.start,
                std_error: f64::NAN,
                t_stat: f64::NAN,
                p_value: f64::NAN,
                fixed: true,
            })
        })
        .collect();

    let statistics = FitStatistics::compute(
        fit.log_likelihood,
        null_log_likelihood,
        fit.initial_log_likelihood,
        design.n_params(),
        design.n_obs(),
    );

    log::info!(
        "{}: LL={:.4} AIC={:.4} rho2={:.4} after {} iterations",
        kind.display_name(),
        statistics.log_likelihood,
        statistics.aic,
        statistics.rho_squared,
        fit.iterations
    );

    EstimationResult {
        model: kind,
        display_name: kind.display_name().to_string(),
        parameters,
        statistics,
        iterations: fit.iterations,
        converged: fit.converged,
        gradient_norm: fit.gradient_norm,
        predicted_shares: fit.predicted_shares.clone(),
    }
}

/// Sort best first: ascending AIC, then descending ρ², then specification order.
///
/// NaN values compare as equal so they never reorder their neighbours.
pub fn sort_comparison(rows: &mut [ComparisonRow]) {
    rows.sort_by(|a, b| {
        a.aic
            .partial_cmp(&b.aic)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.rho_squared.partial_cmp(&a.rho_squared).unwrap_or(Ordering::Equal))
            .then_with(|| a.model.order().cmp(&b.model.order()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row(model: ModelKind, aic: f64, rho_squared: f64) -> ComparisonRow {
        ComparisonRow {
            model,
            display_name: model.display_name().to_string(),
            log_likelihood: -aic / 2.0,
            aic,
            rho_squared,
            n_obs: 100,
            n_params: 0,
            bic: aic,
            adjusted_rho_squared: rho_squared,
            likelihood_ratio: 0.0,
        }
    }

    fn names(rows: &[ComparisonRow]) -> Vec<ModelKind> {
        rows.iter().map(|r| r.model).collect()
    }

    #[test]
    fn sorts_by_aic_then_rho_squared_descending() {
        let mut rows = vec![
            row(ModelKind::Baseline, 300.0, 0.0),
            row(ModelKind::Full, 200.0, 0.30),
            row(ModelKind::Reduced1, 200.0, 0.35),
            row(ModelKind::Reduced2, 150.0, 0.20),
        ];
        sort_comparison(&mut rows);
        assert_eq!(
            names(&rows),
            vec![ModelKind::Reduced2, ModelKind::Reduced1, ModelKind::Full, ModelKind::Baseline]
        );
    }

    #[test]
    fn full_ties_keep_specification_order() {
        let mut rows = vec![row(ModelKind::Reduced1, 10.0, 0.1), row(ModelKind::Full, 10.0, 0.1)];
        sort_comparison(&mut rows);
        assert_eq!(names(&rows), vec![ModelKind::Full, ModelKind::Reduced1]);
    }

    fn sample(n_car: usize, n_rail: usize) -> Vec<Observation> {
        let mut out = Vec::new();
        for i in 0..(n_car + n_rail) {
            let choice = if i < n_car { Alternative::Car } else { Alternative::Rail };
            out.push(Observation {
                line: i + 2,
                choice,
                tt_rail: 30.0 + (i % 5) as f64 * 7.0,
                tc_rail: 4.0 + (i % 3) as f64,
                ovt_rail: 8.0 + (i % 4) as f64,
                changes: (i % 2) as f64,
                tt_car: 25.0 + (i % 7) as f64 * 5.0,
                tc_car: 3.0 + (i % 6) as f64,
                ovt_car: 2.0 + (i % 9) as f64,
                purpose: 1,
            });
        }
        out
    }

    #[test]
    fn equal_shares_null_is_n_log_half() {
        let obs = sample(3, 7);
        let ll0 = null_log_likelihood(&obs, NullModel::EqualShares, &EstimatorOptions::default()).unwrap();
        assert_relative_eq!(ll0, 10.0 * 0.5_f64.ln());
    }

    #[test]
    fn baseline_rho_squared_is_zero_against_constants_null() {
        let obs = sample(12, 28);
        let cmp = estimate_and_compare(
            &obs,
            &[ModelKind::Baseline],
            NullModel::Constants,
            &EstimatorOptions::default(),
        )
        .unwrap();

        let baseline = &cmp.results[0];
        assert_eq!(baseline.statistics.log_likelihood, cmp.null_log_likelihood);
        assert_eq!(baseline.statistics.rho_squared, 0.0);
        assert_eq!(baseline.statistics.n_params, 1);
        assert_relative_eq!(baseline.statistics.aic, 2.0 - 2.0 * baseline.statistics.log_likelihood);

        let asc_rail = baseline.parameters.iter().find(|p| p.name == "ASC_RAIL").unwrap();
        assert!(asc_rail.fixed);
        assert_eq!(asc_rail.value, 0.0);
    }

    #[test]
    fn underdetermined_models_are_skipped() {
        let obs = sample(2, 3);
        let cmp = estimate_and_compare(
            &obs,
            &[ModelKind::Baseline, ModelKind::Full],
            NullModel::EqualShares,
            &EstimatorOptions::default(),
        )
        .unwrap();

        assert_eq!(cmp.results.len(), 1);
        assert_eq!(cmp.skipped.len(), 1);
        assert_eq!(cmp.skipped[0].0, ModelKind::Full);
    }

    #[test]
    fn empty_selection_is_an_input_error() {
        let obs = sample(2, 3);
        let err = estimate_and_compare(&obs, &[], NullModel::EqualShares, &EstimatorOptions::default())
            .unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
    }

    #[test]
    fn all_models_skipped_is_a_data_error() {
        let obs = sample(2, 3);
        let err = estimate_and_compare(&obs, &[ModelKind::Full], NullModel::EqualShares, &EstimatorOptions::default())
            .unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
    }

    #[test]
    fn unidentified_parameter_reports_nan_inference() {
        let mut obs = sample(20, 20);
        for (i, o) in obs.iter_mut().enumerate() {
            o.choice = if (i * 37) % 11 < 5 { Alternative::Rail } else { Alternative::Car };
            o.changes = 0.0;
        }

        let result = estimate_model(ModelKind::Full, &obs, -30.0, &EstimatorOptions::default()).unwrap();
        let free: Vec<&ParameterEstimate> = result.parameters.iter().filter(|p| !p.fixed).collect();
        assert_eq!(free.len(), 8);
        for p in free {
            assert!(p.std_error.is_nan(), "{} has std error {}", p.name, p.std_error);
            assert!(p.p_value.is_nan(), "{} has p-value {}", p.name, p.p_value);
        }
        assert!(result.statistics.log_likelihood.is_finite());
    }
}
