//! Formatted terminal output: dataset summary, parameter tables and the
//! model comparison table.
//!
//! We keep formatting code in one place so:
//! - the estimation code stays clean and testable
//! - output changes are localized

use crate::domain::{Alternative, ComparisonRow, EstimationResult, ModelKind, RunConfig};
use crate::fit::ModelComparison;
use crate::io::ingest::IngestedData;
use crate::models::spec_for;

/// Format the dataset summary (rows used, choice shares, purposes).
pub fn format_dataset_summary(ingest: &IngestedData, config: &RunConfig) -> String {
    let mut out = String::new();
    let stats = &ingest.stats;

    out.push_str("=== mc - Mode Choice Logit Estimation ===\n");
    out.push_str(&format!("Data: {}\n", config.data_path.display()));
    if let Some(purpose) = config.purpose {
        out.push_str(&format!("Purpose filter: {purpose}\n"));
    }
    out.push_str(&format!(
        "Rows: read={} used={} invalid={} filtered={}\n",
        ingest.rows_read,
        stats.n_obs,
        ingest.row_errors.len(),
        ingest.rows_filtered
    ));
    for alt in Alternative::ALL {
        out.push_str(&format!(
            "  {:<5} n={:<6} share={:.4}\n",
            alt.display_name(),
            stats.choice_counts[alt.index()],
            stats.share(alt)
        ));
    }
    let purposes: Vec<String> = stats
        .purpose_counts
        .iter()
        .map(|(p, n)| format!("{p}:{n}"))
        .collect();
    out.push_str(&format!("Purposes: {}\n", purposes.join(" ")));

    out
}

/// Format the per-model estimation report (utilities, parameter table, fit statistics).
pub fn format_estimation(result: &EstimationResult) -> String {
    let mut out = String::new();
    let s = &result.statistics;

    out.push_str(&format!(
        "--- {} ({}) ---\n",
        result.display_name,
        result.model.description()
    ));
    let spec = spec_for(result.model);
    for alt in Alternative::ALL {
        out.push_str(&format!("V_{:<5}= {}\n", alt.display_name(), spec.formula(alt)));
    }
    out.push('\n');

    out.push_str(&format!(
        "{:<12} {:>12} {:>12} {:>10} {:>10}\n",
        "Name", "Value", "Std err", "t-test", "p-value"
    ));
    out.push_str(&format!(
        "{:-<12} {:-<12} {:-<12} {:-<10} {:-<10}\n",
        "", "", "", "", ""
    ));
    for p in &result.parameters {
        if p.fixed {
            out.push_str(&format!("{:<12} {:>12.6} {:>12}\n", p.name, p.value, "fixed"));
        } else {
            out.push_str(&format!(
                "{:<12} {:>12.6} {:>12} {:>10} {:>10}\n",
                p.name,
                p.value,
                fmt_num(p.std_error, 6),
                fmt_num(p.t_stat, 3),
                fmt_num(p.p_value, 4)
            ));
        }
    }
    out.push('\n');

    out.push_str(&format!("Observations:          {}\n", s.n_obs));
    out.push_str(&format!("Estimated parameters:  {}\n", s.n_params));
    out.push_str(&format!("Initial LL:            {:.4}\n", s.initial_log_likelihood));
    out.push_str(&format!("Null LL:               {:.4}\n", s.null_log_likelihood));
    out.push_str(&format!("Final LL:              {:.4}\n", s.log_likelihood));
    out.push_str(&format!("LR vs null:            {}\n", fmt_num(s.likelihood_ratio, 4)));
    out.push_str(&format!("Rho-squared:           {}\n", fmt_num(s.rho_squared, 4)));
    out.push_str(&format!("Adj. rho-squared:      {}\n", fmt_num(s.adjusted_rho_squared, 4)));
    out.push_str(&format!("AIC:                   {:.4}\n", s.aic));
    out.push_str(&format!("BIC:                   {:.4}\n", s.bic));
    out.push_str(&format!(
        "Predicted shares:      {}\n",
        Alternative::ALL
            .iter()
            .zip(result.predicted_shares.iter())
            .map(|(alt, share)| format!("{}={share:.4}", alt.display_name()))
            .collect::<Vec<_>>()
            .join(" ")
    ));
    out.push_str(&format!(
        "Iterations:            {}{}\n",
        result.iterations,
        if result.converged { "" } else { " (NOT CONVERGED)" }
    ));

    out
}

/// Format the sorted comparison table.
pub fn format_comparison(rows: &[ComparisonRow]) -> String {
    let mut out = String::new();

    out.push_str("Model Comparison Results:\n");
    out.push_str(&format!(
        "{:<10} {:>16} {:>12} {:>12} {:>15}\n",
        "Model", "Log-Likelihood", "AIC", "Rho-Squared", "N Observations"
    ));
    out.push_str(&format!(
        "{:-<10} {:-<16} {:-<12} {:-<12} {:-<15}\n",
        "", "", "", "", ""
    ));
    for r in rows {
        out.push_str(&format!(
            "{:<10} {:>16.4} {:>12.4} {:>12} {:>15}\n",
            r.display_name,
            r.log_likelihood,
            r.aic,
            fmt_num(r.rho_squared, 4),
            r.n_obs
        ));
    }

    out
}

/// Format models that could not be estimated.
pub fn format_skipped(skipped: &[(ModelKind, String)]) -> String {
    let mut out = String::new();
    for (kind, reason) in skipped {
        out.push_str(&format!("(skipped {}) {reason}\n", kind.display_name()));
    }
    out
}

/// Format every model report followed by the comparison.
pub fn format_run_summary(comparison: &ModelComparison) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Null model: {} (LL0={:.4})\n\n",
        comparison.null_model.display_name(),
        comparison.null_log_likelihood
    ));
    for result in &comparison.results {
        out.push_str(&format_estimation(result));
        out.push('\n');
    }
    out.push_str(&format_skipped(&comparison.skipped));

    out
}

fn fmt_num(v: f64, decimals: usize) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v:.decimals$}")
    }
}
