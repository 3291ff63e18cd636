//! Likelihood-based fit statistics.
//!
//! - `AIC = 2K − 2LL`
//! - `BIC = K ln(N) − 2LL`
//! - `ρ² = 1 − LL / LL₀`
//! - `ρ̄² = 1 − (LL − K) / LL₀`
//! - `LR = −2 (LL₀ − LL)`

use crate::domain::FitStatistics;

pub fn aic(log_likelihood: f64, n_params: usize) -> f64 {
    2.0 * n_params as f64 - 2.0 * log_likelihood
}

pub fn bic(log_likelihood: f64, n_params: usize, n_obs: usize) -> f64 {
    n_params as f64 * (n_obs as f64).ln() - 2.0 * log_likelihood
}

/// McFadden's pseudo-R². NaN when the null log-likelihood is zero.
pub fn rho_squared(log_likelihood: f64, null_log_likelihood: f64) -> f64 {
    if null_log_likelihood == 0.0 {
        return f64::NAN;
    }
    1.0 - log_likelihood / null_log_likelihood
}

pub fn adjusted_rho_squared(log_likelihood: f64, null_log_likelihood: f64, n_params: usize) -> f64 {
    if null_log_likelihood == 0.0 {
        return f64::NAN;
    }
    1.0 - (log_likelihood - n_params as f64) / null_log_likelihood
}

pub fn likelihood_ratio(log_likelihood: f64, null_log_likelihood: f64) -> f64 {
    -2.0 * (null_log_likelihood - log_likelihood)
}

impl FitStatistics {
    pub fn compute(
        log_likelihood: f64,
        null_log_likelihood: f64,
        initial_log_likelihood: f64,
        n_params: usize,
        n_obs: usize,
    ) -> Self {
        Self {
            log_likelihood,
            null_log_likelihood,
            initial_log_likelihood,
            n_params,
            n_obs,
            aic: aic(log_likelihood, n_params),
            bic: bic(log_likelihood, n_params, n_obs),
            rho_squared: rho_squared(log_likelihood, null_log_likelihood),
            adjusted_rho_squared: adjusted_rho_squared(log_likelihood, null_log_likelihood, n_params),
            likelihood_ratio: likelihood_ratio(log_likelihood, null_log_likelihood),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn aic_is_two_k_minus_two_ll() {
        assert_relative_eq!(aic(-100.0, 3), 206.0);
        assert_relative_eq!(aic(0.0, 0), 0.0);
    }

    #[test]
    fn rho_squared_against_null() {
        assert_relative_eq!(rho_squared(-50.0, -100.0), 0.5);
        assert_relative_eq!(rho_squared(-100.0, -100.0), 0.0);
        assert!(rho_squared(-1.0, 0.0).is_nan());
        assert_relative_eq!(adjusted_rho_squared(-50.0, -100.0, 5), 0.45);
    }

    #[test]
    fn compute_fills_every_statistic() {
        let s = FitStatistics::compute(-60.0, -80.0, -90.0, 4, 100);
        assert_relative_eq!(s.aic, 128.0);
        assert_relative_eq!(s.bic, 4.0 * 100f64.ln() + 120.0);
        assert_relative_eq!(s.rho_squared, 0.25);
        assert_relative_eq!(s.likelihood_ratio, 40.0);
        assert_eq!(s.n_params, 4);
        assert_eq!(s.n_obs, 100);
    }
}
