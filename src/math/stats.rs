//! Scalar helpers: stable log-sum-exp and normal p-values.

use statrs::distribution::{ContinuousCDF, Normal};

/// `ln Σ exp(v_j)` without overflow.
pub fn logsumexp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    let sum: f64 = values.iter().map(|v| (v - max).exp()).sum();
    max + sum.ln()
}

/// Two-sided p-value of a z-statistic under the standard normal.
pub fn pvalue_two_sided(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    match Normal::new(0.0, 1.0) {
        // sf keeps precision in the far tail where 1 - cdf would round to 0.
        Ok(normal) => 2.0 * normal.sf(z.abs()),
        Err(_) => f64::NAN,
    }
}
