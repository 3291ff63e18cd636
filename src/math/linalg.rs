//! Symmetric linear solves for Newton steps and covariance matrices.
//!
//! The estimator repeatedly solves `I d = g` where `I` is the observed
//! information matrix (negative Hessian of the log-likelihood). `I` is symmetric
//! positive semi-definite for the logit model, so:
//! - we try a Cholesky factorisation first (fast, exact for well-posed problems)
//! - if that fails (near-singular, e.g. a constant attribute column), we fall
//!   back to an SVD solve with progressively looser tolerances

use nalgebra::{DMatrix, DVector};

/// Solve `a x = b` for symmetric positive (semi-)definite `a`.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_symmetric(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    if a.nrows() != a.ncols() || a.nrows() != b.len() {
        return None;
    }

    if let Some(chol) = a.clone().cholesky() {
        let x = chol.solve(b);
        if x.iter().all(|v| v.is_finite()) {
            return Some(x);
        }
    }

    let svd = a.clone().svd(true, true);
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(x) = svd.solve(b, tol) {
            if x.iter().all(|v| v.is_finite()) {
                return Some(x);
            }
        }
    }

    None
}

/// Invert a symmetric positive-definite matrix.
///
/// Returns `None` when `a` is not positive definite; callers treat that as
/// "standard errors unavailable" rather than as a hard failure.
pub fn invert_symmetric(a: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    if a.nrows() != a.ncols() {
        return None;
    }
    let inv = a.clone().cholesky()?.inverse();
    if inv.iter().all(|v| v.is_finite()) {
        Some(inv)
    } else {
        None
    }
}
