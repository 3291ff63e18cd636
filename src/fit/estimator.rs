//! Maximum-likelihood estimation of the multinomial logit model.
//!
//! Given a `ChoiceDesign` with utilities `V_nj = x_njᵀ β + c_nj`, the
//! log-likelihood is
//!
//! ```text
//! LL(β) = Σ_n [ V_n,chosen − ln Σ_j exp(V_nj) ]
//! ```
//!
//! with gradient `Σ_n (x_n,chosen − x̄_n)` and observed information
//! `Σ_n Σ_j P_nj (x_nj − x̄_n)(x_nj − x̄_n)ᵀ`, where `x̄_n = Σ_j P_nj x_nj`.
//!
//! `LL` is concave, so Newton–Raphson with step halving converges from the
//! zero start unless the data are perfectly separated. Convergence is declared
//! when the Newton decrement `gᵀ I⁻¹ g / 2` drops below the tolerance.

use nalgebra::{DMatrix, DVector};

use crate::error::AppError;
use crate::math::{invert_symmetric, logsumexp, solve_symmetric};
use crate::models::ChoiceDesign;

/// Sufficient-increase constant for the step-halving line search.
const ARMIJO_C: f64 = 1e-4;

/// Options controlling the Newton iterations.
#[derive(Debug, Clone)]
pub struct EstimatorOptions {
    pub max_iterations: usize,
    /// Threshold on half the Newton decrement.
    pub tolerance: f64,
    pub max_step_halvings: usize,
}

impl Default for EstimatorOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-10,
            max_step_halvings: 30,
        }
    }
}

/// Raw estimator output (parameter vector order follows `design.free`).
#[derive(Debug, Clone)]
pub struct MaxLikelihoodFit {
    pub beta: DVector<f64>,
    pub log_likelihood: f64,
    pub initial_log_likelihood: f64,
    pub iterations: usize,
    pub converged: bool,
    pub gradient_norm: f64,
    /// Inverse information at the estimate; `None` when it is singular.
    pub covariance: Option<DMatrix<f64>>,
    pub predicted_shares: Vec<f64>,
}

impl MaxLikelihoodFit {
    pub fn std_errors(&self) -> Vec<f64> {
        let k = self.beta.len();
        match &self.covariance {
            Some(cov) => (0..k)
                .map(|i| {
                    let var = cov[(i, i)];
                    if var.is_finite() && var >= 0.0 { var.sqrt() } else { f64::NAN }
                })
                .collect(),
            None => vec![f64::NAN; k],
        }
    }
}

struct Evaluation {
    log_likelihood: f64,
    gradient: DVector<f64>,
    information: DMatrix<f64>,
}

/// Log-likelihood at `beta`.
pub fn log_likelihood(design: &ChoiceDesign, beta: &DVector<f64>) -> f64 {
    let mut v = vec![0.0; design.n_alternatives()];
    let mut ll = 0.0;
    for (i, &c) in design.chosen.iter().enumerate() {
        design.fill_utilities(beta, i, &mut v);
        ll += v[c] - logsumexp(&v);
    }
    ll
}

/// Sample-average choice probabilities at `beta`.
pub fn predicted_shares(design: &ChoiceDesign, beta: &DVector<f64>) -> Vec<f64> {
    let j = design.n_alternatives();
    let n = design.n_obs();
    let mut shares = vec![0.0; j];
    if n == 0 {
        return shares;
    }
    let mut v = vec![0.0; j];
    for i in 0..n {
        design.fill_utilities(beta, i, &mut v);
        let lse = logsumexp(&v);
        for (s, &vj) in shares.iter_mut().zip(v.iter()) {
            *s += (vj - lse).exp();
        }
    }
    for s in &mut shares {
        *s /= n as f64;
    }
    shares
}

fn evaluate(design: &ChoiceDesign, beta: &DVector<f64>) -> Evaluation {
    let k = design.n_params();
    let j = design.n_alternatives();

    let mut ll = 0.0;
    let mut gradient = DVector::<f64>::zeros(k);
    let mut information = DMatrix::<f64>::zeros(k, k);

    let mut v = vec![0.0; j];
    let mut p = vec![0.0; j];
    let mut xbar = vec![0.0; k];
    let mut dev = vec![0.0; k];

    for (i, &c) in design.chosen.iter().enumerate() {
        design.fill_utilities(beta, i, &mut v);
        let lse = logsumexp(&v);
        ll += v[c] - lse;

        xbar.iter_mut().for_each(|x| *x = 0.0);
        for a in 0..j {
            p[a] = (v[a] - lse).exp();
            let xa = &design.x[a];
            for q in 0..k {
                xbar[q] += p[a] * xa[(i, q)];
            }
        }

        let xc = &design.x[c];
        for q in 0..k {
            gradient[q] += xc[(i, q)] - xbar[q];
        }

        for a in 0..j {
            if p[a] == 0.0 {
                continue;
            }
            let xa = &design.x[a];
            for q in 0..k {
                dev[q] = xa[(i, q)] - xbar[q];
            }
            for q in 0..k {
                let pq = p[a] * dev[q];
                if pq == 0.0 {
                    continue;
                }
                for r in q..k {
                    information[(q, r)] += pq * dev[r];
                }
            }
        }
    }

    for q in 0..k {
        for r in 0..q {
            information[(q, r)] = information[(r, q)];
        }
    }

    Evaluation {
        log_likelihood: ll,
        gradient,
        information,
    }
}

/// Estimate the free parameters of `design` by maximum likelihood.
pub fn estimate(design: &ChoiceDesign, opts: &EstimatorOptions) -> Result<MaxLikelihoodFit, AppError> {
    if design.n_obs() == 0 {
        return Err(AppError::data("No observations to estimate."));
    }

    let mut beta = design.start();
    let initial_log_likelihood = log_likelihood(design, &beta);
    if !initial_log_likelihood.is_finite() {
        return Err(AppError::numeric("Non-finite log-likelihood at starting values."));
    }

    if design.n_params() == 0 {
        return Ok(MaxLikelihoodFit {
            predicted_shares: predicted_shares(design, &beta),
            beta,
            log_likelihood: initial_log_likelihood,
            initial_log_likelihood,
            iterations: 0,
            converged: true,
            gradient_norm: 0.0,
            covariance: None,
        });
    }

    let mut eval = evaluate(design, &beta);
    let mut iterations = 0usize;

    let converged = loop {
        let Some(step) = solve_symmetric(&eval.information, &eval.gradient) else {
            return Err(AppError::numeric(format!(
                "Information matrix is singular at iteration {iterations}; the model is not identified."
            )));
        };
        let decrement = eval.gradient.dot(&step);

        log::debug!(
            "[Newton iter #{iterations}] LL={:.8} decrement={:.3e} max|g|={:.3e}",
            eval.log_likelihood,
            decrement,
            eval.gradient.amax()
        );

        if decrement.abs() / 2.0 < opts.tolerance {
            // Take the final Newton step; it is within the quadratic region.
            let polished = &beta + &step;
            let polished_eval = evaluate(design, &polished);
            if polished_eval.log_likelihood.is_finite() {
                beta = polished;
                eval = polished_eval;
            }
            break true;
        }
        if iterations >= opts.max_iterations {
            break false;
        }
        iterations += 1;

        match line_search(design, &beta, &step, eval.log_likelihood, decrement, opts.max_step_halvings) {
            Some(next) => beta = next,
            None => {
                // No representable improvement along the Newton direction: we are at
                // the optimum up to floating-point resolution of LL.
                let scale = 1.0 + eval.log_likelihood.abs();
                log::debug!("Step halving exhausted at iteration {iterations} (decrement={decrement:.3e})");
                break decrement.abs() / 2.0 < 1e-8 * scale;
            }
        }

        eval = evaluate(design, &beta);
        if !eval.log_likelihood.is_finite() {
            return Err(AppError::numeric(format!(
                "Non-finite log-likelihood at iteration {iterations}."
            )));
        }
    };

    if !converged {
        log::warn!(
            "Estimation did not converge after {iterations} iterations (LL={:.6}, max|g|={:.3e}); \
             check for perfectly predicted choices.",
            eval.log_likelihood,
            eval.gradient.amax()
        );
    }

    let covariance = invert_symmetric(&eval.information);
    if covariance.is_none() {
        log::warn!("Information matrix is not positive definite at the estimate; standard errors unavailable.");
    }

    Ok(MaxLikelihoodFit {
        predicted_shares: predicted_shares(design, &beta),
        log_likelihood: eval.log_likelihood,
        initial_log_likelihood,
        iterations,
        converged,
        gradient_norm: eval.gradient.amax(),
        covariance,
        beta,
    })
}

fn line_search(
    design: &ChoiceDesign,
    beta: &DVector<f64>,
    step: &DVector<f64>,
    ll_current: f64,
    decrement: f64,
    max_halvings: usize,
) -> Option<DVector<f64>> {
    let mut t = 1.0;
    for _ in 0..=max_halvings {
        let trial = beta + step * t;
        let ll_trial = log_likelihood(design, &trial);
        if ll_trial.is_finite() && ll_trial >= ll_current + ARMIJO_C * t * decrement {
            return Some(trial);
        }
        t *= 0.5;
    }
    None
}
