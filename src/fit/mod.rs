//! Model estimation and comparison.
//!
//! Responsibilities:
//!
//! - maximum-likelihood estimation of each logit specification
//! - fit statistics (AIC, BIC, ρ²)
//! - ranking of the estimated models

pub mod criteria;
pub mod estimator;
pub mod selection;

pub use criteria::*;
pub use estimator::*;
pub use selection::*;
