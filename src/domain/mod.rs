//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - survey observations (`Observation`, `Alternative`, `Column`)
//! - run configuration (`RunConfig`, `ModelKind`, `NullModel`)
//! - estimation outputs (`EstimationResult`, `FitStatistics`, `ComparisonRow`)

pub mod types;

pub use types::*;
