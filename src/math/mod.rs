//! Mathematical utilities: symmetric solves, log-sum-exp and p-values.

pub mod linalg;
pub mod stats;

pub use linalg::*;
pub use stats::*;
