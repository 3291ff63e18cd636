//! Reporting utilities: parameter tables and the model comparison table.

pub mod format;

pub use format::*;
