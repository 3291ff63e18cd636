//! `mode-choice` library crate.
//!
//! The binary (`mc`) is a thin wrapper around this library so that:
//!
//! - estimation logic is testable without spawning processes
//! - specifications, estimator and reports are reusable from other tools

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
