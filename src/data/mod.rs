//! Data sources other than the survey file: synthetic samples for demos and tests.

pub mod sample;

pub use sample::*;
