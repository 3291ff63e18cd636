//! Mode-choice model specifications.
//!
//! Specifications are static data so that estimation code can stay generic
//! over which attributes enter which utility.

pub mod design;
pub mod spec;

pub use design::*;
pub use spec::*;
