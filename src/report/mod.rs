//! Formatted terminal output.
//!
//! Kept apart from the pipeline so the stages stay free of presentation code.

pub mod format;

pub use format::*;
