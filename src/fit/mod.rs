//! Fitting stages.
//!
//! - `normalize`: observed spectrum -> normalized, rest-frame spectrum on disk
//! - `synthesis`: normalized spectrum -> fitted parameters + synthetic spectrum

pub mod normalize;
pub mod synthesis;
