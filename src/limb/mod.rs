//! Limb-darkening coefficient interpolator.
//!
//! - fixed 3-D grid + trilinear lookup (`grid`)
//! - reference CSV loading with strict row-count validation (`table`)

pub mod grid;
pub mod table;

pub use grid::*;
pub use table::*;
