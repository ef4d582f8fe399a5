//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input records and configuration (`StarRecord`, `FitConfig`)
//! - toolkit settings (`ContinuumSettings`, `CcfSettings`, `NoiseDistribution`)
//! - fit outputs (`StellarParams`, `RadialVelocity`)

pub mod types;

pub use types::*;
