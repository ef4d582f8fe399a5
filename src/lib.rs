//! `vsini-fit` library crate.
//!
//! The binary (`vsini`) is a thin wrapper around this library so that:
//!
//! - the limb-darkening interpolator and pipeline stages are testable without
//!   spawning processes or a toolkit bridge
//! - the toolkit contract can be implemented by other front-ends

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod limb;
pub mod report;
pub mod toolkit;
