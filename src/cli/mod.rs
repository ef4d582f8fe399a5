//! Command-line parsing.
//!
//! Argument parsing and command dispatch stay separate from the pipeline code.
//! Flags that are usually set once per machine (toolkit location, bridge URL,
//! table path) can also come from the environment or a `.env` file.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{AtmosphereFamily, SynthesisCode};
use crate::fit::normalize::{DEFAULT_WAVE_MAX, DEFAULT_WAVE_MIN};
use crate::fit::synthesis::DEFAULT_MAX_ITERATIONS;
use crate::limb::DEFAULT_COLUMN;
use crate::toolkit::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "vsini",
    version,
    about = "Projected rotational velocity from synthetic spectral fitting"
)]
pub struct Cli {
    /// Log filter (overridden by RUST_LOG).
    #[arg(long, global = true, env = "VSINI_LOG", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Normalize a star's spectrum and fit vsini with synthetic spectra.
    Fit(FitArgs),
    /// Print the interpolated limb-darkening coefficient for one star.
    Limb(LimbArgs),
}

/// Reference table location, shared by both commands.
#[derive(Debug, Args, Clone)]
pub struct LimbTableArgs {
    /// Limb-darkening reference table (CSV).
    #[arg(long, env = "VSINI_LIMB_TABLE", default_value = "values_limbo.csv")]
    pub limb_table: PathBuf,

    /// Name of the coefficient column in the table.
    #[arg(long, default_value = DEFAULT_COLUMN)]
    pub limb_column: String,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Star CSV: star,star_file,snr,resolution,teff,logg,vmic,MH (no header).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Reduced line list number (selects Reduced_line_list_<n>.txt).
    #[arg(value_name = "LINE_LIST", value_parser = clap::value_parser!(u32).range(1..))]
    pub line_list: u32,

    /// Radiative transfer code.
    #[arg(value_name = "CODE", value_enum)]
    pub code: SynthesisCode,

    /// Toolkit installation directory (holds input/ and the reduced line lists).
    #[arg(long, env = "ISPEC_DIR", default_value = ".")]
    pub ispec_dir: PathBuf,

    /// Base URL of the toolkit bridge.
    #[arg(long, env = "ISPEC_BRIDGE_URL", default_value = DEFAULT_BASE_URL)]
    pub toolkit_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    #[command(flatten)]
    pub table: LimbTableArgs,

    /// Model atmosphere grid.
    #[arg(long, value_enum, default_value_t = AtmosphereFamily::MarcsGes)]
    pub atmosphere: AtmosphereFamily,

    /// Lower wavelength cut (nm).
    #[arg(long, default_value_t = DEFAULT_WAVE_MIN)]
    pub wave_min: f64,

    /// Upper wavelength cut (nm).
    #[arg(long, default_value_t = DEFAULT_WAVE_MAX)]
    pub wave_max: f64,

    /// Maximum synthesis iterations.
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: u32,

    /// Directory for the parameter/error tables and run summary.
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct LimbArgs {
    /// Effective temperature (K).
    #[arg(long, allow_negative_numbers = true)]
    pub teff: f64,

    /// Surface gravity (log g, cgs).
    #[arg(long, allow_negative_numbers = true)]
    pub logg: f64,

    /// Metallicity [M/H].
    #[arg(long, allow_negative_numbers = true)]
    pub mh: f64,

    #[command(flatten)]
    pub table: LimbTableArgs,
}
