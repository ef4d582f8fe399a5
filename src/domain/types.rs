//! Shared domain types.
//!
//! These types are kept plain and serializable so they can be:
//!
//! - parsed from the star CSV
//! - sent to the spectral toolkit as JSON
//! - written back out as result files

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Radiative transfer code used by the toolkit for spectral synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisCode {
    Turbospectrum,
    Synthe,
    Moog,
}

impl SynthesisCode {
    pub fn as_str(self) -> &'static str {
        match self {
            SynthesisCode::Turbospectrum => "turbospectrum",
            SynthesisCode::Synthe => "synthe",
            SynthesisCode::Moog => "moog",
        }
    }
}

impl std::fmt::Display for SynthesisCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model atmosphere family.
///
/// The family also decides which solar abundance table is paired with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AtmosphereFamily {
    /// MARCS, Gaia-ESO survey grid.
    MarcsGes,
    /// ATLAS9, Castelli & Kurucz grid.
    Atlas9Castelli,
}

impl AtmosphereFamily {
    /// Directory name under `input/atmospheres/`.
    pub fn dir_name(self) -> &'static str {
        match self {
            AtmosphereFamily::MarcsGes => "MARCS.GES",
            AtmosphereFamily::Atlas9Castelli => "ATLAS9.Castelli",
        }
    }

    /// Directory name under `input/abundances/`.
    ///
    /// ATLAS grids were computed with Grevesse (1998); MARCS with Grevesse (2007).
    pub fn abundances_dir_name(self) -> &'static str {
        match self {
            AtmosphereFamily::Atlas9Castelli => "Grevesse.1998",
            AtmosphereFamily::MarcsGes => "Grevesse.2007",
        }
    }
}

/// One star's observation and initial guesses, as read from the input CSV.
///
/// The CSV has no header; columns are positional in this order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarRecord {
    pub star: String,
    pub star_file: PathBuf,
    pub snr: f64,
    pub resolution: f64,
    pub teff: f64,
    pub logg: f64,
    pub vmic: f64,
    #[serde(rename = "MH")]
    pub mh: f64,
}

/// Closed wavelength interval in nm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WavelengthRange {
    pub wave_base: f64,
    pub wave_top: f64,
}

impl WavelengthRange {
    pub fn new(wave_base: f64, wave_top: f64) -> Self {
        Self { wave_base, wave_top }
    }

    pub fn is_valid(&self) -> bool {
        self.wave_base.is_finite() && self.wave_top.is_finite() && self.wave_top > self.wave_base
    }
}

/// Noise model for [`crate::toolkit::SpectralToolkit::add_noise`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseDistribution {
    Poisson,
    Gaussian,
}

/// How the continuum is modelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ContinuumSettings {
    /// Spline continuum found by filtering medians then maxima.
    Splines {
        degree: u32,
        /// `None` lets the toolkit place one knot every 5 nm.
        nknots: Option<u32>,
        from_resolution: Option<f64>,
        order: String,
        median_wave_range: f64,
        max_wave_range: f64,
        automatic_strong_line_detection: bool,
        strong_line_probability: f64,
        use_errors_for_fitting: bool,
    },
    /// Constant continuum, for spectra that are already normalized.
    FixedValue { value: f64 },
}

impl ContinuumSettings {
    /// Spline settings used for the raw observed spectrum.
    pub fn observed_splines() -> Self {
        ContinuumSettings::Splines {
            degree: 2,
            nknots: None,
            from_resolution: None,
            order: "median+max".to_string(),
            median_wave_range: 0.05,
            max_wave_range: 4.0,
            automatic_strong_line_detection: true,
            strong_line_probability: 0.5,
            use_errors_for_fitting: true,
        }
    }

    /// Unit continuum for an already-normalized spectrum.
    pub fn normalized() -> Self {
        ContinuumSettings::FixedValue { value: 1.0 }
    }
}

/// Cross-correlation settings for radial velocity determination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CcfSettings {
    pub lower_velocity_limit: f64,
    pub upper_velocity_limit: f64,
    pub velocity_step: f64,
    pub mask_depth: f64,
    pub fourier: bool,
}

impl Default for CcfSettings {
    fn default() -> Self {
        Self {
            lower_velocity_limit: -200.0,
            upper_velocity_limit: 200.0,
            velocity_step: 1.0,
            mask_depth: 0.01,
            fourier: false,
        }
    }
}

/// One fitted component of the cross-correlation function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityComponent {
    /// Centre, km/s.
    pub mu: f64,
    /// Uncertainty of the centre, km/s.
    pub emu: f64,
}

/// Radial velocity of the primary component, rounded to 0.01 km/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadialVelocity {
    pub rv: f64,
    pub rv_err: f64,
    /// Number of CCF components the toolkit found.
    pub components: usize,
}

/// Stellar atmospheric parameters, as fitted (or their errors).
///
/// Field renames give the result-file column names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StellarParams {
    pub teff: f64,
    pub logg: f64,
    #[serde(rename = "MH")]
    pub mh: f64,
    pub alpha: f64,
    pub vmic: f64,
    pub vmac: f64,
    pub vsini: f64,
    pub limb_darkening_coeff: f64,
    #[serde(rename = "R")]
    pub r: f64,
}

/// Starting point for the synthesis fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialGuess {
    pub teff: f64,
    pub logg: f64,
    #[serde(rename = "MH")]
    pub mh: f64,
    pub alpha: f64,
    pub vmic: f64,
    pub vmac: f64,
    pub vsini: f64,
    pub limb_darkening_coeff: f64,
    #[serde(rename = "R")]
    pub r: f64,
    pub vrad: f64,
}

/// Resolved configuration for a `vsini fit` run.
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub input: PathBuf,
    pub line_list: u32,
    pub code: SynthesisCode,
    pub ispec_dir: PathBuf,
    pub toolkit_url: String,
    pub timeout_secs: u64,
    pub limb_table: PathBuf,
    pub limb_column: String,
    pub atmosphere: AtmosphereFamily,
    pub wavelength: WavelengthRange,
    pub max_iterations: u32,
    pub output_dir: PathBuf,
}

/// JSON run summary written alongside the parameter tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub tool: String,
    pub generated: chrono::DateTime<chrono::Utc>,
    pub star: StarRecord,
    pub code: SynthesisCode,
    pub line_list: u32,
    pub atmosphere: AtmosphereFamily,
    pub wavelength: WavelengthRange,
    pub estimated_snr: f64,
    pub radial_velocity: RadialVelocity,
    pub normed_spectrum: PathBuf,
    pub synthetic_spectrum: PathBuf,
    pub initial: InitialGuess,
    pub params: StellarParams,
    pub errors: StellarParams,
    /// Optimizer status reported by the toolkit, kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<serde_json::Value>,
}
