//! Spectral toolkit contract.
//!
//! All heavy numerics (continuum fitting, cross-correlation, synthesis) run
//! inside an external spectral-analysis toolkit. Spectra and continuum models
//! stay on the toolkit side; this crate only holds opaque handles to them and
//! sequences calls through [`SpectralToolkit`].
//!
//! - `client`: HTTP/JSON bridge implementation
//! - `resources`: paths of the toolkit's bundled input files

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{
    CcfSettings, ContinuumSettings, InitialGuess, NoiseDistribution, StellarParams, SynthesisCode,
    VelocityComponent, WavelengthRange,
};
use crate::error::AppError;

pub mod client;
pub mod resources;

#[cfg(test)]
pub mod mock;

pub use client::ToolkitClient;
pub use resources::ToolkitResources;

/// Opaque reference to a spectrum held by the toolkit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpectrumHandle(pub String);

/// Opaque reference to a continuum model held by the toolkit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuumHandle(pub String);

/// Everything the iterative synthesis fit needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub spectrum: SpectrumHandle,
    pub continuum: ContinuumHandle,
    pub code: SynthesisCode,
    pub initial: InitialGuess,
    pub free_params: Vec<String>,
    pub free_abundances: Option<Vec<String>>,
    pub linelist_free_loggf: Option<Vec<String>>,

    pub model_atmospheres: PathBuf,
    pub atomic_linelist: PathBuf,
    /// Atomic lines are restricted to this range.
    pub linelist_range: WavelengthRange,
    /// Lines with a smaller theoretical depth are dropped.
    pub min_theoretical_depth: f64,
    pub isotopes: PathBuf,
    pub solar_abundances: PathBuf,
    pub line_regions: PathBuf,
    pub segments: PathBuf,

    pub enhance_abundances: bool,
    pub use_errors: bool,
    pub vmic_from_empirical_relation: bool,
    pub vmac_from_empirical_relation: bool,
    pub max_iterations: u32,
}

/// Result of the synthesis fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisOutcome {
    pub params: StellarParams,
    pub errors: StellarParams,
    pub synthetic: SpectrumHandle,
    /// Free-form optimizer status reported by the toolkit.
    #[serde(default)]
    pub status: Option<serde_json::Value>,
}

/// The external operations the pipeline depends on.
pub trait SpectralToolkit {
    fn read_spectrum(&self, path: &Path) -> Result<SpectrumHandle, AppError>;

    /// Observed wavelength span of a spectrum, nm.
    fn wavelength_range(&self, spectrum: &SpectrumHandle) -> Result<WavelengthRange, AppError>;

    /// Keep only points inside `range`.
    fn cut_spectrum(
        &self,
        spectrum: &SpectrumHandle,
        range: WavelengthRange,
    ) -> Result<SpectrumHandle, AppError>;

    fn estimate_snr(&self, spectrum: &SpectrumHandle, num_points: u32) -> Result<f64, AppError>;

    fn add_noise(
        &self,
        spectrum: &SpectrumHandle,
        snr: f64,
        distribution: NoiseDistribution,
    ) -> Result<SpectrumHandle, AppError>;

    fn fit_continuum(
        &self,
        spectrum: &SpectrumHandle,
        settings: &ContinuumSettings,
    ) -> Result<ContinuumHandle, AppError>;

    fn normalize_spectrum(
        &self,
        spectrum: &SpectrumHandle,
        continuum: &ContinuumHandle,
        consider_continuum_errors: bool,
    ) -> Result<SpectrumHandle, AppError>;

    /// Fitted CCF components, strongest first.
    fn cross_correlate_with_mask(
        &self,
        spectrum: &SpectrumHandle,
        mask: &Path,
        settings: &CcfSettings,
    ) -> Result<Vec<VelocityComponent>, AppError>;

    /// Shift a spectrum to the rest frame given its radial velocity in km/s.
    fn correct_velocity(
        &self,
        spectrum: &SpectrumHandle,
        rv: f64,
    ) -> Result<SpectrumHandle, AppError>;

    fn write_spectrum(&self, spectrum: &SpectrumHandle, path: &Path) -> Result<(), AppError>;

    /// Empirical macroturbulence estimate, km/s.
    fn estimate_vmac(&self, teff: f64, logg: f64, mh: f64) -> Result<f64, AppError>;

    fn model_spectrum(&self, request: &SynthesisRequest) -> Result<SynthesisOutcome, AppError>;
}
