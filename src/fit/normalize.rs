//! Observed spectrum preparation.
//!
//! read -> cut -> estimate SNR -> add noise -> fit continuum -> normalize
//! -> cross-correlate -> velocity correction -> write
//!
//! The normalized, rest-frame spectrum is written to disk because the
//! synthesis stage starts from the file, not from the in-memory handle.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::{
    CcfSettings, ContinuumSettings, NoiseDistribution, RadialVelocity, VelocityComponent,
    WavelengthRange,
};
use crate::error::AppError;
use crate::io::paths::normed_spectrum_path;
use crate::toolkit::{SpectralToolkit, SpectrumHandle, ToolkitResources};

/// Points per window used by the toolkit's SNR estimator.
pub const SNR_ESTIMATE_POINTS: u32 = 10;

/// Default cut applied to the observed spectrum, nm.
pub const DEFAULT_WAVE_MIN: f64 = 470.0;
pub const DEFAULT_WAVE_MAX: f64 = 680.0;

/// Output of the normalization stage.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSpectrum {
    pub path: PathBuf,
    pub spectrum: SpectrumHandle,
    /// SNR measured from the cut spectrum, before noise injection.
    pub estimated_snr: f64,
    pub velocity: RadialVelocity,
}

/// Normalize an observed spectrum and move it to the rest frame.
///
/// `snr` is the record's nominal SNR; Poisson noise at that level is injected
/// before continuum fitting.
pub fn normalize_observed<T: SpectralToolkit + ?Sized>(
    toolkit: &T,
    resources: &ToolkitResources,
    star_file: &Path,
    snr: f64,
    range: WavelengthRange,
) -> Result<NormalizedSpectrum, AppError> {
    if !range.is_valid() {
        return Err(AppError::new(
            2,
            format!(
                "Invalid wavelength range: {}..{} nm (must be finite with max > min).",
                range.wave_base, range.wave_top
            ),
        ));
    }

    info!(path = %star_file.display(), "reading spectrum");
    let spectrum = toolkit.read_spectrum(star_file)?;

    info!(wave_base = range.wave_base, wave_top = range.wave_top, "cutting");
    let spectrum = toolkit.cut_spectrum(&spectrum, range)?;

    info!("estimating SNR from fluxes");
    let estimated_snr = toolkit.estimate_snr(&spectrum, SNR_ESTIMATE_POINTS)?;

    let spectrum = toolkit.add_noise(&spectrum, snr, NoiseDistribution::Poisson)?;

    info!("fitting continuum");
    let continuum = toolkit.fit_continuum(&spectrum, &ContinuumSettings::observed_splines())?;

    info!("normalizing");
    let normalized = toolkit.normalize_spectrum(&spectrum, &continuum, true)?;

    let velocity = determine_radial_velocity(toolkit, resources, &normalized)?;

    info!(rv = velocity.rv, "radial velocity correction");
    let corrected = toolkit.correct_velocity(&normalized, velocity.rv)?;

    let path = normed_spectrum_path(star_file);
    info!(path = %path.display(), "saving normalized spectrum");
    toolkit.write_spectrum(&corrected, &path)?;

    Ok(NormalizedSpectrum {
        path,
        spectrum: corrected,
        estimated_snr,
        velocity,
    })
}

/// Radial velocity of the first CCF component against the solar line mask.
pub fn determine_radial_velocity<T: SpectralToolkit + ?Sized>(
    toolkit: &T,
    resources: &ToolkitResources,
    spectrum: &SpectrumHandle,
) -> Result<RadialVelocity, AppError> {
    info!("radial velocity determination with linelist mask");
    let mask = resources.ccf_mask();
    let components = toolkit.cross_correlate_with_mask(spectrum, &mask, &CcfSettings::default())?;
    primary_velocity(&components)
}

fn primary_velocity(components: &[VelocityComponent]) -> Result<RadialVelocity, AppError> {
    let first = components
        .first()
        .ok_or_else(|| AppError::new(4, "Cross-correlation found no velocity components."))?;

    Ok(RadialVelocity {
        rv: round2(first.mu),
        rv_err: round2(first.emu),
        components: components.len(),
    })
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
