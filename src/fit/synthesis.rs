//! Parameter determination by synthetic spectral fitting.
//!
//! Starting from the normalized spectrum on disk, the toolkit iteratively
//! synthesizes spectra and adjusts the free parameters (only `vsini` here)
//! until the synthetic spectrum matches the observation inside the selected
//! line regions.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::{AtmosphereFamily, ContinuumSettings, InitialGuess, StarRecord, SynthesisCode};
use crate::error::AppError;
use crate::io::paths::synthetic_spectrum_path;
use crate::limb::LimbDarkeningGrid;
use crate::toolkit::{SpectralToolkit, SynthesisOutcome, SynthesisRequest, ToolkitResources};

pub const INITIAL_VSINI: f64 = 2.0;
pub const INITIAL_VRAD: f64 = 0.0;
pub const DEFAULT_MAX_ITERATIONS: u32 = 6;

/// Atomic lines shallower than this (in the solar spectrum) are dropped.
pub const MIN_THEORETICAL_DEPTH: f64 = 0.01;

/// Parameters left free during the fit.
pub const FREE_PARAMS: &[&str] = &["vsini"];

/// Knobs for the synthesis stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisSettings {
    pub code: SynthesisCode,
    pub line_list: u32,
    pub atmosphere: AtmosphereFamily,
    pub max_iterations: u32,
}

/// Output of the synthesis stage.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRun {
    pub initial: InitialGuess,
    pub outcome: SynthesisOutcome,
    pub synthetic_path: PathBuf,
}

/// Alpha-element enhancement guess from metallicity.
pub fn initial_alpha(mh: f64) -> f64 {
    -0.27 * mh + 0.05
}

/// Build the starting point of the fit from the star record.
pub fn initial_guess<T: SpectralToolkit + ?Sized>(
    toolkit: &T,
    grid: &LimbDarkeningGrid,
    record: &StarRecord,
) -> Result<InitialGuess, AppError> {
    let vmac = toolkit.estimate_vmac(record.teff, record.logg, record.mh)?;

    if !grid.in_range(record.teff, record.logg, record.mh) {
        warn!(
            teff = record.teff,
            logg = record.logg,
            mh = record.mh,
            "initial parameters outside the limb-darkening table; using fallback coefficient"
        );
    }
    let limb_darkening_coeff = grid.coefficient_for(record.teff, record.logg, record.mh);

    Ok(InitialGuess {
        teff: record.teff,
        logg: record.logg,
        mh: record.mh,
        alpha: initial_alpha(record.mh),
        vmic: record.vmic,
        vmac,
        vsini: INITIAL_VSINI,
        limb_darkening_coeff,
        r: record.resolution,
        vrad: INITIAL_VRAD,
    })
}

/// Fit the normalized spectrum and write the best synthetic spectrum next to
/// the input spectrum.
pub fn fit_synthetic<T: SpectralToolkit + ?Sized>(
    toolkit: &T,
    resources: &ToolkitResources,
    grid: &LimbDarkeningGrid,
    record: &StarRecord,
    normed_path: &Path,
    settings: &SynthesisSettings,
) -> Result<SynthesisRun, AppError> {
    let spectrum = toolkit.read_spectrum(normed_path)?;

    // Already normalized.
    let continuum = toolkit.fit_continuum(&spectrum, &ContinuumSettings::normalized())?;

    let initial = initial_guess(toolkit, grid, record)?;
    info!(
        alpha = initial.alpha,
        vmac = initial.vmac,
        limb_darkening_coeff = initial.limb_darkening_coeff,
        "initial guess"
    );

    let linelist_range = toolkit.wavelength_range(&spectrum)?;

    let request = SynthesisRequest {
        spectrum,
        continuum,
        code: settings.code,
        initial,
        free_params: FREE_PARAMS.iter().map(|p| p.to_string()).collect(),
        free_abundances: None,
        linelist_free_loggf: None,
        model_atmospheres: resources.model_atmospheres(settings.atmosphere),
        atomic_linelist: resources.atomic_linelist(),
        linelist_range,
        min_theoretical_depth: MIN_THEORETICAL_DEPTH,
        isotopes: resources.isotopes(),
        solar_abundances: resources.solar_abundances(settings.atmosphere),
        line_regions: resources.line_regions(settings.line_list),
        segments: resources.segments(),
        enhance_abundances: true,
        use_errors: true,
        vmic_from_empirical_relation: false,
        vmac_from_empirical_relation: true,
        max_iterations: settings.max_iterations,
    };

    info!(code = %settings.code, line_list = settings.line_list, "modelling spectrum");
    let outcome = toolkit.model_spectrum(&request)?;

    let synthetic_path =
        synthetic_spectrum_path(&record.star_file, settings.code, settings.line_list);
    info!(path = %synthetic_path.display(), "saving synthetic spectrum");
    toolkit.write_spectrum(&outcome.synthetic, &synthetic_path)?;

    Ok(SynthesisRun {
        initial,
        outcome,
        synthetic_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WavelengthRange;
    use crate::limb::GRID_SIZE;
    use crate::toolkit::SpectrumHandle;
    use crate::toolkit::mock::{Call, RecordingToolkit};

    fn flat_grid(value: f64) -> LimbDarkeningGrid {
        LimbDarkeningGrid::from_values(vec![value; GRID_SIZE]).unwrap()
    }

    fn record(teff: f64, logg: f64, mh: f64) -> StarRecord {
        StarRecord {
            star: "Sun".to_string(),
            star_file: PathBuf::from("obs/sun.fits"),
            snr: 200.0,
            resolution: 47000.0,
            teff,
            logg,
            vmic: 1.05,
            mh,
        }
    }

    fn settings(atmosphere: AtmosphereFamily) -> SynthesisSettings {
        SynthesisSettings {
            code: SynthesisCode::Turbospectrum,
            line_list: 1,
            atmosphere,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    fn model_request(tk: &RecordingToolkit) -> SynthesisRequest {
        tk.calls()
            .into_iter()
            .find_map(|c| match c {
                Call::Model(req) => Some(*req),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn alpha_follows_metallicity() {
        assert!((initial_alpha(0.0) - 0.05).abs() < 1e-12);
        assert!((initial_alpha(-0.5) - 0.185).abs() < 1e-12);
        assert!((initial_alpha(0.3) - (-0.031)).abs() < 1e-12);
    }

    #[test]
    fn initial_guess_combines_record_toolkit_and_grid() {
        let tk = RecordingToolkit::new();
        let guess = initial_guess(&tk, &flat_grid(0.68), &record(5777.0, 4.44, 0.02)).unwrap();

        assert_eq!(guess.teff, 5777.0);
        assert_eq!(guess.vmic, 1.05);
        assert_eq!(guess.r, 47000.0);
        assert_eq!(guess.vmac, 3.5);
        assert_eq!(guess.vsini, 2.0);
        assert_eq!(guess.vrad, 0.0);
        assert!((guess.limb_darkening_coeff - 0.68).abs() < 1e-12);
        assert_eq!(tk.calls(), vec![Call::Vmac(5777.0, 4.44, 0.02)]);
    }

    #[test]
    fn out_of_table_star_gets_fallback_limb_coefficient() {
        let tk = RecordingToolkit::new();
        let guess = initial_guess(&tk, &flat_grid(0.68), &record(7500.0, 4.0, 0.0)).unwrap();
        assert_eq!(guess.limb_darkening_coeff, 0.6);
    }

    #[test]
    fn builds_request_from_resources_and_settings() {
        let tk = RecordingToolkit::new();
        let run = fit_synthetic(
            &tk,
            &ToolkitResources::new("/ispec"),
            &flat_grid(0.7),
            &record(5777.0, 4.44, 0.0),
            Path::new("obs/sun_normed.fits"),
            &settings(AtmosphereFamily::MarcsGes),
        )
        .unwrap();

        let calls = tk.calls();
        assert_eq!(calls[0], Call::Read(PathBuf::from("obs/sun_normed.fits")));
        assert_eq!(
            calls[1],
            Call::Continuum(
                SpectrumHandle("s1".into()),
                ContinuumSettings::FixedValue { value: 1.0 }
            )
        );

        let req = model_request(&tk);
        assert_eq!(req.free_params, vec!["vsini".to_string()]);
        assert_eq!(req.max_iterations, 6);
        assert_eq!(req.linelist_range, WavelengthRange::new(470.0, 680.0));
        assert_eq!(req.min_theoretical_depth, 0.01);
        assert_eq!(req.model_atmospheres, PathBuf::from("/ispec/input/atmospheres/MARCS.GES"));
        assert_eq!(
            req.solar_abundances,
            PathBuf::from("/ispec/input/abundances/Grevesse.2007/stdatom.dat")
        );
        assert_eq!(req.line_regions, PathBuf::from("/ispec/Reduced_line_list_1.txt"));
        assert!(req.enhance_abundances && req.use_errors);
        assert!(!req.vmic_from_empirical_relation && req.vmac_from_empirical_relation);
        assert!(req.free_abundances.is_none() && req.linelist_free_loggf.is_none());
        assert!((req.initial.limb_darkening_coeff - 0.7).abs() < 1e-12);

        assert_eq!(run.synthetic_path, PathBuf::from("obs/sun_turbospectrum_1.fits"));
        assert_eq!(run.outcome.params.vsini, 1.87);
        assert_eq!(
            calls.last(),
            Some(&Call::Write(run.outcome.synthetic.clone(), run.synthetic_path.clone()))
        );
    }

    #[test]
    fn atlas_atmospheres_pair_with_grevesse_1998() {
        let tk = RecordingToolkit::new();
        fit_synthetic(
            &tk,
            &ToolkitResources::new("/ispec"),
            &flat_grid(0.7),
            &record(5777.0, 4.44, 0.0),
            Path::new("obs/sun_normed.fits"),
            &settings(AtmosphereFamily::Atlas9Castelli),
        )
        .unwrap();

        let req = model_request(&tk);
        assert_eq!(
            req.model_atmospheres,
            PathBuf::from("/ispec/input/atmospheres/ATLAS9.Castelli")
        );
        assert_eq!(
            req.solar_abundances,
            PathBuf::from("/ispec/input/abundances/Grevesse.1998/stdatom.dat")
        );
    }

    #[test]
    fn synthesis_failure_skips_write() {
        let mut tk = RecordingToolkit::new();
        tk.fail_on = Some("model_spectrum");
        let result = fit_synthetic(
            &tk,
            &ToolkitResources::new("."),
            &flat_grid(0.7),
            &record(5777.0, 4.44, 0.0),
            Path::new("sun_normed.fits"),
            &settings(AtmosphereFamily::MarcsGes),
        );
        assert!(result.is_err());
        assert!(!tk.calls().iter().any(|c| matches!(c, Call::Write(..))));
    }
}
