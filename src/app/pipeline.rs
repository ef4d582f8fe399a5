//! The fit pipeline shared by the `fit` command and tests.
//!
//! star CSV -> limb table -> normalization -> synthesis fit -> result files
//!
//! Everything runs sequentially; each step needs the previous one's output.

use tracing::{debug, info};

use crate::domain::{FitConfig, RunSummary, StarRecord};
use crate::error::AppError;
use crate::fit::normalize::{NormalizedSpectrum, normalize_observed};
use crate::fit::synthesis::{SynthesisRun, SynthesisSettings, fit_synthetic};
use crate::io::paths::{errors_path, params_path, summary_path};
use crate::io::results::{write_params_csv, write_run_summary};
use crate::io::star::read_star_record;
use crate::limb::{LimbDarkeningGrid, load_limb_table};
use crate::toolkit::{SpectralToolkit, ToolkitClient, ToolkitResources};

/// All computed outputs of a single `vsini fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub record: StarRecord,
    pub normalized: NormalizedSpectrum,
    pub synthesis: SynthesisRun,
}

/// Execute the full pipeline against the configured toolkit bridge.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    // The table is a startup precondition: fail before touching the toolkit.
    let grid = load_limb_table(&config.limb_table, &config.limb_column)?;
    let record = read_star_record(&config.input)?;

    let toolkit = ToolkitClient::new(&config.toolkit_url, config.timeout_secs)?;
    info!(url = toolkit.base_url(), "using spectral toolkit bridge");

    run_fit_with(&toolkit, &grid, record, config)
}

/// Execute the pipeline with an already-loaded grid and record.
pub fn run_fit_with<T: SpectralToolkit + ?Sized>(
    toolkit: &T,
    grid: &LimbDarkeningGrid,
    record: StarRecord,
    config: &FitConfig,
) -> Result<RunOutput, AppError> {
    let resources = ToolkitResources::new(&config.ispec_dir);
    info!(
        star = %record.star,
        code = %config.code,
        line_list = config.line_list,
        "starting fit"
    );

    let normalized = normalize_observed(
        toolkit,
        &resources,
        &record.star_file,
        record.snr,
        config.wavelength,
    )?;

    let settings = SynthesisSettings {
        code: config.code,
        line_list: config.line_list,
        atmosphere: config.atmosphere,
        max_iterations: config.max_iterations,
    };
    let synthesis =
        fit_synthetic(toolkit, &resources, grid, &record, &normalized.path, &settings)?;

    let run = RunOutput {
        record,
        normalized,
        synthesis,
    };
    write_outputs(&run, config)?;
    Ok(run)
}

fn write_outputs(run: &RunOutput, config: &FitConfig) -> Result<(), AppError> {
    info!("saving results");
    std::fs::create_dir_all(&config.output_dir).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create output dir '{}': {e}", config.output_dir.display()),
        )
    })?;

    let star = &run.record.star;
    let outcome = &run.synthesis.outcome;
    if let Some(status) = &outcome.status {
        debug!(%status, "optimizer status");
    }
    write_params_csv(
        &params_path(&config.output_dir, star, config.code, config.line_list),
        &outcome.params,
    )?;
    write_params_csv(
        &errors_path(&config.output_dir, star, config.code, config.line_list),
        &outcome.errors,
    )?;

    let summary = RunSummary {
        tool: "vsini".to_string(),
        generated: chrono::Utc::now(),
        star: run.record.clone(),
        code: config.code,
        line_list: config.line_list,
        atmosphere: config.atmosphere,
        wavelength: config.wavelength,
        estimated_snr: run.normalized.estimated_snr,
        radial_velocity: run.normalized.velocity,
        normed_spectrum: run.normalized.path.clone(),
        synthetic_spectrum: run.synthesis.synthetic_path.clone(),
        initial: run.synthesis.initial,
        params: outcome.params,
        errors: outcome.errors,
        status: outcome.status.clone(),
    };
    write_run_summary(
        &summary_path(&config.output_dir, star, config.code, config.line_list),
        &summary,
    )
}
