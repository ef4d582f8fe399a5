//! Run summary and result lines printed to stdout.

use crate::app::pipeline::RunOutput;
use crate::domain::{FitConfig, InitialGuess, StellarParams};

/// The final answer line, e.g. `vsini = 1.87 +/- 0.12`.
pub fn format_vsini(params: &StellarParams, errors: &StellarParams) -> String {
    format!("vsini = {} +/- {}", params.vsini, errors.vsini)
}

/// Format the run summary: input, normalization diagnostics and fitted values.
pub fn format_run_summary(run: &RunOutput, config: &FitConfig) -> String {
    let mut out = String::new();

    out.push_str("=== vsini - synthetic spectral fit ===\n");
    out.push_str(&format!(
        "Star: {} ({})\n",
        run.record.star,
        run.record.star_file.display()
    ));
    out.push_str(&format!(
        "Code: {} | line list: {} | atmospheres: {}\n",
        config.code,
        config.line_list,
        config.atmosphere.dir_name()
    ));
    out.push_str(&format!(
        "Range: {:.1}..{:.1} nm | SNR: nominal={:.1} estimated={:.1}\n",
        config.wavelength.wave_base,
        config.wavelength.wave_top,
        run.record.snr,
        run.normalized.estimated_snr
    ));
    out.push_str(&format!(
        "RV: {:.2} +/- {:.2} km/s ({} CCF component{})\n",
        run.normalized.velocity.rv,
        run.normalized.velocity.rv_err,
        run.normalized.velocity.components,
        if run.normalized.velocity.components == 1 { "" } else { "s" }
    ));

    out.push_str("\nInitial guess:\n");
    out.push_str(&format_initial(&run.synthesis.initial));

    out.push_str("\nFitted parameters:\n");
    out.push_str(&format_params_table(
        &run.synthesis.outcome.params,
        &run.synthesis.outcome.errors,
    ));

    out.push_str(&format!(
        "\nSpectra: {} | {}\n",
        run.normalized.path.display(),
        run.synthesis.synthetic_path.display()
    ));

    out
}

fn format_initial(g: &InitialGuess) -> String {
    format!(
        "  teff={:.0} logg={:.2} MH={:.2} alpha={:.3} vmic={:.2} vmac={:.2} \
         vsini={:.2} ldc={:.4} R={:.0}\n",
        g.teff, g.logg, g.mh, g.alpha, g.vmic, g.vmac, g.vsini, g.limb_darkening_coeff, g.r
    )
}

fn format_params_table(params: &StellarParams, errors: &StellarParams) -> String {
    let rows = [
        ("teff", params.teff, errors.teff),
        ("logg", params.logg, errors.logg),
        ("MH", params.mh, errors.mh),
        ("alpha", params.alpha, errors.alpha),
        ("vmic", params.vmic, errors.vmic),
        ("vmac", params.vmac, errors.vmac),
        ("vsini", params.vsini, errors.vsini),
        ("limb_darkening_coeff", params.limb_darkening_coeff, errors.limb_darkening_coeff),
        ("R", params.r, errors.r),
    ];

    let mut out = String::new();
    for (name, value, err) in rows {
        out.push_str(&format!("  {name:<22}{value:>12.4} +/- {err:<10.4}\n"));
    }
    out
}
