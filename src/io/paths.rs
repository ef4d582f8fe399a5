//! Output file naming.
//!
//! Spectra produced by the run are written next to the input spectrum;
//! tabular results go to the output directory.

use std::path::{Path, PathBuf};

use crate::domain::SynthesisCode;

fn spectrum_stem(star_file: &Path) -> String {
    star_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `<dir>/<stem>_normed.fits`
pub fn normed_spectrum_path(star_file: &Path) -> PathBuf {
    star_file.with_file_name(format!("{}_normed.fits", spectrum_stem(star_file)))
}

/// `<dir>/<stem>_<code>_<line_list>.fits`
pub fn synthetic_spectrum_path(star_file: &Path, code: SynthesisCode, line_list: u32) -> PathBuf {
    star_file.with_file_name(format!("{}_{code}_{line_list}.fits", spectrum_stem(star_file)))
}

/// `<out>/<star>_params_<code>_<line_list>.txt`
pub fn params_path(output_dir: &Path, star: &str, code: SynthesisCode, line_list: u32) -> PathBuf {
    output_dir.join(format!("{star}_params_{code}_{line_list}.txt"))
}

/// `<out>/<star>_errors_<code>_<line_list>.txt`
pub fn errors_path(output_dir: &Path, star: &str, code: SynthesisCode, line_list: u32) -> PathBuf {
    output_dir.join(format!("{star}_errors_{code}_{line_list}.txt"))
}

/// `<out>/<star>_run_<code>_<line_list>.json`
pub fn summary_path(output_dir: &Path, star: &str, code: SynthesisCode, line_list: u32) -> PathBuf {
    output_dir.join(format!("{star}_run_{code}_{line_list}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spectrum_paths_sit_next_to_input() {
        let input = Path::new("data/HD10700.fits");
        assert_eq!(normed_spectrum_path(input), PathBuf::from("data/HD10700_normed.fits"));
        assert_eq!(
            synthetic_spectrum_path(input, SynthesisCode::Turbospectrum, 1),
            PathBuf::from("data/HD10700_turbospectrum_1.fits")
        );
    }

    #[test]
    fn bare_file_name_stays_relative() {
        assert_eq!(normed_spectrum_path(Path::new("sun.fits")), PathBuf::from("sun_normed.fits"));
    }

    #[test]
    fn result_paths_use_star_code_and_list() {
        let out = Path::new("results");
        assert_eq!(
            params_path(out, "Sun", SynthesisCode::Moog, 2),
            PathBuf::from("results/Sun_params_moog_2.txt")
        );
        assert_eq!(
            errors_path(out, "Sun", SynthesisCode::Synthe, 1),
            PathBuf::from("results/Sun_errors_synthe_1.txt")
        );
        assert_eq!(
            summary_path(out, "Sun", SynthesisCode::Moog, 2),
            PathBuf::from("results/Sun_run_moog_2.json")
        );
    }
}
