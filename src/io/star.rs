//! Star input record parsing.
//!
//! The input CSV has no header row. Columns, in order:
//!
//! ```text
//! star, star_file, snr, resolution, teff, logg, vmic, MH
//! ```
//!
//! Only the first record is used; a file with several stars is accepted but
//! the remaining rows are ignored with a warning.

use std::fs::File;
use std::path::Path;

use tracing::warn;

use crate::domain::StarRecord;
use crate::error::AppError;

/// Read the star record from a CSV file.
pub fn read_star_record(path: &Path) -> Result<StarRecord, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open star CSV '{}': {e}", path.display()))
    })?;
    parse_star_record(file)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {}", path.display(), e.message())))
}

/// Parse the star record from any reader.
pub fn parse_star_record<R: std::io::Read>(reader: R) -> Result<StarRecord, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = reader.deserialize::<StarRecord>();
    let first = records
        .next()
        .ok_or_else(|| AppError::new(2, "Star CSV is empty."))?
        .map_err(|e| AppError::new(2, format!("Invalid star record: {e}")))?;

    let extra = records.count();
    if extra > 0 {
        warn!(extra, star = %first.star, "star CSV has additional rows; only the first is used");
    }

    validate(&first)?;
    Ok(first)
}

fn validate(record: &StarRecord) -> Result<(), AppError> {
    if record.star.is_empty() {
        return Err(AppError::new(2, "Star name is empty."));
    }
    if record.star_file.as_os_str().is_empty() {
        return Err(AppError::new(2, "Spectrum file path is empty."));
    }

    let numeric = [
        ("snr", record.snr),
        ("resolution", record.resolution),
        ("teff", record.teff),
        ("logg", record.logg),
        ("vmic", record.vmic),
        ("MH", record.mh),
    ];
    for (name, value) in numeric {
        if !value.is_finite() {
            return Err(AppError::new(2, format!("Star record field '{name}' is not finite.")));
        }
    }
    if record.snr <= 0.0 {
        return Err(AppError::new(2, format!("SNR must be > 0 (got {}).", record.snr)));
    }
    if record.resolution <= 0.0 {
        return Err(AppError::new(
            2,
            format!("Resolution must be > 0 (got {}).", record.resolution),
        ));
    }
    Ok(())
}
