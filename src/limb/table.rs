//! Reference table loading.
//!
//! The table is a headed CSV; only the coefficient column is read, in file
//! order. Any problem here is fatal: the interpolator is never built from a
//! partial or misaligned table.

use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::error::AppError;
use crate::limb::grid::LimbDarkeningGrid;

/// Default coefficient column name.
pub const DEFAULT_COLUMN: &str = "Limbo";

/// Load the limb-darkening grid from a CSV file.
pub fn load_limb_table(path: &Path, column: &str) -> Result<LimbDarkeningGrid, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            3,
            format!("Failed to open limb-darkening table '{}': {e}", path.display()),
        )
    })?;

    let grid = read_limb_table(file, column)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {}", path.display(), e.message())))?;

    info!(path = %path.display(), column, "loaded limb-darkening table");
    Ok(grid)
}

/// Parse a limb-darkening table from any reader.
pub fn read_limb_table<R: std::io::Read>(
    reader: R,
    column: &str,
) -> Result<LimbDarkeningGrid, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(3, format!("Failed to read table headers: {e}")))?
        .clone();

    let col_idx = headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}') == column)
        .ok_or_else(|| {
            AppError::new(3, format!("Missing column '{column}' in limb-darkening table."))
        })?;

    let mut values = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::new(3, format!("CSV parse error at line {line}: {e}")))?;
        let raw = record
            .get(col_idx)
            .ok_or_else(|| AppError::new(3, format!("Line {line} has no '{column}' field.")))?;
        let value = raw
            .parse::<f64>()
            .map_err(|e| {
                AppError::new(3, format!("Invalid '{column}' value '{raw}' at line {line}: {e}"))
            })?;
        values.push(value);
    }

    LimbDarkeningGrid::from_values(values)
}
