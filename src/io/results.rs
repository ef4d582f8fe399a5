//! Result files.
//!
//! - parameter and error tables: one-row CSV each, header
//!   `teff,logg,MH,alpha,vmic,vmac,vsini,limb_darkening_coeff,R`
//! - run summary: pretty JSON (`domain::RunSummary`)

use std::fs::File;
use std::path::Path;

use crate::domain::{RunSummary, StellarParams};
use crate::error::AppError;

/// Write a one-row parameter table.
pub fn write_params_csv(path: &Path, params: &StellarParams) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);
    writer
        .serialize(params)
        .map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", path.display())))?;
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush '{}': {e}", path.display())))?;
    Ok(())
}

/// Read a table written by [`write_params_csv`].
pub fn read_params_csv(path: &Path) -> Result<StellarParams, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open '{}': {e}", path.display())))?;
    let mut reader = csv::Reader::from_reader(file);
    reader
        .deserialize::<StellarParams>()
        .next()
        .ok_or_else(|| AppError::new(2, format!("'{}' has no data row.", path.display())))?
        .map_err(|e| {
            AppError::new(2, format!("Invalid parameter row in '{}': {e}", path.display()))
        })
}

pub fn write_run_summary(path: &Path, summary: &RunSummary) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create run summary '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::new(2, format!("Failed to write run summary: {e}")))?;
    Ok(())
}

pub fn read_run_summary(path: &Path) -> Result<RunSummary, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open run summary '{}': {e}", path.display()))
    })?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid run summary JSON: {e}")))
}
