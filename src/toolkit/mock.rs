//! In-memory toolkit that records every call, for pipeline tests.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use crate::domain::{
    CcfSettings, ContinuumSettings, NoiseDistribution, StellarParams, VelocityComponent,
    WavelengthRange,
};
use crate::error::AppError;
use crate::toolkit::{
    ContinuumHandle, SpectralToolkit, SpectrumHandle, SynthesisOutcome, SynthesisRequest,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Read(PathBuf),
    Range(SpectrumHandle),
    Cut(SpectrumHandle, WavelengthRange),
    Snr(SpectrumHandle, u32),
    Noise(SpectrumHandle, f64, NoiseDistribution),
    Continuum(SpectrumHandle, ContinuumSettings),
    Normalize(SpectrumHandle, ContinuumHandle, bool),
    Ccf(SpectrumHandle, PathBuf, CcfSettings),
    Velocity(SpectrumHandle, f64),
    Write(SpectrumHandle, PathBuf),
    Vmac(f64, f64, f64),
    Model(Box<SynthesisRequest>),
}

pub struct RecordingToolkit {
    pub calls: RefCell<Vec<Call>>,
    pub components: Vec<VelocityComponent>,
    pub snr: f64,
    pub vmac: f64,
    pub range: WavelengthRange,
    pub fitted: StellarParams,
    pub errors: StellarParams,
    pub status: Option<serde_json::Value>,
    pub fail_on: Option<&'static str>,
    next_id: Cell<u32>,
}

impl RecordingToolkit {
    pub fn new() -> Self {
        let fitted = StellarParams {
            teff: 5777.0,
            logg: 4.44,
            mh: 0.0,
            alpha: 0.05,
            vmic: 1.0,
            vmac: 3.6,
            vsini: 1.87,
            limb_darkening_coeff: 0.61,
            r: 47000.0,
        };
        let errors = StellarParams {
            teff: 0.0,
            logg: 0.0,
            mh: 0.0,
            alpha: 0.0,
            vmic: 0.0,
            vmac: 0.0,
            vsini: 0.12,
            limb_darkening_coeff: 0.0,
            r: 0.0,
        };
        Self {
            calls: RefCell::new(Vec::new()),
            components: vec![VelocityComponent {
                mu: 12.3456,
                emu: 0.0349,
            }],
            snr: 123.4,
            vmac: 3.5,
            range: WavelengthRange::new(470.0, 680.0),
            fitted,
            errors,
            status: Some(serde_json::json!({ "converged": true, "iterations": 4 })),
            fail_on: None,
            next_id: Cell::new(0),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, name: &'static str, call: Call) -> Result<(), AppError> {
        self.calls.borrow_mut().push(call);
        if self.fail_on == Some(name) {
            return Err(AppError::new(4, format!("mock failure in {name}")));
        }
        Ok(())
    }

    fn fresh(&self, prefix: &str) -> String {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        format!("{prefix}{id}")
    }
}

impl SpectralToolkit for RecordingToolkit {
    fn read_spectrum(&self, path: &Path) -> Result<SpectrumHandle, AppError> {
        self.record("read_spectrum", Call::Read(path.to_path_buf()))?;
        Ok(SpectrumHandle(self.fresh("s")))
    }

    fn wavelength_range(&self, spectrum: &SpectrumHandle) -> Result<WavelengthRange, AppError> {
        self.record("wavelength_range", Call::Range(spectrum.clone()))?;
        Ok(self.range)
    }

    fn cut_spectrum(
        &self,
        spectrum: &SpectrumHandle,
        range: WavelengthRange,
    ) -> Result<SpectrumHandle, AppError> {
        self.record("cut_spectrum", Call::Cut(spectrum.clone(), range))?;
        Ok(SpectrumHandle(self.fresh("s")))
    }

    fn estimate_snr(&self, spectrum: &SpectrumHandle, num_points: u32) -> Result<f64, AppError> {
        self.record("estimate_snr", Call::Snr(spectrum.clone(), num_points))?;
        Ok(self.snr)
    }

    fn add_noise(
        &self,
        spectrum: &SpectrumHandle,
        snr: f64,
        distribution: NoiseDistribution,
    ) -> Result<SpectrumHandle, AppError> {
        self.record("add_noise", Call::Noise(spectrum.clone(), snr, distribution))?;
        Ok(SpectrumHandle(self.fresh("s")))
    }

    fn fit_continuum(
        &self,
        spectrum: &SpectrumHandle,
        settings: &ContinuumSettings,
    ) -> Result<ContinuumHandle, AppError> {
        self.record("fit_continuum", Call::Continuum(spectrum.clone(), settings.clone()))?;
        Ok(ContinuumHandle(self.fresh("c")))
    }

    fn normalize_spectrum(
        &self,
        spectrum: &SpectrumHandle,
        continuum: &ContinuumHandle,
        consider_continuum_errors: bool,
    ) -> Result<SpectrumHandle, AppError> {
        self.record(
            "normalize_spectrum",
            Call::Normalize(spectrum.clone(), continuum.clone(), consider_continuum_errors),
        )?;
        Ok(SpectrumHandle(self.fresh("s")))
    }

    fn cross_correlate_with_mask(
        &self,
        spectrum: &SpectrumHandle,
        mask: &Path,
        settings: &CcfSettings,
    ) -> Result<Vec<VelocityComponent>, AppError> {
        self.record(
            "cross_correlate_with_mask",
            Call::Ccf(spectrum.clone(), mask.to_path_buf(), *settings),
        )?;
        Ok(self.components.clone())
    }

    fn correct_velocity(
        &self,
        spectrum: &SpectrumHandle,
        rv: f64,
    ) -> Result<SpectrumHandle, AppError> {
        self.record("correct_velocity", Call::Velocity(spectrum.clone(), rv))?;
        Ok(SpectrumHandle(self.fresh("s")))
    }

    fn write_spectrum(&self, spectrum: &SpectrumHandle, path: &Path) -> Result<(), AppError> {
        self.record("write_spectrum", Call::Write(spectrum.clone(), path.to_path_buf()))
    }

    fn estimate_vmac(&self, teff: f64, logg: f64, mh: f64) -> Result<f64, AppError> {
        self.record("estimate_vmac", Call::Vmac(teff, logg, mh))?;
        Ok(self.vmac)
    }

    fn model_spectrum(&self, request: &SynthesisRequest) -> Result<SynthesisOutcome, AppError> {
        self.record("model_spectrum", Call::Model(Box::new(request.clone())))?;
        Ok(SynthesisOutcome {
            params: self.fitted,
            errors: self.errors,
            synthetic: SpectrumHandle(self.fresh("synth")),
            status: self.status.clone(),
        })
    }
}
