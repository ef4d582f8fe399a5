//! HTTP/JSON bridge to the spectral toolkit.
//!
//! Each toolkit operation is a `POST {base_url}/{operation}` with a JSON body.
//! Successful replies are JSON objects; failures carry a non-2xx status and,
//! when the bridge can say more, a `{"error": "..."}` body.

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    CcfSettings, ContinuumSettings, NoiseDistribution, VelocityComponent, WavelengthRange,
};
use crate::error::AppError;
use crate::toolkit::{
    ContinuumHandle, SpectralToolkit, SpectrumHandle, SynthesisOutcome, SynthesisRequest,
};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8750";
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

pub struct ToolkitClient {
    client: Client,
    base_url: String,
}

impl ToolkitClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build toolkit HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn call<B: Serialize, T: DeserializeOwned>(
        &self,
        operation: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let url = endpoint(&self.base_url, operation);
        debug!(%url, "toolkit request");

        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| AppError::new(4, format!("Toolkit request '{operation}' failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(AppError::new(4, failure_message(operation, status.as_u16(), &text)));
        }

        resp.json().map_err(|e| {
            AppError::new(4, format!("Failed to parse toolkit '{operation}' response: {e}"))
        })
    }
}

fn endpoint(base_url: &str, operation: &str) -> String {
    format!("{}/{operation}", base_url.trim_end_matches('/'))
}

fn failure_message(operation: &str, status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => format!("Toolkit '{operation}' failed with status {status}: {}", err.error),
        Err(_) => format!("Toolkit '{operation}' failed with status {status}."),
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct PathBody<'a> {
    path: &'a Path,
}

#[derive(Serialize)]
struct SpectrumBody<'a> {
    spectrum: &'a SpectrumHandle,
}

#[derive(Serialize)]
struct CutBody<'a> {
    spectrum: &'a SpectrumHandle,
    wave_base: f64,
    wave_top: f64,
}

#[derive(Serialize)]
struct SnrBody<'a> {
    spectrum: &'a SpectrumHandle,
    num_points: u32,
}

#[derive(Serialize)]
struct NoiseBody<'a> {
    spectrum: &'a SpectrumHandle,
    snr: f64,
    distribution: NoiseDistribution,
}

#[derive(Serialize)]
struct ContinuumBody<'a> {
    spectrum: &'a SpectrumHandle,
    #[serde(flatten)]
    settings: &'a ContinuumSettings,
}

#[derive(Serialize)]
struct NormalizeBody<'a> {
    spectrum: &'a SpectrumHandle,
    continuum: &'a ContinuumHandle,
    consider_continuum_errors: bool,
}

#[derive(Serialize)]
struct CcfBody<'a> {
    spectrum: &'a SpectrumHandle,
    mask: &'a Path,
    #[serde(flatten)]
    settings: &'a CcfSettings,
}

#[derive(Serialize)]
struct VelocityBody<'a> {
    spectrum: &'a SpectrumHandle,
    rv: f64,
}

#[derive(Serialize)]
struct WriteBody<'a> {
    spectrum: &'a SpectrumHandle,
    path: &'a Path,
}

#[derive(Serialize)]
struct VmacBody {
    teff: f64,
    logg: f64,
    #[serde(rename = "MH")]
    mh: f64,
}

#[derive(Deserialize)]
struct SpectrumReply {
    spectrum: SpectrumHandle,
}

#[derive(Deserialize)]
struct ContinuumReply {
    continuum: ContinuumHandle,
}

#[derive(Deserialize)]
struct SnrReply {
    snr: f64,
}

#[derive(Deserialize)]
struct CcfReply {
    components: Vec<VelocityComponent>,
}

#[derive(Deserialize)]
struct VmacReply {
    vmac: f64,
}

impl SpectralToolkit for ToolkitClient {
    fn read_spectrum(&self, path: &Path) -> Result<SpectrumHandle, AppError> {
        let reply: SpectrumReply = self.call("read_spectrum", &PathBody { path })?;
        Ok(reply.spectrum)
    }

    fn wavelength_range(&self, spectrum: &SpectrumHandle) -> Result<WavelengthRange, AppError> {
        self.call("wavelength_range", &SpectrumBody { spectrum })
    }

    fn cut_spectrum(
        &self,
        spectrum: &SpectrumHandle,
        range: WavelengthRange,
    ) -> Result<SpectrumHandle, AppError> {
        let body = CutBody {
            spectrum,
            wave_base: range.wave_base,
            wave_top: range.wave_top,
        };
        let reply: SpectrumReply = self.call("cut_spectrum", &body)?;
        Ok(reply.spectrum)
    }

    fn estimate_snr(&self, spectrum: &SpectrumHandle, num_points: u32) -> Result<f64, AppError> {
        let reply: SnrReply = self.call("estimate_snr", &SnrBody { spectrum, num_points })?;
        Ok(reply.snr)
    }

    fn add_noise(
        &self,
        spectrum: &SpectrumHandle,
        snr: f64,
        distribution: NoiseDistribution,
    ) -> Result<SpectrumHandle, AppError> {
        let body = NoiseBody {
            spectrum,
            snr,
            distribution,
        };
        let reply: SpectrumReply = self.call("add_noise", &body)?;
        Ok(reply.spectrum)
    }

    fn fit_continuum(
        &self,
        spectrum: &SpectrumHandle,
        settings: &ContinuumSettings,
    ) -> Result<ContinuumHandle, AppError> {
        let reply: ContinuumReply =
            self.call("fit_continuum", &ContinuumBody { spectrum, settings })?;
        Ok(reply.continuum)
    }

    fn normalize_spectrum(
        &self,
        spectrum: &SpectrumHandle,
        continuum: &ContinuumHandle,
        consider_continuum_errors: bool,
    ) -> Result<SpectrumHandle, AppError> {
        let body = NormalizeBody {
            spectrum,
            continuum,
            consider_continuum_errors,
        };
        let reply: SpectrumReply = self.call("normalize_spectrum", &body)?;
        Ok(reply.spectrum)
    }

    fn cross_correlate_with_mask(
        &self,
        spectrum: &SpectrumHandle,
        mask: &Path,
        settings: &CcfSettings,
    ) -> Result<Vec<VelocityComponent>, AppError> {
        let body = CcfBody {
            spectrum,
            mask,
            settings,
        };
        let reply: CcfReply = self.call("cross_correlate_with_mask", &body)?;
        Ok(reply.components)
    }

    fn correct_velocity(
        &self,
        spectrum: &SpectrumHandle,
        rv: f64,
    ) -> Result<SpectrumHandle, AppError> {
        let reply: SpectrumReply = self.call("correct_velocity", &VelocityBody { spectrum, rv })?;
        Ok(reply.spectrum)
    }

    fn write_spectrum(&self, spectrum: &SpectrumHandle, path: &Path) -> Result<(), AppError> {
        let _: serde_json::Value = self.call("write_spectrum", &WriteBody { spectrum, path })?;
        Ok(())
    }

    fn estimate_vmac(&self, teff: f64, logg: f64, mh: f64) -> Result<f64, AppError> {
        let reply: VmacReply = self.call("estimate_vmac", &VmacBody { teff, logg, mh })?;
        Ok(reply.vmac)
    }

    fn model_spectrum(&self, request: &SynthesisRequest) -> Result<SynthesisOutcome, AppError> {
        self.call("model_spectrum", request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint("http://localhost:8750/", "estimate_snr"),
            "http://localhost:8750/estimate_snr"
        );
        assert_eq!(endpoint("http://h/api", "add_noise"), "http://h/api/add_noise");
    }

    #[test]
    fn failure_message_uses_error_body_when_present() {
        let msg = failure_message("read_spectrum", 500, r#"{"error": "file not found"}"#);
        assert_eq!(msg, "Toolkit 'read_spectrum' failed with status 500: file not found");

        let msg = failure_message("read_spectrum", 502, "<html>Bad Gateway</html>");
        assert_eq!(msg, "Toolkit 'read_spectrum' failed with status 502.");
    }

    #[test]
    fn continuum_body_flattens_settings() {
        let spectrum = SpectrumHandle("s1".to_string());
        let settings = ContinuumSettings::normalized();
        let v = serde_json::to_value(ContinuumBody {
            spectrum: &spectrum,
            settings: &settings,
        })
        .unwrap();
        assert_eq!(v["spectrum"], "s1");
        assert_eq!(v["model"], "fixed_value");
        assert_eq!(v["value"], 1.0);
    }

    #[test]
    fn ccf_body_carries_velocity_window() {
        let spectrum = SpectrumHandle("s2".to_string());
        let settings = CcfSettings::default();
        let v = serde_json::to_value(CcfBody {
            spectrum: &spectrum,
            mask: Path::new("mask.lst"),
            settings: &settings,
        })
        .unwrap();
        assert_eq!(v["mask"], "mask.lst");
        assert_eq!(v["lower_velocity_limit"], -200.0);
        assert_eq!(v["upper_velocity_limit"], 200.0);
        assert_eq!(v["fourier"], false);
    }

    #[test]
    fn new_trims_trailing_slash() {
        let client = ToolkitClient::new("http://127.0.0.1:8750/", 5).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8750");
    }
}
