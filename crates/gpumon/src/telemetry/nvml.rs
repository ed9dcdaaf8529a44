use std::sync::Arc;

use async_trait::async_trait;
use nvml_wrapper::Nvml;

use super::TelemetryError;
use super::TelemetrySource;
use super::BYTES_PER_MIB;

/// Reads free memory through NVML. The library is loaded once and reused for
/// every poll.
pub struct NvmlTelemetry {
    nvml: Arc<Nvml>,
}

impl NvmlTelemetry {
    pub fn init() -> Result<Self, TelemetryError> {
        let nvml = Nvml::init()?;
        tracing::info!(
            "NVML initialized, driver version {}",
            nvml.sys_driver_version()
                .unwrap_or_else(|_| "unknown".to_string())
        );
        Ok(Self {
            nvml: Arc::new(nvml),
        })
    }
}

fn query(nvml: &Nvml) -> Result<Vec<u64>, TelemetryError> {
    let mut readings = Vec::new();
    for i in 0..nvml.device_count()? {
        let device = nvml.device_by_index(i)?;
        readings.push(device.memory_info()?.free / BYTES_PER_MIB);
    }
    Ok(readings)
}

#[async_trait]
impl TelemetrySource for NvmlTelemetry {
    async fn fetch(&self) -> Result<Vec<u64>, TelemetryError> {
        // NVML calls block on the driver; keep them off the async workers.
        let nvml = Arc::clone(&self.nvml);
        tokio::task::spawn_blocking(move || query(&nvml)).await?
    }
}
