//! GPU free-memory telemetry
//!
//! A [`TelemetrySource`] reports one free-memory value in MiB per device; the
//! position in the returned vector is the device index.

pub mod nvidia_smi;
pub mod nvml;

use std::io;
use std::num::ParseIntError;
use std::process::ExitStatus;

use async_trait::async_trait;
use nvml_wrapper::error::NvmlError;
use thiserror::Error;

pub use nvidia_smi::NvidiaSmi;
pub use nvml::NvmlTelemetry;

pub const BYTES_PER_MIB: u64 = 1024 * 1024;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    ExitStatus {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("invalid free memory value `{line}`: {source}")]
    Parse {
        line: String,
        #[source]
        source: ParseIntError,
    },

    #[error("no GPU readings reported")]
    NoDevices,

    #[error("NVML failed with `{0}`")]
    Nvml(#[from] NvmlError),

    #[error("telemetry query task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Free memory in MiB for every device, ordered by device index.
    async fn fetch(&self) -> Result<Vec<u64>, TelemetryError>;
}

#[async_trait]
impl<T: TelemetrySource + ?Sized> TelemetrySource for Box<T> {
    async fn fetch(&self) -> Result<Vec<u64>, TelemetryError> {
        (**self).fetch().await
    }
}
