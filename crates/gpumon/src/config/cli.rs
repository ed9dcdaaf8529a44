use std::path::PathBuf;

use chrono_tz::Tz;
use clap::Parser;
use clap::ValueEnum;
use utils::version;

use crate::config::email::EmailArgs;

/// Where free-memory readings come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TelemetryBackend {
    /// Run `nvidia-smi --query-gpu=memory.free` each cycle
    NvidiaSmi,
    /// Query the NVIDIA Management Library directly
    Nvml,
}

#[derive(Parser, Debug, Clone)]
#[command(about, long_about = None, version = &**version::VERSION)]
pub struct Cli {
    #[arg(
        long,
        env = "MEMORY_THRESHOLD",
        default_value_t = 20480,
        help = "Free memory in MiB at or above which a GPU counts as available"
    )]
    pub memory_threshold: u64,

    #[arg(
        long,
        env = "CHECK_INTERVAL",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Seconds to sleep between two polls"
    )]
    pub check_interval: u64,

    #[arg(
        long,
        env = "TIMEZONE",
        default_value = "Asia/Taipei",
        value_parser = parse_timezone,
        help = "IANA zone used for log timestamps"
    )]
    pub timezone: Tz,

    #[arg(
        long,
        env = "GPUMON_LOG_FILE",
        default_value = "gpu_monitor.log",
        value_hint = clap::ValueHint::FilePath,
        help = "Log file, appended to on every start"
    )]
    pub log_file: PathBuf,

    #[arg(
        long,
        env = "GPUMON_TELEMETRY_BACKEND",
        value_enum,
        default_value_t = TelemetryBackend::NvidiaSmi
    )]
    pub telemetry_backend: TelemetryBackend,

    #[arg(
        long,
        env = "NVIDIA_SMI_PATH",
        default_value = "nvidia-smi",
        value_hint = clap::ValueHint::ExecutablePath,
        help = "nvidia-smi binary used by the nvidia-smi backend"
    )]
    pub nvidia_smi_path: PathBuf,

    #[command(flatten)]
    pub email: EmailArgs,

    #[arg(long, help = "Run a single poll cycle and exit")]
    pub once: bool,
}

fn parse_timezone(s: &str) -> Result<Tz, String> {
    s.parse::<Tz>()
        .map_err(|e| format!("unknown IANA time zone '{s}': {e}"))
}
