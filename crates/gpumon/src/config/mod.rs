pub mod cli;
pub mod email;

use std::time::Duration;

/// Threshold and cadence handed from the CLI to the monitor loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Free memory in MiB at or above which a device counts as available.
    pub threshold_mib: u64,
    /// Sleep between two polls.
    pub interval: Duration,
}

impl From<&cli::Cli> for MonitorConfig {
    fn from(cli: &cli::Cli) -> Self {
        Self {
            threshold_mib: cli.memory_threshold,
            interval: Duration::from_secs(cli.check_interval),
        }
    }
}

pub use cli::*;
pub use email::*;
