use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::TelemetryError;
use super::TelemetrySource;

pub const QUERY_ARGS: [&str; 2] = ["--query-gpu=memory.free", "--format=csv,noheader,nounits"];

/// Reads free memory by shelling out to `nvidia-smi`.
#[derive(Debug, Clone)]
pub struct NvidiaSmi {
    program: PathBuf,
}

impl Default for NvidiaSmi {
    fn default() -> Self {
        Self::new("nvidia-smi")
    }
}

impl NvidiaSmi {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl TelemetrySource for NvidiaSmi {
    async fn fetch(&self) -> Result<Vec<u64>, TelemetryError> {
        let output = Command::new(&self.program)
            .args(QUERY_ARGS)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| TelemetryError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(TelemetryError::ExitStatus {
                program: self.program.display().to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_free_memory(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parses `csv,noheader,nounits` output: one integer per line, one line per
/// device. Interior blank lines are rejected so positions stay device indices.
pub fn parse_free_memory(stdout: &str) -> Result<Vec<u64>, TelemetryError> {
    let stdout = stdout.trim();
    if stdout.is_empty() {
        return Err(TelemetryError::NoDevices);
    }

    stdout
        .lines()
        .map(str::trim)
        .map(|line| {
            line.parse::<u64>().map_err(|source| TelemetryError::Parse {
                line: line.to_string(),
                source,
            })
        })
        .collect()
}
