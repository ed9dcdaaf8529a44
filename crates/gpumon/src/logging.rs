//! provides logging helpers

use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use chrono_tz::Tz;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::filter::{self};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry;
use utils::logging::ZonedFormatter;

const DEFAULT_LOG_FILE: &str = "gpu_monitor.log";

/// Splits a log path into the directory and file name the appender expects.
fn split_log_path(log_file: &Path) -> (PathBuf, String) {
    let dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    let file_name = log_file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_LOG_FILE)
        .to_string();
    (dir, file_name)
}

/// initiate the global tracing subscriber
///
/// Every event goes to stderr and is appended to `log_file`, both rendered
/// with timestamps in `zone`. The returned guard flushes the file on drop.
pub fn init(log_file: &Path, zone: Tz) -> Result<WorkerGuard> {
    let (dir, file_name) = split_log_path(log_file);

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(&file_name)
        .build(&dir)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;
    let (file_writer, file_guard) = tracing_appender::non_blocking(appender);

    let env_filter = filter::EnvFilter::builder()
        .with_default_directive(filter::LevelFilter::INFO.into())
        .from_env_lossy();

    let console_layer = layer()
        .event_format(ZonedFormatter::new(zone))
        .with_writer(std::io::stderr);

    let file_layer = layer()
        .event_format(ZonedFormatter::new(zone))
        .with_writer(file_writer)
        .with_ansi(false);

    registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(file_guard)
}
