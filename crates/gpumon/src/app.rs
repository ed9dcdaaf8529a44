use anyhow::Context;
use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::config::Cli;
use crate::config::MonitorConfig;
use crate::config::TelemetryBackend;
use crate::monitor::Monitor;
use crate::notify::EmailConfig;
use crate::notify::EmailNotifier;
use crate::telemetry::NvidiaSmi;
use crate::telemetry::NvmlTelemetry;
use crate::telemetry::TelemetrySource;

/// Creates the telemetry backend selected on the command line.
pub fn build_telemetry(cli: &Cli) -> Result<Box<dyn TelemetrySource>> {
    let telemetry: Box<dyn TelemetrySource> = match cli.telemetry_backend {
        TelemetryBackend::NvidiaSmi => {
            tracing::info!("Reading GPU memory via {}", cli.nvidia_smi_path.display());
            Box::new(NvidiaSmi::new(cli.nvidia_smi_path.clone()))
        }
        TelemetryBackend::Nvml => {
            Box::new(NvmlTelemetry::init().context("failed to initialize NVML")?)
        }
    };
    Ok(telemetry)
}

pub fn build_notifier(cli: &Cli) -> EmailNotifier {
    let config = EmailConfig::from(&cli.email);
    if !config.has_credentials() {
        tracing::warn!(
            "SENDER_EMAIL, RECEIVER_EMAIL or EMAIL_PASSWORD is not set; notifications will fail"
        );
    }
    EmailNotifier::new(config)
}

/// Wires the collaborators and runs the monitor until `cancellation_token`
/// fires, or for a single cycle with `--once`.
pub async fn run(cli: Cli, cancellation_token: CancellationToken) -> Result<()> {
    let telemetry = build_telemetry(&cli)?;
    let notifier = build_notifier(&cli);
    let mut monitor = Monitor::new(telemetry, notifier, MonitorConfig::from(&cli));

    if cli.once {
        let outcome = monitor.poll_once().await;
        tracing::info!("Single poll finished: {outcome:?}");
    } else {
        monitor.run(cancellation_token).await;
    }
    Ok(())
}

/// Cancels `cancellation_token` on SIGTERM or SIGINT.
pub fn spawn_shutdown_listener(cancellation_token: CancellationToken) -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::signal;
        use tokio::signal::unix::SignalKind;

        let mut sigterm =
            signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("failed to install SIGINT handler")?;

        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, initiating graceful shutdown");
                }
            }
            cancellation_token.cancel();
        });
    }
    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {e}");
                return;
            }
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
            cancellation_token.cancel();
        });
    }
    Ok(())
}
