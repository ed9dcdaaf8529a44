//! Threshold hysteresis over polled GPU free memory
//!
//! Each cycle the [`Monitor`] pulls readings from its [`TelemetrySource`],
//! announces every device that newly reaches the threshold in a single
//! [`Notifier`] call and forgets devices that fall back below it.

#[cfg(test)]
mod mock;
mod state;
mod types;

use tokio_util::sync::CancellationToken;

pub use state::NotificationState;
pub use types::gpu_list;
pub use types::AvailabilityAlert;
pub use types::CycleOutcome;
pub use types::Delivery;
pub use types::DeviceReading;

use crate::config::MonitorConfig;
use crate::notify::Notifier;
use crate::telemetry::TelemetrySource;

pub struct Monitor<T, N> {
    telemetry: T,
    notifier: N,
    config: MonitorConfig,
    state: NotificationState,
}

impl<T, N> Monitor<T, N>
where
    T: TelemetrySource,
    N: Notifier,
{
    pub fn new(telemetry: T, notifier: N, config: MonitorConfig) -> Self {
        Self {
            telemetry,
            notifier,
            config,
            state: NotificationState::new(),
        }
    }

    pub fn state(&self) -> &NotificationState {
        &self.state
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Polls until `cancellation_token` fires, sleeping the configured
    /// interval after every cycle. Cancellation is observed while sleeping.
    pub async fn run(&mut self, cancellation_token: CancellationToken) {
        tracing::info!(
            "Monitoring GPU free memory every {:?}, threshold {} MiB",
            self.config.interval,
            self.config.threshold_mib
        );

        loop {
            // A cycle always runs to completion so its state changes are never lost.
            self.poll_once().await;

            tokio::select! {
                biased;
                _ = cancellation_token.cancelled() => break,
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }

        tracing::info!("GPU monitor shutdown requested");
    }

    /// Runs one fetch, evaluate, notify cycle.
    pub async fn poll_once(&mut self) -> CycleOutcome {
        let free_memory = match self.telemetry.fetch().await {
            Ok(free_memory) if !free_memory.is_empty() => free_memory,
            Ok(_) => {
                tracing::error!("Failed to fetch GPU data: no devices reported");
                return CycleOutcome::Skipped;
            }
            Err(e) => {
                tracing::error!("Failed to fetch GPU data: {e}");
                return CycleOutcome::Skipped;
            }
        };

        let threshold = self.config.threshold_mib;
        let readings = DeviceReading::from_free_memory(free_memory);
        for reading in &readings {
            tracing::info!("GPU {}: {} MiB free memory.", reading.index, reading.free_mib);
        }

        let qualifying = self.state.newly_qualifying(&readings, threshold);
        let (notified, delivery) = if qualifying.is_empty() {
            (Vec::new(), None)
        } else {
            let alert = AvailabilityAlert::new(qualifying);
            let delivery = self.dispatch(&alert).await;
            // Marked even when delivery failed; the next alert comes only after a reset.
            let notified = alert.device_ids();
            self.state.mark_notified(notified.iter().copied());
            (notified, Some(delivery))
        };

        let reset = self.state.reset_below(&readings, threshold);
        for device in &reset {
            tracing::info!(
                "GPU {device} no longer meets the threshold. Resetting notification status."
            );
        }

        CycleOutcome::Evaluated {
            notified,
            reset,
            delivery,
        }
    }

    async fn dispatch(&self, alert: &AvailabilityAlert) -> Delivery {
        let device_ids = alert.device_ids();
        let list = gpu_list(&device_ids);
        tracing::info!("GPUs {list} meet the threshold. Sending notification...");

        match self.notifier.notify(&device_ids, &alert.message()).await {
            Ok(()) => {
                tracing::info!("Notification sent for GPU {list}");
                Delivery::Sent
            }
            Err(e) if e.is_auth_failure() => {
                tracing::error!("{e}");
                tracing::error!(
                    "Check that the sender account allows SMTP sign-in, or use an app password."
                );
                Delivery::Failed
            }
            Err(e) => {
                tracing::error!("Failed to send notification for GPU {list}: {e}");
                Delivery::Failed
            }
        }
    }
}
