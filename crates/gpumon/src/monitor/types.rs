use std::fmt::Write;

/// Free memory of one device as seen by a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceReading {
    pub index: u32,
    pub free_mib: u64,
}

impl DeviceReading {
    /// Pairs each value with its position, which is the device index.
    pub fn from_free_memory(values: impl IntoIterator<Item = u64>) -> Vec<Self> {
        (0u32..)
            .zip(values)
            .map(|(index, free_mib)| Self { index, free_mib })
            .collect()
    }
}

/// Comma separated device indices, e.g. `0, 2, 3`.
pub fn gpu_list(device_ids: &[u32]) -> String {
    device_ids
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Devices that crossed the threshold in the same poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityAlert {
    devices: Vec<DeviceReading>,
}

impl AvailabilityAlert {
    pub fn new(mut devices: Vec<DeviceReading>) -> Self {
        devices.sort_by_key(|reading| reading.index);
        Self { devices }
    }

    pub fn devices(&self) -> &[DeviceReading] {
        &self.devices
    }

    pub fn device_ids(&self) -> Vec<u32> {
        self.devices.iter().map(|reading| reading.index).collect()
    }

    /// One line per device with its free memory.
    pub fn message(&self) -> String {
        let mut message = String::new();
        for reading in &self.devices {
            let _ = writeln!(
                message,
                "GPU {} has {} MiB of free memory available.",
                reading.index, reading.free_mib
            );
        }
        message
    }
}

/// Whether the notifier accepted the batch of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Failed,
}

/// What a single poll cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Telemetry failed or returned nothing; state untouched.
    Skipped,
    Evaluated {
        /// Devices that moved to notified, ascending.
        notified: Vec<u32>,
        /// Devices that dropped below the threshold again, ascending.
        reset: Vec<u32>,
        /// `None` when nobody newly qualified.
        delivery: Option<Delivery>,
    },
}
