use std::collections::BTreeSet;

use super::types::DeviceReading;

/// Devices that are above the threshold and have already been announced.
///
/// Devices never seen, or seen below the threshold since their last alert,
/// are not in the set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationState {
    notified: BTreeSet<u32>,
}

impl NotificationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_notified(&self, device: u32) -> bool {
        self.notified.contains(&device)
    }

    /// Notified devices, ascending.
    pub fn notified(&self) -> impl Iterator<Item = u32> + '_ {
        self.notified.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.notified.is_empty()
    }

    /// Readings at or above `threshold_mib` whose device has not been announced yet.
    pub fn newly_qualifying(
        &self,
        readings: &[DeviceReading],
        threshold_mib: u64,
    ) -> Vec<DeviceReading> {
        readings
            .iter()
            .filter(|reading| reading.free_mib >= threshold_mib && !self.is_notified(reading.index))
            .copied()
            .collect()
    }

    pub fn mark_notified(&mut self, devices: impl IntoIterator<Item = u32>) {
        self.notified.extend(devices);
    }

    /// Clears every notified device that now reads below `threshold_mib` and
    /// returns the cleared indices in reading order. Devices missing from
    /// `readings` keep their state.
    pub fn reset_below(&mut self, readings: &[DeviceReading], threshold_mib: u64) -> Vec<u32> {
        readings
            .iter()
            .filter(|reading| reading.free_mib < threshold_mib)
            .filter_map(|reading| self.notified.remove(&reading.index).then_some(reading.index))
            .collect()
    }
}
