use crate::device::DeviceRecord;

/// One device found by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    /// The discovered device.
    pub device: DeviceRecord,
    /// Signal strength in dBm, if reported.
    pub signal: Option<i32>,
    /// Whether the address was already in the paired list.
    pub already_paired: bool,
}

/// Ordered scan results: new devices first, already paired ones after.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Entries in display order.
    pub entries: Vec<ScanEntry>,
}

impl ScanReport {
    /// Devices that are not paired yet.
    pub fn new_devices(&self) -> impl Iterator<Item = &ScanEntry> {
        self.entries.iter().filter(|e| !e.already_paired)
    }

    /// Devices that were already paired.
    pub fn already_paired(&self) -> impl Iterator<Item = &ScanEntry> {
        self.entries.iter().filter(|e| e.already_paired)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the scan found nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
