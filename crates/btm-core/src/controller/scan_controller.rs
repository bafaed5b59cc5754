use crate::{
    CoreError, CoreResult, DeviceManagerApi, DeviceStore, EventBus,
    api::{DiscoveredDevice, wire::is_error_status},
    controller::{ScanEntry, ScanReport, Timing},
    device::DeviceRecord,
    events::{DeviceEvent, NotificationLevel},
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument};

/// Runs backend scans and records the discovered devices.
pub struct ScanController<A> {
    api: Arc<A>,
    store: DeviceStore,
    events: EventBus,
    timing: Timing,
}

impl<A: DeviceManagerApi> ScanController<A> {
    /// Create a controller sharing the given store and bus.
    pub fn new(api: Arc<A>, store: DeviceStore, events: EventBus, timing: Timing) -> Self {
        Self {
            api,
            store,
            events,
            timing,
        }
    }

    /// Start a scan, wait for it to settle and collect the results.
    ///
    /// The wait is fixed; the backend gives no completion signal.
    #[instrument(skip(self))]
    pub async fn start_scanning(&self) -> CoreResult<ScanReport> {
        match self.scan().await {
            Ok(report) => {
                let new_count = report.new_devices().count();
                info!(found = report.len(), new = new_count, "Scan complete");
                self.events.notify(
                    NotificationLevel::Info,
                    format!("Found {} devices ({} new)", report.len(), new_count),
                );
                self.events
                    .publish(DeviceEvent::ScanCompleted(report.clone()));
                Ok(report)
            }
            Err(e) => {
                error!(error = %e, "Scan failed");
                self.events
                    .notify(NotificationLevel::Error, format!("Scan failed: {}", e));
                Err(e)
            }
        }
    }

    /// Latest scan results from the store.
    pub fn discovered_devices(&self) -> Vec<DeviceRecord> {
        self.store.read(|state| state.discovered_devices())
    }

    async fn scan(&self) -> CoreResult<ScanReport> {
        self.api.scan().await?;

        debug!(
            delay_ms = self.timing.scan_settle_delay.as_millis(),
            "Scan started, waiting for results"
        );
        tokio::time::sleep(self.timing.scan_settle_delay).await;

        let response = self.api.discovered_devices().await?;
        if is_error_status(response.status.as_deref()) {
            return Err(CoreError::ServerRejected {
                message: response
                    .message
                    .unwrap_or_else(|| "scan failed".to_string()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let devices = dedupe_by_address(response.devices);

        let report = self.store.update(|state| {
            let entries = devices
                .into_iter()
                .map(|device| {
                    let already_paired = state.is_paired(&device.address);
                    let signal = device.signal;
                    ScanEntry {
                        device: DeviceRecord::from(device),
                        signal,
                        already_paired,
                    }
                })
                .collect();

            let entries = order_new_before_paired(entries);
            state.set_discovered(entries.iter().map(|e| e.device.clone()).collect());
            ScanReport { entries }
        })?;

        Ok(report)
    }
}

/// Drop repeated addresses, keeping the first occurrence.
pub fn dedupe_by_address(devices: Vec<DiscoveredDevice>) -> Vec<DiscoveredDevice> {
    let mut unique: Vec<DiscoveredDevice> = Vec::with_capacity(devices.len());
    for device in devices {
        if !unique
            .iter()
            .any(|d| d.address.eq_ignore_ascii_case(&device.address))
        {
            unique.push(device);
        }
    }
    unique
}

/// Stable partition: new devices first, already paired after, each group in input order.
pub fn order_new_before_paired(mut entries: Vec<ScanEntry>) -> Vec<ScanEntry> {
    entries.sort_by_key(|entry| entry.already_paired);
    entries
}
