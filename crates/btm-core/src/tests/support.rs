//! Recording fake of the backend API and small fixtures.

use crate::{
    ConnectionStatus, CoreError, CoreResult, DeviceEvent, DeviceManagerApi, DeviceType,
    DiscoveredDevice, DiscoveredDevicesResponse, EventBus, NotificationLevel,
    PairedDevicesResponse,
};

use std::{
    collections::VecDeque,
    panic::Location,
    path::PathBuf,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use error_location::ErrorLocation;
use tokio::sync::broadcast;
use uuid::Uuid;

/// A call received by [`FakeApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ApiCall {
    Scan,
    DiscoveredDevices,
    Connect(String),
    Disconnect,
    ConnectionStatus,
    PairedDevices,
    Send {
        data: String,
        continue_sequence: bool,
    },
    ClearLogs,
    SimulateConnection,
}

/// In-process stand-in for the backend that records every call.
#[derive(Default)]
pub(crate) struct FakeApi {
    calls: Mutex<Vec<ApiCall>>,
    discovered: Mutex<DiscoveredDevicesResponse>,
    paired: Mutex<PairedDevicesResponse>,
    status: Mutex<ConnectionStatus>,
    connect_delays: Mutex<VecDeque<Duration>>,
    connect_hangs: AtomicBool,
    connect_updates_status: AtomicBool,
    status_fails: AtomicBool,
    fail_send_at: Mutex<Option<usize>>,
}

#[allow(clippy::unwrap_used)]
impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Backend that reports the requested address as connected after `/connect`.
    pub(crate) fn connecting() -> Self {
        let api = Self::default();
        api.connect_updates_status.store(true, Ordering::SeqCst);
        api
    }

    pub(crate) fn with_discovered(self, devices: Vec<DiscoveredDevice>) -> Self {
        *self.discovered.lock().unwrap() = DiscoveredDevicesResponse {
            status: Some("success".to_string()),
            devices,
            message: None,
        };
        self
    }

    pub(crate) fn with_discovered_response(self, response: DiscoveredDevicesResponse) -> Self {
        *self.discovered.lock().unwrap() = response;
        self
    }

    pub(crate) fn with_paired(self, devices: Vec<DiscoveredDevice>) -> Self {
        *self.paired.lock().unwrap() = PairedDevicesResponse {
            status: Some("success".to_string()),
            devices,
            message: None,
        };
        self
    }

    pub(crate) fn with_paired_response(self, response: PairedDevicesResponse) -> Self {
        *self.paired.lock().unwrap() = response;
        self
    }

    pub(crate) fn with_status(self, address: Option<&str>) -> Self {
        self.set_status(address);
        self
    }

    pub(crate) fn with_hanging_connect(self) -> Self {
        self.connect_hangs.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn with_connect_delays(self, delays: Vec<Duration>) -> Self {
        *self.connect_delays.lock().unwrap() = delays.into();
        self
    }

    pub(crate) fn with_failing_status(self) -> Self {
        self.status_fails.store(true, Ordering::SeqCst);
        self
    }

    /// Fail the n-th (0-based) `/send` call.
    pub(crate) fn with_failing_send_at(self, index: usize) -> Self {
        *self.fail_send_at.lock().unwrap() = Some(index);
        self
    }

    pub(crate) fn set_status(&self, address: Option<&str>) {
        *self.status.lock().unwrap() = ConnectionStatus {
            connected: address.is_some(),
            address: address.map(str::to_string),
        };
    }

    pub(crate) fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    /// `(data, continue_sequence)` of every `/send` call, in order.
    pub(crate) fn sends(&self) -> Vec<(String, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::Send {
                    data,
                    continue_sequence,
                } => Some((data, continue_sequence)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[allow(clippy::unwrap_used)]
impl DeviceManagerApi for FakeApi {
    async fn scan(&self) -> CoreResult<()> {
        self.record(ApiCall::Scan);
        Ok(())
    }

    async fn discovered_devices(&self) -> CoreResult<DiscoveredDevicesResponse> {
        self.record(ApiCall::DiscoveredDevices);
        Ok(self.discovered.lock().unwrap().clone())
    }

    async fn connect(&self, address: &str) -> CoreResult<()> {
        self.record(ApiCall::Connect(address.to_string()));

        if self.connect_hangs.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }

        let delay = self.connect_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.connect_updates_status.load(Ordering::SeqCst) {
            self.set_status(Some(address));
        }
        Ok(())
    }

    async fn disconnect(&self) -> CoreResult<()> {
        self.record(ApiCall::Disconnect);
        self.set_status(None);
        Ok(())
    }

    async fn connection_status(&self) -> CoreResult<ConnectionStatus> {
        self.record(ApiCall::ConnectionStatus);
        if self.status_fails.load(Ordering::SeqCst) {
            return Err(CoreError::HttpStatus {
                endpoint: "/connection_status".to_string(),
                status: 503,
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(self.status.lock().unwrap().clone())
    }

    async fn paired_devices(&self) -> CoreResult<PairedDevicesResponse> {
        self.record(ApiCall::PairedDevices);
        Ok(self.paired.lock().unwrap().clone())
    }

    async fn send(&self, data: &str, continue_sequence: bool) -> CoreResult<()> {
        let index = self.sends().len();
        self.record(ApiCall::Send {
            data: data.to_string(),
            continue_sequence,
        });

        if *self.fail_send_at.lock().unwrap() == Some(index) {
            return Err(CoreError::HttpStatus {
                endpoint: "/send".to_string(),
                status: 500,
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }

    async fn clear_logs(&self) -> CoreResult<()> {
        self.record(ApiCall::ClearLogs);
        Ok(())
    }

    async fn simulate_connection(&self) -> CoreResult<()> {
        self.record(ApiCall::SimulateConnection);
        self.set_status(Some("AA:BB:CC:DD:EE:FF"));
        Ok(())
    }
}

pub(crate) fn discovered(name: &str, address: &str) -> DiscoveredDevice {
    DiscoveredDevice {
        name: name.to_string(),
        address: address.to_string(),
        device_type: DeviceType::Other,
        signal: Some(-60),
    }
}

/// Every event currently queued on the receiver.
pub(crate) fn drain(rx: &mut broadcast::Receiver<DeviceEvent>) -> Vec<DeviceEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub(crate) fn count_resets(events: &[DeviceEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, DeviceEvent::ConnectAttemptReset { .. }))
        .count()
}

/// Error notifications among the events.
pub(crate) fn count_errors(events: &[DeviceEvent]) -> usize {
    events
        .iter()
        .filter(|e| {
            matches!(
                e,
                DeviceEvent::Notification {
                    level: NotificationLevel::Error,
                    ..
                }
            )
        })
        .count()
}

/// Fresh bus plus a receiver subscribed before anything is published.
pub(crate) fn bus() -> (EventBus, broadcast::Receiver<DeviceEvent>) {
    let events = EventBus::new();
    let rx = events.subscribe();
    (events, rx)
}

/// Unique scratch directory under the system temp dir.
pub(crate) fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("btm-core-test-{}", Uuid::new_v4()))
}
