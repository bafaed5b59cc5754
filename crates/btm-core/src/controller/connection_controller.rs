//! Connect/disconnect requests and connection status tracking.
//!
//! The backend does not report connect completion, so a connect is a
//! poll-after-delay: `POST /connect`, wait, then ask `/connection_status`
//! which address is connected. The whole attempt is bounded by a client-side
//! timeout; nothing is sent to the server when it fires.

use crate::{
    CoreError, CoreResult, DeviceManagerApi, DeviceStore, EventBus,
    controller::Timing,
    device::validation::validate_mac,
    events::{ConnectionState, DeviceEvent, NotificationLevel},
};

use std::{
    collections::HashMap,
    panic::Location,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use error_location::ErrorLocation;
use tokio::{sync::watch, time::MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

/// Issues connect/disconnect requests and keeps the store's connected device in sync.
pub struct ConnectionController<A> {
    api: Arc<A>,
    store: DeviceStore,
    events: EventBus,
    timing: Timing,
    /// Pending attempt generation per address. A newer attempt overwrites the
    /// entry, and only the attempt whose generation is stored may clear it.
    attempts: Mutex<HashMap<String, u64>>,
    next_generation: AtomicU64,
}

impl<A: DeviceManagerApi> ConnectionController<A> {
    /// Create a controller sharing the given store and bus.
    pub fn new(api: Arc<A>, store: DeviceStore, events: EventBus, timing: Timing) -> Self {
        Self {
            api,
            store,
            events,
            timing,
            attempts: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Connect to a device and confirm it through `/connection_status`.
    ///
    /// # Errors
    ///
    /// `InvalidAddress` for a malformed MAC, transport/HTTP errors from the
    /// backend, `AddressMismatch` when the backend reports a different
    /// device, and `ConnectTimeout` when the attempt exceeds the timeout.
    #[instrument(skip(self))]
    pub async fn connect(&self, address: &str) -> CoreResult<()> {
        let address = match validate_mac(address) {
            Ok(address) => address,
            Err(e) => {
                self.report_failure("Connect", &e);
                return Err(e);
            }
        };

        let generation = self.begin_attempt(&address);
        self.events
            .publish(DeviceEvent::ConnectionStateChanged(ConnectionState::Connecting {
                address: address.clone(),
            }));
        info!(address = %address, generation, "Connecting");

        let timeout = self.timing.connect_timeout;
        let result = match tokio::time::timeout(timeout, self.attempt(&address)).await {
            Ok(result) => result,
            Err(_) => Err(CoreError::ConnectTimeout {
                address: address.clone(),
                timeout_ms: duration_ms(timeout),
                location: ErrorLocation::from(Location::caller()),
            }),
        };

        self.finish_attempt(&address, generation);

        match &result {
            Ok(()) => {
                info!(address = %address, "Connected");
                self.events.notify(
                    NotificationLevel::Success,
                    format!("Connected to {}", address),
                );
            }
            Err(e) => self.report_failure("Connect", e),
        }

        result
    }

    /// Disconnect the current device. Any 2xx counts as success.
    #[instrument(skip(self))]
    pub async fn disconnect(&self) -> CoreResult<()> {
        if let Err(e) = self.api.disconnect().await {
            self.report_failure("Disconnect", &e);
            return Err(e);
        }

        if let Err(e) = self.apply_connected(None) {
            self.report_failure("Disconnect", &e);
            return Err(e);
        }
        self.events
            .publish(DeviceEvent::ConnectionStateChanged(ConnectionState::Disconnected));
        self.events.notify(NotificationLevel::Success, "Disconnected");
        info!("Disconnected");

        Ok(())
    }

    /// Poll `/connection_status` once and sync the store with it.
    ///
    /// Returns the connected address reported by the backend.
    #[instrument(skip(self))]
    pub async fn refresh_status(&self) -> CoreResult<Option<String>> {
        let result = self.sync_status().await;
        if let Err(e) = &result {
            self.report_failure("Status refresh", e);
        }
        result
    }

    /// Poll the connection status until `shutdown` flips to true.
    ///
    /// Poll failures are logged, not notified, and the loop keeps going.
    #[instrument(skip(self, shutdown))]
    pub async fn watch_status(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.timing.status_poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Status watcher shutting down");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.sync_status().await {
                        warn!(error = %e, "Connection status poll failed");
                    }
                }
            }
        }
    }

    /// Whether a connect attempt for this address is pending.
    pub fn is_connecting(&self, address: &str) -> bool {
        self.lock_attempts()
            .contains_key(&address.trim().to_ascii_uppercase())
    }

    /// Address of the connected device according to the store.
    pub fn connected_address(&self) -> Option<String> {
        self.store
            .read(|state| state.connected_address().map(str::to_string))
    }

    async fn sync_status(&self) -> CoreResult<Option<String>> {
        let status = self.api.connection_status().await?;
        let connected = status.connected_address().map(str::to_ascii_uppercase);
        self.apply_connected(connected.as_deref())?;
        Ok(connected)
    }

    async fn attempt(&self, address: &str) -> CoreResult<()> {
        self.api.connect(address).await?;

        debug!(
            address = %address,
            delay_ms = duration_ms(self.timing.confirm_delay),
            "Connect request accepted, waiting before confirming"
        );
        tokio::time::sleep(self.timing.confirm_delay).await;

        let status = self.api.connection_status().await?;
        let actual = status.connected_address().map(str::to_ascii_uppercase);

        // Whatever was requested, the store follows what the backend reports.
        self.apply_connected(actual.as_deref())?;

        if actual.as_deref() == Some(address) {
            self.events
                .publish(DeviceEvent::ConnectionStateChanged(ConnectionState::Connected {
                    address: address.to_string(),
                }));
            Ok(())
        } else {
            Err(CoreError::AddressMismatch {
                expected: address.to_string(),
                actual,
                location: ErrorLocation::from(Location::caller()),
            })
        }
    }

    /// Update the store's connected device and publish per-device changes.
    #[track_caller]
    fn apply_connected(&self, address: Option<&str>) -> CoreResult<()> {
        let Some(previous) = self.store.update(|state| state.set_connected(address))? else {
            return Ok(());
        };

        if let Some(previous) = previous {
            self.events.publish(DeviceEvent::DeviceConnectionChanged {
                address: previous,
                connected: false,
            });
        }
        if let Some(current) = address {
            self.events.publish(DeviceEvent::DeviceConnectionChanged {
                address: current.to_ascii_uppercase(),
                connected: true,
            });
        }

        Ok(())
    }

    fn begin_attempt(&self, address: &str) -> u64 {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        if let Some(superseded) = self.lock_attempts().insert(address.to_string(), generation) {
            debug!(address = %address, superseded, generation, "Superseding pending connect attempt");
        }
        generation
    }

    /// Clear the pending entry if this attempt still owns it, then publish the reset.
    fn finish_attempt(&self, address: &str, generation: u64) {
        let owned = {
            let mut attempts = self.lock_attempts();
            if attempts.get(address) == Some(&generation) {
                attempts.remove(address);
                true
            } else {
                false
            }
        };

        if owned {
            self.events.publish(DeviceEvent::ConnectAttemptReset {
                address: address.to_string(),
            });
        } else {
            debug!(address = %address, generation, "Stale connect attempt finished, newer attempt pending");
        }
    }

    fn report_failure(&self, action: &str, e: &CoreError) {
        error!(action = action, error = %e, "Connection operation failed");
        self.events
            .notify(NotificationLevel::Error, format!("{} failed: {}", action, e));
    }

    fn lock_attempts(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.attempts.lock().unwrap_or_else(|e| {
            error!("Connect attempt lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
