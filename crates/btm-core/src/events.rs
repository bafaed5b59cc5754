//! Typed publish/subscribe for device state changes.

use crate::ScanReport;

use tokio::sync::broadcast;
use tracing::trace;

const EVENT_CAPACITY: usize = 128;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Informational message.
    Info,
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Error,
}

/// Progress of a connect attempt for one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// A connect request is in flight.
    Connecting {
        /// Address being connected.
        address: String,
    },
    /// The backend confirmed the connection.
    Connected {
        /// Connected address.
        address: String,
    },
    /// No connection.
    Disconnected,
}

/// Events published by the controllers after the store has been updated.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// Connect attempt progress.
    ConnectionStateChanged(ConnectionState),
    /// A device became connected or disconnected.
    DeviceConnectionChanged {
        /// Address of the device.
        address: String,
        /// New connection flag.
        connected: bool,
    },
    /// A connect attempt finished and its pending state was cleared.
    ConnectAttemptReset {
        /// Address of the attempt.
        address: String,
    },
    /// A scan finished and the discovered list was replaced.
    ScanCompleted(ScanReport),
    /// The paired list changed.
    PairedDevicesChanged,
    /// A favourite flag changed.
    FavoritesChanged {
        /// Address of the device.
        address: String,
        /// New favourite flag.
        favorite: bool,
    },
    /// Custom buttons of a device or the global set changed.
    ButtonsChanged {
        /// Device address, or `None` for global buttons.
        address: Option<String>,
    },
    /// A sequence command was sent.
    SequenceProgress {
        /// Index of the command just sent.
        index: usize,
        /// Number of commands in the sequence.
        total: usize,
    },
    /// The stored sequence was completed and removed.
    SequenceFinished {
        /// Number of commands sent.
        total: usize,
    },
    /// Transient user-facing message.
    Notification {
        /// Severity.
        level: NotificationLevel,
        /// Message text.
        message: String,
    },
}

/// Broadcast channel shared by all controllers.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DeviceEvent>,
}

impl EventBus {
    /// Create a bus with the default capacity.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: DeviceEvent) {
        trace!(event = ?event, "Publishing device event");
        let _ = self.tx.send(event);
    }

    /// Publish a notification.
    pub fn notify(&self, level: NotificationLevel, message: impl Into<String>) {
        self.publish(DeviceEvent::Notification {
            level,
            message: message.into(),
        });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
