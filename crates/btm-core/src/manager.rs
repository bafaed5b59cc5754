use crate::{
    ButtonRegistry, CommandSequencer, ConnectionController, CoreResult, DeviceManagerApi,
    DeviceStore, EventBus, PairingController, ScanController, Timing,
    events::{DeviceEvent, NotificationLevel},
};

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{error, info, instrument};

/// Wires the store, event bus and controllers around one backend API.
pub struct DeviceManager<A> {
    api: Arc<A>,
    store: DeviceStore,
    events: EventBus,
    connection: ConnectionController<A>,
    scan: ScanController<A>,
    pairing: PairingController<A>,
    buttons: ButtonRegistry,
    sequencer: CommandSequencer<A>,
}

impl<A: DeviceManagerApi> DeviceManager<A> {
    /// Build a manager. All controllers share `store` and a fresh event bus.
    pub fn new(api: A, store: DeviceStore, timing: Timing) -> Self {
        let api = Arc::new(api);
        let events = EventBus::new();

        Self {
            connection: ConnectionController::new(
                Arc::clone(&api),
                store.clone(),
                events.clone(),
                timing,
            ),
            scan: ScanController::new(Arc::clone(&api), store.clone(), events.clone(), timing),
            pairing: PairingController::new(Arc::clone(&api), store.clone(), events.clone()),
            buttons: ButtonRegistry::new(store.clone(), events.clone()),
            sequencer: CommandSequencer::new(Arc::clone(&api), store.clone(), events.clone()),
            api,
            store,
            events,
        }
    }

    /// The backend API.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Connect/disconnect and status tracking.
    pub fn connection(&self) -> &ConnectionController<A> {
        &self.connection
    }

    /// Scanning.
    pub fn scan(&self) -> &ScanController<A> {
        &self.scan
    }

    /// Paired list and favourites.
    pub fn pairing(&self) -> &PairingController<A> {
        &self.pairing
    }

    /// Custom buttons.
    pub fn buttons(&self) -> &ButtonRegistry {
        &self.buttons
    }

    /// Command sequences.
    pub fn sequencer(&self) -> &CommandSequencer<A> {
        &self.sequencer
    }

    /// The shared store.
    pub fn store(&self) -> &DeviceStore {
        &self.store
    }

    /// The shared event bus.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe to device events.
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.events.subscribe()
    }

    /// Press a custom button: run its commands.
    #[instrument(skip(self))]
    pub async fn press_button(&self, address: Option<&str>, label_or_id: &str) -> CoreResult<()> {
        let button = self.buttons.find(address, label_or_id)?;
        info!(button_id = %button.id, label = %button.label, "Button pressed");
        self.sequencer.execute(button.commands).await
    }

    /// Ask the backend to clear its logs.
    #[instrument(skip(self))]
    pub async fn clear_logs(&self) -> CoreResult<()> {
        match self.api.clear_logs().await {
            Ok(()) => {
                self.events.notify(NotificationLevel::Info, "Logs cleared");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Clearing logs failed");
                self.events
                    .notify(NotificationLevel::Error, format!("Clearing logs failed: {}", e));
                Err(e)
            }
        }
    }

    /// Ask a debug backend to fake a connection, then refresh the status.
    #[instrument(skip(self))]
    pub async fn simulate_connection(&self) -> CoreResult<Option<String>> {
        if let Err(e) = self.api.simulate_connection().await {
            error!(error = %e, "Simulated connection failed");
            self.events.notify(
                NotificationLevel::Error,
                format!("Simulated connection failed: {}", e),
            );
            return Err(e);
        }
        self.connection.refresh_status().await
    }
}
