//! Bluetooth Manager client library.
//!
//! Typed client for a Bluetooth device-manager backend: scanning, pairing,
//! connection tracking, custom buttons and command sequences, with all
//! client state kept in one persisted [`DeviceStore`].
//!
//! # Example
//!
//! ```no_run
//! use btm_core::{CoreResult, DeviceManager, DeviceStore, HttpApi, Timing};
//!
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let api = HttpApi::new("http://localhost:5000", Duration::from_secs(10))?;
//!     let store = DeviceStore::open("store.json")?;
//!     let manager = DeviceManager::new(api, store, Timing::default());
//!
//!     let report = manager.scan().start_scanning().await?;
//!     for entry in report.new_devices() {
//!         println!("{} {}", entry.device.address, entry.device.name);
//!     }
//!
//!     manager.connection().connect("00:11:22:33:44:55").await?;
//!     manager.sequencer().send_command("0x01020304").await?;
//!     Ok(())
//! }
//! ```

mod api;
mod controller;
mod device;
mod error;
mod events;
mod manager;
mod store;

pub use {
    api::{
        ConnectionStatus, DeviceManagerApi, DiscoveredDevice, DiscoveredDevicesResponse, HttpApi,
        PairedDevicesResponse,
    },
    controller::{
        ButtonRegistry, CommandSequencer, ConnectionController, PairingController, ScanController,
        ScanEntry, ScanReport, SequenceState, Timing, dedupe_by_address, order_new_before_paired,
    },
    device::{
        ActiveSequence, CustomButton, DeviceCommand, DeviceRecord, DeviceType,
        validation::{is_valid_hex_payload, is_valid_mac, validate_hex_payload, validate_mac},
    },
    error::{CoreError, Result as CoreResult},
    events::{ConnectionState, DeviceEvent, EventBus, NotificationLevel},
    manager::DeviceManager,
    store::{DeviceStore, StoreState},
};

#[cfg(test)]
mod tests;
