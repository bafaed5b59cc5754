//! Client-side paired list: pairing from scan results, backend sync, favourites.

use crate::{
    CoreError, CoreResult, DeviceManagerApi, DeviceStore, EventBus,
    api::wire::is_error_status,
    device::{DeviceRecord, DeviceType, validation::validate_mac},
    events::{DeviceEvent, NotificationLevel},
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tracing::{error, info, instrument};

/// Manages the paired device list.
pub struct PairingController<A> {
    api: Arc<A>,
    store: DeviceStore,
    events: EventBus,
}

impl<A: DeviceManagerApi> PairingController<A> {
    /// Create a controller sharing the given store and bus.
    pub fn new(api: Arc<A>, store: DeviceStore, events: EventBus) -> Self {
        Self { api, store, events }
    }

    /// Paired devices in insertion order.
    pub fn paired_devices(&self) -> Vec<DeviceRecord> {
        self.store.read(|state| state.paired_devices())
    }

    /// Paired devices marked as favourite.
    pub fn favorite_devices(&self) -> Vec<DeviceRecord> {
        self.store.read(|state| state.favorite_devices())
    }

    /// Paired devices of one category.
    pub fn devices_of_type(&self, device_type: DeviceType) -> Vec<DeviceRecord> {
        self.paired_devices()
            .into_iter()
            .filter(|r| r.device_type == device_type)
            .collect()
    }

    /// Add a discovered device to the paired list.
    ///
    /// Returns false when it was already paired (its name and type are refreshed).
    #[track_caller]
    #[instrument(skip(self))]
    pub fn pair(&self, address: &str) -> CoreResult<bool> {
        let result = self.pair_discovered(address);
        self.reported("Pairing", result)
    }

    /// Remove a device from the paired list along with its buttons.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn unpair(&self, address: &str) -> CoreResult<()> {
        let result = self.remove_paired(address);
        self.reported("Unpairing", result)
    }

    /// Flip the favourite flag of a paired device and return the new value.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn toggle_favorite(&self, address: &str) -> CoreResult<bool> {
        let result = self.flip_favorite(address);
        self.reported("Updating favourites", result)
    }

    /// Merge the backend's paired devices into the local list.
    ///
    /// New addresses are appended; known ones get their name and type
    /// refreshed and keep favourite and commands. Returns how many were added.
    #[instrument(skip(self))]
    pub async fn sync_paired(&self) -> CoreResult<usize> {
        let result = self.fetch_and_merge().await;
        if let Ok(added) = &result {
            info!(added, "Paired devices synced");
            self.events.publish(DeviceEvent::PairedDevicesChanged);
        }
        self.reported("Loading paired devices", result)
    }

    #[track_caller]
    fn pair_discovered(&self, address: &str) -> CoreResult<bool> {
        let address = validate_mac(address)?;

        let added = self.store.update(|state| {
            let discovered = state
                .discovered
                .iter()
                .find(|r| r.has_address(&address))
                .cloned();
            discovered.map(|record| state.upsert_paired(record))
        })?;

        let Some(added) = added else {
            return Err(CoreError::DeviceNotFound {
                address,
                location: ErrorLocation::from(Location::caller()),
            });
        };

        info!(address = %address, added, "Device paired");
        self.events.publish(DeviceEvent::PairedDevicesChanged);
        Ok(added)
    }

    #[track_caller]
    fn remove_paired(&self, address: &str) -> CoreResult<()> {
        let address = validate_mac(address)?;

        if !self.store.update(|state| state.remove_paired(&address))? {
            return Err(CoreError::DeviceNotFound {
                address,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        info!(address = %address, "Device unpaired");
        self.events.publish(DeviceEvent::PairedDevicesChanged);
        self.events.publish(DeviceEvent::ButtonsChanged {
            address: Some(address),
        });
        Ok(())
    }

    #[track_caller]
    fn flip_favorite(&self, address: &str) -> CoreResult<bool> {
        let address = validate_mac(address)?;

        let Some(favorite) = self.store.update(|state| state.toggle_favorite(&address))? else {
            return Err(CoreError::DeviceNotFound {
                address,
                location: ErrorLocation::from(Location::caller()),
            });
        };

        self.events
            .publish(DeviceEvent::FavoritesChanged { address, favorite });
        Ok(favorite)
    }

    async fn fetch_and_merge(&self) -> CoreResult<usize> {
        let response = self.api.paired_devices().await?;
        if is_error_status(response.status.as_deref()) {
            return Err(CoreError::ServerRejected {
                message: response
                    .message
                    .unwrap_or_else(|| "could not load paired devices".to_string()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.store.update(|state| {
            let mut added = 0;
            for device in response.devices {
                if state.upsert_paired(DeviceRecord::from(device)) {
                    added += 1;
                }
            }
            added
        })
    }

    fn reported<T>(&self, action: &str, result: CoreResult<T>) -> CoreResult<T> {
        if let Err(e) = &result {
            error!(action = action, error = %e, "Paired list operation failed");
            self.events
                .notify(NotificationLevel::Error, format!("{} failed: {}", action, e));
        }
        result
    }
}
