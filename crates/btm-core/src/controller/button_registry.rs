use crate::{
    CoreError, CoreResult, DeviceStore, EventBus,
    device::{
        CustomButton, DeviceCommand,
        validation::{validate_commands, validate_mac},
    },
    events::{DeviceEvent, NotificationLevel},
};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// Custom command buttons, per device and global.
///
/// `address: None` addresses the global set everywhere in this API.
pub struct ButtonRegistry {
    store: DeviceStore,
    events: EventBus,
}

impl ButtonRegistry {
    /// Create a registry sharing the given store and bus.
    pub fn new(store: DeviceStore, events: EventBus) -> Self {
        Self { store, events }
    }

    /// Buttons of a device, or the global buttons.
    #[track_caller]
    pub fn list(&self, address: Option<&str>) -> CoreResult<Vec<CustomButton>> {
        let result = self.buttons_of(address);
        self.reported(result)
    }

    #[track_caller]
    fn buttons_of(&self, address: Option<&str>) -> CoreResult<Vec<CustomButton>> {
        match address {
            Some(address) => {
                let address = validate_mac(address)?;
                Ok(self
                    .store
                    .read(|state| state.device_buttons(&address).to_vec()))
            }
            None => Ok(self.store.read(|state| state.custom_buttons().to_vec())),
        }
    }

    /// Add a button after validating all its payloads.
    #[track_caller]
    #[instrument(skip(self, commands))]
    pub fn add(
        &self,
        address: Option<&str>,
        label: &str,
        commands: Vec<DeviceCommand>,
    ) -> CoreResult<CustomButton> {
        self.reported(validate_commands(&commands))?;
        let address = self.reported(address.map(validate_mac).transpose())?;

        let button = CustomButton::new(label.trim(), commands);
        let stored = button.clone();

        self.reported(self.store.update(|state| match &address {
            Some(address) => state.device_buttons_mut(address).push(stored),
            None => state.custom_buttons.push(stored),
        }))?;

        info!(button_id = %button.id, label = %button.label, "Button added");
        self.events.publish(DeviceEvent::ButtonsChanged { address });
        Ok(button)
    }

    /// Remove a button by id.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn remove(&self, address: Option<&str>, id: Uuid) -> CoreResult<()> {
        let address = self.reported(address.map(validate_mac).transpose())?;

        let removed = self.reported(self.store.update(|state| {
            let buttons = match &address {
                Some(address) => state.device_buttons_mut(address),
                None => &mut state.custom_buttons,
            };
            let before = buttons.len();
            buttons.retain(|b| b.id != id);
            let removed = before != buttons.len();
            state.prune_empty_buttons();
            removed
        }))?;

        if !removed {
            return self.reported(Err(CoreError::ButtonNotFound {
                button: id.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }));
        }

        info!(button_id = %id, "Button removed");
        self.events.publish(DeviceEvent::ButtonsChanged { address });
        Ok(())
    }

    /// Find a button by id or case-insensitive label.
    #[track_caller]
    pub fn find(&self, address: Option<&str>, label_or_id: &str) -> CoreResult<CustomButton> {
        let wanted = label_or_id.trim();
        let id = Uuid::parse_str(wanted).ok();

        let location = ErrorLocation::from(Location::caller());

        let found = self.buttons_of(address).and_then(|buttons| {
            buttons
                .into_iter()
                .find(|b| Some(b.id) == id || b.label.eq_ignore_ascii_case(wanted))
                .ok_or(CoreError::ButtonNotFound {
                    button: wanted.to_string(),
                    location,
                })
        });
        self.reported(found)
    }

    fn reported<T>(&self, result: CoreResult<T>) -> CoreResult<T> {
        if let Err(e) = &result {
            error!(error = %e, "Button operation failed");
            self.events
                .notify(NotificationLevel::Error, format!("Button update failed: {}", e));
        }
        result
    }
}
