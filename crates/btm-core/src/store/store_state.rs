use crate::{
    device::{ActiveSequence, CustomButton, DeviceRecord, normalize_address},
    store::keys,
};

use std::collections::BTreeMap;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::warn;

/// In-memory form of the persisted document.
///
/// The connected device is held once in `connected`; the `connected` flag on
/// individual records is ignored here and recomputed on every read, so at
/// most one device can ever appear connected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    pub(crate) paired: Vec<DeviceRecord>,
    pub(crate) discovered: Vec<DeviceRecord>,
    pub(crate) connected: Option<String>,
    pub(crate) device_buttons: BTreeMap<String, Vec<CustomButton>>,
    pub(crate) custom_buttons: Vec<CustomButton>,
    pub(crate) active_sequence: Option<ActiveSequence>,
}

impl StoreState {
    /// Decode a store document. Keys that fail to decode are reset to empty.
    ///
    /// Returns the state and whether any key had to be reset.
    pub(crate) fn from_document(document: &Map<String, Value>) -> (Self, bool) {
        let mut repaired = false;

        let paired: Vec<DeviceRecord> =
            decode_key(document, keys::PAIRED_DEVICES, &mut repaired);
        let favorites: Vec<DeviceRecord> =
            decode_key(document, keys::FAVORITE_DEVICES, &mut repaired);
        let discovered: Vec<DeviceRecord> =
            decode_key(document, keys::DISCOVERED_DEVICES, &mut repaired);
        let custom_buttons: Vec<CustomButton> =
            decode_key(document, keys::CUSTOM_BUTTONS, &mut repaired);
        let active_sequence: Option<ActiveSequence> =
            decode_key(document, keys::ACTIVE_COMMAND_SEQUENCE, &mut repaired);

        let mut device_buttons = BTreeMap::new();
        for key in document.keys() {
            if let Some(address) = key.strip_prefix(keys::DEVICE_BUTTONS_PREFIX) {
                let buttons: Vec<CustomButton> = decode_key(document, key, &mut repaired);
                if !buttons.is_empty() {
                    device_buttons.insert(normalize_address(address), buttons);
                }
            }
        }

        let connected = paired
            .iter()
            .chain(discovered.iter())
            .find(|record| record.connected)
            .map(|record| normalize_address(&record.address));

        let mut state = Self {
            paired: dedupe(paired),
            discovered: dedupe(discovered),
            connected,
            device_buttons,
            custom_buttons,
            active_sequence,
        };

        for favorite in dedupe(favorites) {
            match state.paired.iter_mut().find(|r| r.address == favorite.address) {
                Some(record) => record.favorite = true,
                None => state.paired.push(DeviceRecord {
                    favorite: true,
                    connected: false,
                    ..favorite
                }),
            }
        }

        (state, repaired)
    }

    /// Encode into the persisted document layout.
    pub(crate) fn to_document(&self) -> serde_json::Result<Map<String, Value>> {
        let mut document = Map::new();

        let paired = self.paired_devices();
        let favorites: Vec<DeviceRecord> = paired.iter().filter(|r| r.favorite).cloned().collect();

        insert_key(&mut document, keys::PAIRED_DEVICES, &paired)?;
        insert_key(&mut document, keys::FAVORITE_DEVICES, &favorites)?;
        insert_key(
            &mut document,
            keys::DISCOVERED_DEVICES,
            &self.discovered_devices(),
        )?;
        insert_key(&mut document, keys::CUSTOM_BUTTONS, &self.custom_buttons)?;

        for (address, buttons) in &self.device_buttons {
            insert_key(&mut document, &keys::device_buttons_key(address), buttons)?;
        }

        if let Some(sequence) = &self.active_sequence {
            insert_key(&mut document, keys::ACTIVE_COMMAND_SEQUENCE, sequence)?;
        }

        Ok(document)
    }

    /// Paired devices with the derived `connected` flag.
    pub fn paired_devices(&self) -> Vec<DeviceRecord> {
        self.with_connection(&self.paired)
    }

    /// Latest scan results with the derived `connected` flag.
    pub fn discovered_devices(&self) -> Vec<DeviceRecord> {
        self.with_connection(&self.discovered)
    }

    /// Paired devices marked as favourite.
    pub fn favorite_devices(&self) -> Vec<DeviceRecord> {
        self.paired_devices()
            .into_iter()
            .filter(|r| r.favorite)
            .collect()
    }

    /// Look up a device by address, paired list first.
    pub fn device(&self, address: &str) -> Option<DeviceRecord> {
        let key = normalize_address(address);
        self.paired
            .iter()
            .chain(self.discovered.iter())
            .find(|r| r.address == key)
            .map(|r| self.connection_view(r))
    }

    /// Whether the address is in the paired list.
    pub fn is_paired(&self, address: &str) -> bool {
        let key = normalize_address(address);
        self.paired.iter().any(|r| r.address == key)
    }

    /// Address of the connected device, if any.
    pub fn connected_address(&self) -> Option<&str> {
        self.connected.as_deref()
    }

    /// Replace the connected address. Returns the previous one when it changed.
    pub(crate) fn set_connected(&mut self, address: Option<&str>) -> Option<Option<String>> {
        let next = address.map(normalize_address);
        if next == self.connected {
            return None;
        }
        Some(std::mem::replace(&mut self.connected, next))
    }

    /// Insert or refresh a paired device, keeping favourite and commands.
    ///
    /// Returns true when the address was not paired before.
    pub(crate) fn upsert_paired(&mut self, record: DeviceRecord) -> bool {
        let address = normalize_address(&record.address);
        match self.paired.iter_mut().find(|r| r.address == address) {
            Some(existing) => {
                existing.name = record.name;
                existing.device_type = record.device_type;
                if record.commands.is_some() {
                    existing.commands = record.commands;
                }
                false
            }
            None => {
                self.paired.push(DeviceRecord {
                    address,
                    connected: false,
                    ..record
                });
                true
            }
        }
    }

    /// Remove a paired device and its buttons. Returns true if it was paired.
    pub(crate) fn remove_paired(&mut self, address: &str) -> bool {
        let key = normalize_address(address);
        let before = self.paired.len();
        self.paired.retain(|r| r.address != key);
        self.device_buttons.remove(&key);
        before != self.paired.len()
    }

    /// Replace the discovered list, dropping duplicate addresses.
    pub(crate) fn set_discovered(&mut self, records: Vec<DeviceRecord>) {
        self.discovered = dedupe(records);
    }

    /// Flip the favourite flag of a paired device. Returns the new value.
    pub(crate) fn toggle_favorite(&mut self, address: &str) -> Option<bool> {
        let key = normalize_address(address);
        let record = self.paired.iter_mut().find(|r| r.address == key)?;
        record.favorite = !record.favorite;
        Some(record.favorite)
    }

    /// Buttons attached to a device.
    pub fn device_buttons(&self, address: &str) -> &[CustomButton] {
        self.device_buttons
            .get(&normalize_address(address))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Global buttons.
    pub fn custom_buttons(&self) -> &[CustomButton] {
        &self.custom_buttons
    }

    /// Sequence currently in flight.
    pub fn active_sequence(&self) -> Option<&ActiveSequence> {
        self.active_sequence.as_ref()
    }

    pub(crate) fn device_buttons_mut(&mut self, address: &str) -> &mut Vec<CustomButton> {
        self.device_buttons
            .entry(normalize_address(address))
            .or_default()
    }

    pub(crate) fn prune_empty_buttons(&mut self) {
        self.device_buttons.retain(|_, buttons| !buttons.is_empty());
    }

    fn with_connection(&self, records: &[DeviceRecord]) -> Vec<DeviceRecord> {
        records.iter().map(|r| self.connection_view(r)).collect()
    }

    fn connection_view(&self, record: &DeviceRecord) -> DeviceRecord {
        DeviceRecord {
            connected: self.connected.as_deref() == Some(record.address.as_str()),
            ..record.clone()
        }
    }
}

/// Keep the first record per address, normalising addresses on the way.
fn dedupe(records: Vec<DeviceRecord>) -> Vec<DeviceRecord> {
    let mut unique: Vec<DeviceRecord> = Vec::with_capacity(records.len());
    for mut record in records {
        record.address = normalize_address(&record.address);
        if !unique.iter().any(|r| r.address == record.address) {
            unique.push(record);
        }
    }
    unique
}

fn decode_key<T: DeserializeOwned + Default>(
    document: &Map<String, Value>,
    key: &str,
    repaired: &mut bool,
) -> T {
    match document.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(key = key, error = %e, "Corrupted store key, resetting to empty");
                *repaired = true;
                T::default()
            }
        },
    }
}

fn insert_key<T: Serialize + ?Sized>(
    document: &mut Map<String, Value>,
    key: &str,
    value: &T,
) -> serde_json::Result<()> {
    document.insert(key.to_string(), serde_json::to_value(value)?);
    Ok(())
}
