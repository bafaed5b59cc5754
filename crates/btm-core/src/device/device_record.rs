use crate::device::{DeviceCommand, DeviceType, lenient};

use serde::{Deserialize, Serialize};

/// Client-cached representation of a Bluetooth peripheral.
///
/// `address` is the unique key and is kept uppercase so lookups are
/// case-insensitive. `connected` is derived by the store from its single
/// connected address and is only meaningful on records read from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Human readable device name.
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub name: String,
    /// MAC address `XX:XX:XX:XX:XX:XX`.
    pub address: String,
    /// Device category.
    #[serde(rename = "type", default, deserialize_with = "lenient::null_as_default")]
    pub device_type: DeviceType,
    /// Whether this is the currently connected device.
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub connected: bool,
    /// Whether the user marked this device as a favourite.
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub favorite: bool,
    /// Default command sequence attached to the device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<Vec<DeviceCommand>>,
}

impl DeviceRecord {
    /// Create a disconnected, non-favourite record.
    pub fn new(name: impl Into<String>, address: &str, device_type: DeviceType) -> Self {
        Self {
            name: name.into(),
            address: normalize_address(address),
            device_type,
            connected: false,
            favorite: false,
            commands: None,
        }
    }

    /// Case-insensitive address comparison.
    pub fn has_address(&self, address: &str) -> bool {
        self.address.eq_ignore_ascii_case(address.trim())
    }
}

/// Canonical form used as the store key.
pub(crate) fn normalize_address(address: &str) -> String {
    address.trim().to_ascii_uppercase()
}
