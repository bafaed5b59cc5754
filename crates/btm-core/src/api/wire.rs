use crate::device::{DeviceRecord, DeviceType, lenient};

use serde::{Deserialize, Serialize};

/// Device entry as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    /// Advertised name; empty when the backend reports none or `null`.
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub name: String,
    /// MAC address.
    pub address: String,
    /// Backend classification.
    #[serde(rename = "type", default, deserialize_with = "lenient::null_as_default")]
    pub device_type: DeviceType,
    /// Signal strength in dBm, when the backend reports it.
    #[serde(
        default,
        deserialize_with = "lenient::signal_dbm",
        skip_serializing_if = "Option::is_none"
    )]
    pub signal: Option<i32>,
}

impl From<DiscoveredDevice> for DeviceRecord {
    fn from(device: DiscoveredDevice) -> Self {
        DeviceRecord::new(device.name, &device.address, device.device_type)
    }
}

/// Body of `GET /get_discovered_devices`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredDevicesResponse {
    /// `"success"` or `"error"`.
    #[serde(default)]
    pub status: Option<String>,
    /// Devices found by the last scan.
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub devices: Vec<DiscoveredDevice>,
    /// Human readable detail, mostly set on errors.
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `GET /get_paired_devices`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedDevicesResponse {
    /// `"success"` or `"error"`.
    #[serde(default)]
    pub status: Option<String>,
    /// Devices the backend knows as paired.
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub devices: Vec<DiscoveredDevice>,
    /// Human readable detail, mostly set on errors.
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `GET /connection_status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Whether the backend holds an active connection.
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub connected: bool,
    /// Address of that connection.
    #[serde(default)]
    pub address: Option<String>,
}

impl ConnectionStatus {
    /// The connected address, treating `connected: false` and empty strings as none.
    pub fn connected_address(&self) -> Option<&str> {
        if !self.connected {
            return None;
        }
        self.address
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())
    }
}

/// True when a response `status` field reports failure.
pub(crate) fn is_error_status(status: Option<&str>) -> bool {
    status.is_some_and(|s| s.eq_ignore_ascii_case("error"))
}
