mod device_manager_api;
pub(crate) mod endpoints;
mod http_api;
pub(crate) mod wire;

pub use {
    device_manager_api::DeviceManagerApi,
    http_api::HttpApi,
    wire::{ConnectionStatus, DiscoveredDevice, DiscoveredDevicesResponse, PairedDevicesResponse},
};
