//! Top-level keys of the persisted store document.

pub(crate) const PAIRED_DEVICES: &str = "pairedDevices";
pub(crate) const FAVORITE_DEVICES: &str = "favoriteDevices";
pub(crate) const DISCOVERED_DEVICES: &str = "discoveredDevices";
pub(crate) const CUSTOM_BUTTONS: &str = "customButtons";
pub(crate) const ACTIVE_COMMAND_SEQUENCE: &str = "activeCommandSequence";
pub(crate) const DEVICE_BUTTONS_PREFIX: &str = "device_buttons_";

pub(crate) fn device_buttons_key(address: &str) -> String {
    format!("{DEVICE_BUTTONS_PREFIX}{address}")
}
