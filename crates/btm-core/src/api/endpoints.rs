//! Backend endpoint paths.

pub(crate) const SCAN: &str = "/scan";
pub(crate) const GET_DISCOVERED_DEVICES: &str = "/get_discovered_devices";
pub(crate) const CONNECT: &str = "/connect";
pub(crate) const DISCONNECT: &str = "/disconnect";
pub(crate) const CONNECTION_STATUS: &str = "/connection_status";
pub(crate) const GET_PAIRED_DEVICES: &str = "/get_paired_devices";
pub(crate) const SEND: &str = "/send";
pub(crate) const CLEAR_LOGS: &str = "/clear_logs";
pub(crate) const SIMULATE_CONNECTION: &str = "/simulate_connection";
