use crate::{
    CoreResult,
    api::{ConnectionStatus, DiscoveredDevicesResponse, PairedDevicesResponse},
};

use std::future::Future;

/// The HTTP contract of the device-manager backend.
///
/// Controllers are generic over this trait so tests can substitute a
/// recording fake for [`HttpApi`](crate::HttpApi).
pub trait DeviceManagerApi: Send + Sync + 'static {
    /// `POST /scan` with `show_results=true`. The body is ignored.
    fn scan(&self) -> impl Future<Output = CoreResult<()>> + Send;

    /// `GET /get_discovered_devices`.
    fn discovered_devices(
        &self,
    ) -> impl Future<Output = CoreResult<DiscoveredDevicesResponse>> + Send;

    /// `POST /connect` with form field `address`.
    fn connect(&self, address: &str) -> impl Future<Output = CoreResult<()>> + Send;

    /// `POST /disconnect`. The server tracks the current connection itself.
    fn disconnect(&self) -> impl Future<Output = CoreResult<()>> + Send;

    /// `GET /connection_status`.
    fn connection_status(&self) -> impl Future<Output = CoreResult<ConnectionStatus>> + Send;

    /// `GET /get_paired_devices`.
    fn paired_devices(&self) -> impl Future<Output = CoreResult<PairedDevicesResponse>> + Send;

    /// `POST /send` with form fields `data` and `continue_sequence`.
    fn send(
        &self,
        data: &str,
        continue_sequence: bool,
    ) -> impl Future<Output = CoreResult<()>> + Send;

    /// `POST /clear_logs`.
    fn clear_logs(&self) -> impl Future<Output = CoreResult<()>> + Send;

    /// `POST /simulate_connection` (debug backends only).
    fn simulate_connection(&self) -> impl Future<Output = CoreResult<()>> + Send;
}
