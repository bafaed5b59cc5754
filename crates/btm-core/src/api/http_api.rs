use crate::{
    CoreError, CoreResult,
    api::{
        ConnectionStatus, DeviceManagerApi, DiscoveredDevicesResponse, PairedDevicesResponse,
        endpoints,
    },
};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

/// [`DeviceManagerApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    /// Create a client for a backend such as `http://localhost:5000`.
    ///
    /// `request_timeout` bounds each individual request; the connect flow
    /// has its own, longer, client-side timeout on top.
    #[track_caller]
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> CoreResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| CoreError::Transport {
                endpoint: base_url.clone(),
                reason: format!("Failed to build HTTP client: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self { client, base_url })
    }

    /// Backend base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn post_form(&self, endpoint: &str, form: &[(&str, &str)]) -> CoreResult<()> {
        let response = self
            .client
            .post(self.url(endpoint))
            .form(form)
            .send()
            .await
            .map_err(|e| transport_error(endpoint, e))?;

        check_status(endpoint, &response)?;
        debug!(endpoint = endpoint, status = %response.status(), "POST succeeded");

        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> CoreResult<T> {
        let response = self
            .client
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(|e| transport_error(endpoint, e))?;

        check_status(endpoint, &response)?;

        response
            .json::<T>()
            .await
            .map_err(|e| transport_error(endpoint, e))
    }
}

impl DeviceManagerApi for HttpApi {
    #[instrument(skip(self))]
    async fn scan(&self) -> CoreResult<()> {
        self.post_form(endpoints::SCAN, &[("show_results", "true")])
            .await
    }

    #[instrument(skip(self))]
    async fn discovered_devices(&self) -> CoreResult<DiscoveredDevicesResponse> {
        self.get_json(endpoints::GET_DISCOVERED_DEVICES).await
    }

    #[instrument(skip(self))]
    async fn connect(&self, address: &str) -> CoreResult<()> {
        self.post_form(endpoints::CONNECT, &[("address", address)])
            .await
    }

    #[instrument(skip(self))]
    async fn disconnect(&self) -> CoreResult<()> {
        self.post_form(endpoints::DISCONNECT, &[]).await
    }

    #[instrument(skip(self))]
    async fn connection_status(&self) -> CoreResult<ConnectionStatus> {
        self.get_json(endpoints::CONNECTION_STATUS).await
    }

    #[instrument(skip(self))]
    async fn paired_devices(&self) -> CoreResult<PairedDevicesResponse> {
        self.get_json(endpoints::GET_PAIRED_DEVICES).await
    }

    #[instrument(skip(self))]
    async fn send(&self, data: &str, continue_sequence: bool) -> CoreResult<()> {
        let continue_sequence = if continue_sequence { "true" } else { "false" };
        self.post_form(
            endpoints::SEND,
            &[("data", data), ("continue_sequence", continue_sequence)],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn clear_logs(&self) -> CoreResult<()> {
        self.post_form(endpoints::CLEAR_LOGS, &[]).await
    }

    #[instrument(skip(self))]
    async fn simulate_connection(&self) -> CoreResult<()> {
        self.post_form(endpoints::SIMULATE_CONNECTION, &[]).await
    }
}

#[track_caller]
fn transport_error(endpoint: &str, e: reqwest::Error) -> CoreError {
    CoreError::Transport {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}

#[track_caller]
fn check_status(endpoint: &str, response: &Response) -> CoreResult<()> {
    let status = response.status();
    if !status.is_success() {
        return Err(CoreError::HttpStatus {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            location: ErrorLocation::from(Location::caller()),
        });
    }
    Ok(())
}
