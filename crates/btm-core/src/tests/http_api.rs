use crate::{
    CoreError, DeviceManager, DeviceManagerApi, DeviceStore, DeviceType, HttpApi, Timing,
};

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Form, Json, Router,
    extract::State,
    http::{StatusCode, Uri},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

type Recorded = Arc<Mutex<Vec<(String, HashMap<String, String>)>>>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[allow(clippy::unwrap_used)]
async fn record_form(
    State(recorded): State<Recorded>,
    uri: Uri,
    Form(form): Form<HashMap<String, String>>,
) -> StatusCode {
    recorded.lock().unwrap().push((uri.path().to_string(), form));
    StatusCode::OK
}

async fn discovered_devices() -> Json<Value> {
    Json(json!({
        "status": "success",
        "devices": [
            { "name": "Lamp", "address": "00:11:22:33:44:55", "type": "power", "signal": -48 },
            { "name": "Lamp", "address": "00:11:22:33:44:55", "type": "power" },
            { "name": "", "address": "66:77:88:99:aa:bb", "type": "headset" },
            { "name": null, "address": "AA:BB:CC:DD:EE:01", "type": null, "signal": -60.5 }
        ]
    }))
}

async fn paired_devices() -> Json<Value> {
    Json(json!({
        "status": "success",
        "devices": [
            { "name": "Speaker", "address": "66:77:88:99:aa:bb", "type": "volume" },
            { "name": null, "address": "00:11:22:33:44:55", "type": null }
        ]
    }))
}

#[allow(clippy::unwrap_used)]
async fn disconnect(
    State(recorded): State<Recorded>,
    uri: Uri,
    Form(form): Form<HashMap<String, String>>,
) -> StatusCode {
    recorded.lock().unwrap().push((uri.path().to_string(), form));
    StatusCode::NO_CONTENT
}

async fn connection_status() -> Json<Value> {
    Json(json!({ "connected": true, "address": "00:11:22:33:44:55" }))
}

/// Fake backend recording every form POST.
fn backend(recorded: Recorded) -> Router {
    Router::new()
        .route("/scan", post(record_form))
        .route("/connect", post(record_form))
        .route("/send", post(record_form))
        .route("/disconnect", post(disconnect))
        .route("/get_discovered_devices", get(discovered_devices))
        .route("/get_paired_devices", get(paired_devices))
        .route("/connection_status", get(connection_status))
        .route(
            "/clear_logs",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .with_state(recorded)
}

#[allow(clippy::unwrap_used)]
async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", address)
}

/// WHAT: `/send` carries the payload and the continue flag as form fields
/// WHY: The backend keeps the connection open while `continue_sequence` is true
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_backend_when_sending_then_form_fields_posted() {
    // Given: A recording backend
    let recorded = Recorded::default();
    let base_url = serve(backend(Arc::clone(&recorded))).await;
    let api = HttpApi::new(format!("{}/", base_url), REQUEST_TIMEOUT).unwrap();

    // When: Sending one payload mid-sequence and connecting
    api.send("0x0102", true).await.unwrap();
    api.connect("00:11:22:33:44:55").await.unwrap();

    // Then: Both requests arrived with the expected fields
    let recorded = recorded.lock().unwrap().clone();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0].0, "/send");
    assert_eq!(recorded[0].1["data"], "0x0102");
    assert_eq!(recorded[0].1["continue_sequence"], "true");
    assert_eq!(recorded[1].0, "/connect");
    assert_eq!(recorded[1].1["address"], "00:11:22:33:44:55");
}

/// WHAT: Non-2xx responses become `HttpStatus`
/// WHY: Callers must see which endpoint failed and how
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_server_error_when_clearing_logs_then_http_status_error() {
    // Given: A backend whose /clear_logs answers 500
    let base_url = serve(backend(Recorded::default())).await;
    let api = HttpApi::new(base_url, REQUEST_TIMEOUT).unwrap();

    // When: Clearing logs
    let result = api.clear_logs().await;

    // Then: The status and endpoint are reported
    assert!(matches!(
        result,
        Err(CoreError::HttpStatus { status: 500, ref endpoint, .. }) if endpoint == "/clear_logs"
    ));
}

/// WHAT: An unreachable backend yields a transport error
/// WHY: Network failures are distinct from server rejections
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_closed_port_when_requesting_then_transport_error() {
    // Given: A port that was bound and released
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    let api = HttpApi::new(format!("http://{}", address), REQUEST_TIMEOUT).unwrap();

    // When: Asking for the connection status
    let result = api.connection_status().await;

    // Then: Transport error for that endpoint
    assert!(matches!(
        result,
        Err(CoreError::Transport { ref endpoint, .. }) if endpoint == "/connection_status"
    ));
}

/// WHAT: A full scan over HTTP decodes, dedupes and stores the devices
/// WHY: The wire format must match what the backend sends
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_http_backend_when_manager_scans_then_devices_decoded() {
    // Given: A manager over HTTP with no settle delay
    let recorded = Recorded::default();
    let base_url = serve(backend(Arc::clone(&recorded))).await;
    let api = HttpApi::new(base_url, REQUEST_TIMEOUT).unwrap();
    let timing = Timing {
        scan_settle_delay: Duration::ZERO,
        ..Timing::default()
    };
    let manager = DeviceManager::new(api, DeviceStore::in_memory(), timing);

    // When: Scanning
    let report = manager.scan().start_scanning().await.unwrap();

    // Then: Duplicate dropped, unknown type mapped to other, address uppercased
    assert_eq!(report.len(), 3);
    assert_eq!(report.entries[0].signal, Some(-48));
    assert_eq!(report.entries[0].device.device_type, DeviceType::Power);
    assert_eq!(report.entries[1].device.device_type, DeviceType::Other);
    assert_eq!(report.entries[1].device.address, "66:77:88:99:AA:BB");

    // And: A null name and type decode as empty and other, a float signal is rounded
    assert_eq!(report.entries[2].device.name, "");
    assert_eq!(report.entries[2].device.device_type, DeviceType::Other);
    assert_eq!(report.entries[2].signal, Some(-61));

    let scan_request = recorded.lock().unwrap()[0].clone();
    assert_eq!(scan_request.0, "/scan");
    assert_eq!(scan_request.1["show_results"], "true");

    // And: The status endpoint is decoded into the connected address
    let connected = manager.connection().refresh_status().await.unwrap();
    assert_eq!(connected.as_deref(), Some("00:11:22:33:44:55"));
}

/// WHAT: Paired devices from the backend are decoded and merged
/// WHY: Backends report unnamed devices with null fields, which must not fail the sync
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_http_backend_with_null_fields_when_syncing_paired_then_all_devices_merged() {
    // Given: A manager over HTTP with an empty store
    let base_url = serve(backend(Recorded::default())).await;
    let api = HttpApi::new(base_url, REQUEST_TIMEOUT).unwrap();
    let manager = DeviceManager::new(api, DeviceStore::in_memory(), Timing::default());

    // When: Syncing the paired list
    let added = manager.pairing().sync_paired().await.unwrap();

    // Then: Both devices were added, the unnamed one with defaults
    let paired = manager.pairing().paired_devices();
    assert_eq!(added, 2);
    assert_eq!(paired.len(), 2);
    assert_eq!(paired[0].address, "66:77:88:99:AA:BB");
    assert_eq!(paired[0].device_type, DeviceType::Volume);
    assert_eq!(paired[1].address, "00:11:22:33:44:55");
    assert_eq!(paired[1].name, "");
    assert_eq!(paired[1].device_type, DeviceType::Other);
}

/// WHAT: Disconnect is an empty form POST and any 2xx counts as success
/// WHY: The backend answers `/disconnect` without a body
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_http_backend_when_disconnecting_then_empty_post_and_store_cleared() {
    // Given: A manager whose store follows a connected backend
    let recorded = Recorded::default();
    let base_url = serve(backend(Arc::clone(&recorded))).await;
    let api = HttpApi::new(base_url, REQUEST_TIMEOUT).unwrap();
    let manager = DeviceManager::new(api, DeviceStore::in_memory(), Timing::default());
    manager.connection().refresh_status().await.unwrap();

    // When: Disconnecting against a 204 response
    manager.connection().disconnect().await.unwrap();

    // Then: One empty POST arrived and nothing is connected locally
    let recorded = recorded.lock().unwrap().clone();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].0, "/disconnect");
    assert!(recorded[0].1.is_empty());
    assert_eq!(manager.connection().connected_address(), None);
}
