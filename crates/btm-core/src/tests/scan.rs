use crate::{
    CoreError, DeviceEvent, DeviceRecord, DeviceStore, DeviceType, DiscoveredDevicesResponse,
    ScanController, ScanEntry, Timing, dedupe_by_address, order_new_before_paired,
    tests::support::{ApiCall, FakeApi, bus, discovered, drain},
};

use std::sync::Arc;

use tokio::time::Instant;

const A: &str = "00:00:00:00:00:0A";
const B: &str = "00:00:00:00:00:0B";
const C: &str = "00:00:00:00:00:0C";

fn entry(address: &str, already_paired: bool) -> ScanEntry {
    ScanEntry {
        device: DeviceRecord::new(address, address, DeviceType::Other),
        signal: None,
        already_paired,
    }
}

/// WHAT: Repeated addresses are collapsed, keeping the first occurrence
/// WHY: The backend may report a device once per advertisement
#[test]
fn given_duplicate_addresses_when_deduping_then_first_occurrence_kept() {
    // Given: A, a second A with a different name, then B
    let devices = vec![
        discovered("first", A),
        discovered("second", &A.to_lowercase()),
        discovered("other", B),
    ];

    // When: Deduping
    let unique = dedupe_by_address(devices);

    // Then: Two devices, the first A kept
    assert_eq!(unique.len(), 2);
    assert_eq!(unique[0].name, "first");
    assert_eq!(unique[1].address, B);
}

/// WHAT: Ordering puts new devices first and keeps input order within groups
/// WHY: New devices are what the user is looking for after a scan
#[test]
fn given_mixed_entries_when_ordering_then_stable_partition() {
    // Given: paired, new, paired, new
    let entries = vec![
        entry(A, true),
        entry(B, false),
        entry(C, true),
        entry("00:00:00:00:00:0D", false),
    ];

    // When: Ordering
    let ordered = order_new_before_paired(entries);

    // Then: New devices B, D then paired A, C
    let addresses: Vec<&str> = ordered.iter().map(|e| e.device.address.as_str()).collect();
    assert_eq!(addresses, vec![B, "00:00:00:00:00:0D", A, C]);
}

/// WHAT: A scan waits for results, orders them and records them
/// WHY: The backend gives no completion signal for a scan
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_backend_finds_devices_when_scanning_then_report_ordered_and_stored() {
    // Given: B is already paired, backend reports A, B, A, C
    let api = Arc::new(FakeApi::new().with_discovered(vec![
        discovered("a", A),
        discovered("b", B),
        discovered("a again", A),
        discovered("c", C),
    ]));
    let store = DeviceStore::in_memory();
    store
        .update(|s| s.upsert_paired(DeviceRecord::new("b", B, DeviceType::Power)))
        .unwrap();
    let (events, mut rx) = bus();
    let scan = ScanController::new(Arc::clone(&api), store, events, Timing::default());

    // When: Scanning
    let started = Instant::now();
    let report = scan.start_scanning().await.unwrap();

    // Then: Results were fetched after the settle delay, new first, deduped
    assert!(started.elapsed() >= Timing::default().scan_settle_delay);
    assert_eq!(api.calls(), vec![ApiCall::Scan, ApiCall::DiscoveredDevices]);

    let order: Vec<(&str, bool)> = report
        .entries
        .iter()
        .map(|e| (e.device.address.as_str(), e.already_paired))
        .collect();
    assert_eq!(order, vec![(A, false), (C, false), (B, true)]);
    assert_eq!(report.new_devices().count(), 2);
    assert_eq!(report.entries[0].signal, Some(-60));

    assert_eq!(scan.discovered_devices().len(), 3);
    assert!(drain(&mut rx).contains(&DeviceEvent::ScanCompleted(report)));
}

/// WHAT: An error status from the backend fails the scan
/// WHY: The user must see why nothing was found
#[tokio::test(start_paused = true)]
async fn given_error_status_when_scanning_then_server_rejected() {
    // Given: A backend answering with status "error"
    let api = Arc::new(FakeApi::new().with_discovered_response(DiscoveredDevicesResponse {
        status: Some("error".to_string()),
        devices: Vec::new(),
        message: Some("adapter off".to_string()),
    }));
    let (events, _rx) = bus();
    let store = DeviceStore::in_memory();
    let scan = ScanController::new(api, store.clone(), events, Timing::default());

    // When: Scanning
    let result = scan.start_scanning().await;

    // Then: The server message is surfaced and nothing is stored
    assert!(matches!(
        result,
        Err(CoreError::ServerRejected { ref message, .. }) if message == "adapter off"
    ));
    assert!(store.read(|s| s.discovered_devices().is_empty()));
}
