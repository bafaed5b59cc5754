use crate::output::{device_line, event_line, scan_line};

use btm_core::{
    ConnectionState, DeviceEvent, DeviceRecord, DeviceType, NotificationLevel, ScanEntry,
};

/// WHAT: Device lines show address, type, name and flags
/// WHY: The listing is the main way to find an address to connect to
#[test]
fn given_connected_favorite_when_formatting_then_flags_listed() {
    // Given: A connected favourite
    let mut device = DeviceRecord::new("Lamp", "00:11:22:33:44:55", DeviceType::Power);
    device.connected = true;
    device.favorite = true;

    // When: Formatting
    let line = device_line(&device);

    // Then: Everything is on one line
    assert_eq!(line, "00:11:22:33:44:55  power   Lamp [connected, favorite]");
}

/// WHAT: Scan lines mark already paired devices and unnamed ones
/// WHY: New devices must stand out after a scan
#[test]
fn given_paired_unnamed_entry_when_formatting_scan_line_then_marked() {
    let entry = ScanEntry {
        device: DeviceRecord::new("", "66:77:88:99:AA:BB", DeviceType::Other),
        signal: Some(-70),
        already_paired: true,
    };

    assert_eq!(
        scan_line(&entry),
        "66:77:88:99:AA:BB  other   (unnamed) -70 dBm (paired)"
    );
}

/// WHAT: Watch output hides bookkeeping events
/// WHY: Only state changes and notifications are useful on screen
#[test]
fn given_events_when_formatting_for_watch_then_only_visible_ones_rendered() {
    assert_eq!(
        event_line(&DeviceEvent::ConnectionStateChanged(
            ConnectionState::Connecting {
                address: "00:11:22:33:44:55".to_string()
            }
        ))
        .as_deref(),
        Some("connecting to 00:11:22:33:44:55")
    );
    assert_eq!(
        event_line(&DeviceEvent::Notification {
            level: NotificationLevel::Error,
            message: "Connect failed".to_string(),
        })
        .as_deref(),
        Some("[error] Connect failed")
    );
    assert_eq!(
        event_line(&DeviceEvent::SequenceProgress { index: 0, total: 3 }).as_deref(),
        Some("sent command 1/3")
    );
    assert!(event_line(&DeviceEvent::PairedDevicesChanged).is_none());
}
