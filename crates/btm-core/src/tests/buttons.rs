use crate::{
    ButtonRegistry, CoreError, DeviceCommand, DeviceManager, DeviceStore, EventBus, Timing,
    tests::support::FakeApi,
};

use uuid::Uuid;

const LAMP: &str = "00:11:22:33:44:55";

fn registry() -> ButtonRegistry {
    ButtonRegistry::new(DeviceStore::in_memory(), EventBus::new())
}

/// WHAT: Device and global buttons are kept apart
/// WHY: A device's buttons only make sense for that device
#[test]
#[allow(clippy::unwrap_used)]
fn given_device_and_global_buttons_when_listing_then_sets_are_separate() {
    // Given: One button per set
    let buttons = registry();
    buttons
        .add(Some(LAMP), "On", vec![DeviceCommand::new("0x01", 0)])
        .unwrap();
    buttons
        .add(None, "Panic", vec![DeviceCommand::new("0xFF", 0)])
        .unwrap();

    // When: Listing each set
    let device: Vec<String> = buttons
        .list(Some(&LAMP.to_lowercase()))
        .unwrap()
        .into_iter()
        .map(|b| b.label)
        .collect();
    let global: Vec<String> = buttons
        .list(None)
        .unwrap()
        .into_iter()
        .map(|b| b.label)
        .collect();

    // Then: Each holds its own button
    assert_eq!(device, vec!["On".to_string()]);
    assert_eq!(global, vec!["Panic".to_string()]);
}

/// WHAT: A button with an invalid payload is not stored
/// WHY: Pressing it could only fail
#[test]
fn given_invalid_payload_when_adding_button_then_rejected_and_not_stored() {
    let buttons = registry();

    let result = buttons.add(None, "Broken", vec![DeviceCommand::new("0xABC", 0)]);

    assert!(matches!(result, Err(CoreError::InvalidHexPayload { .. })));
    assert!(matches!(buttons.list(None), Ok(list) if list.is_empty()));
}

/// WHAT: Buttons are found by id or case-insensitive label
/// WHY: The CLI accepts either
#[test]
#[allow(clippy::unwrap_used)]
fn given_button_when_finding_by_label_or_id_then_found() {
    // Given: A global button
    let buttons = registry();
    let added = buttons
        .add(None, "Lights Off", vec![DeviceCommand::new("0x00", 0)])
        .unwrap();

    // When/Then: Both lookups hit it, an unknown label does not
    assert_eq!(buttons.find(None, "lights off").unwrap().id, added.id);
    assert_eq!(buttons.find(None, &added.id.to_string()).unwrap().id, added.id);
    assert!(matches!(
        buttons.find(None, "lights on"),
        Err(CoreError::ButtonNotFound { .. })
    ));
}

/// WHAT: Removing a button deletes only that button
/// WHY: Unknown ids must be reported, not ignored
#[test]
#[allow(clippy::unwrap_used)]
fn given_buttons_when_removing_then_only_target_removed() {
    // Given: Two device buttons
    let buttons = registry();
    let on = buttons
        .add(Some(LAMP), "On", vec![DeviceCommand::new("0x01", 0)])
        .unwrap();
    buttons
        .add(Some(LAMP), "Off", vec![DeviceCommand::new("0x00", 0)])
        .unwrap();

    // When: Removing one, then an unknown id
    buttons.remove(Some(LAMP), on.id).unwrap();
    let missing = buttons.remove(Some(LAMP), Uuid::new_v4());

    // Then: One left, unknown id reported
    let left = buttons.list(Some(LAMP)).unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].label, "Off");
    assert!(matches!(missing, Err(CoreError::ButtonNotFound { .. })));
}

/// WHAT: Pressing a button runs its commands through the sequencer
/// WHY: Buttons are stored sequences
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_button_when_pressed_then_commands_sent() {
    // Given: A manager with a two-step global button
    let manager = DeviceManager::new(FakeApi::new(), DeviceStore::in_memory(), Timing::default());
    manager
        .buttons()
        .add(
            None,
            "Scene",
            vec![DeviceCommand::new("0x01", 50), DeviceCommand::new("0x02", 0)],
        )
        .unwrap();

    // When: Pressing it by label
    manager.press_button(None, "scene").await.unwrap();

    // Then: Both commands went out in order
    assert_eq!(
        manager.api().sends(),
        vec![("0x01".to_string(), true), ("0x02".to_string(), false)]
    );
}
