//! Plain-text rendering of devices, buttons and events for the terminal.

use btm_core::{
    ConnectionState, CustomButton, DeviceEvent, DeviceRecord, NotificationLevel, ScanEntry,
};

pub(crate) fn device_line(device: &DeviceRecord) -> String {
    let mut flags = Vec::new();
    if device.connected {
        flags.push("connected");
    }
    if device.favorite {
        flags.push("favorite");
    }

    let name = if device.name.is_empty() {
        "(unnamed)"
    } else {
        device.name.as_str()
    };

    let kind = device.device_type.to_string();
    let line = format!("{}  {:<7} {}", device.address, kind, name);
    if flags.is_empty() {
        line
    } else {
        format!("{} [{}]", line, flags.join(", "))
    }
}

pub(crate) fn scan_line(entry: &ScanEntry) -> String {
    let line = device_line(&entry.device);
    let line = match entry.signal {
        Some(signal) => format!("{} {} dBm", line, signal),
        None => line,
    };
    if entry.already_paired {
        format!("{} (paired)", line)
    } else {
        line
    }
}

pub(crate) fn button_line(button: &CustomButton) -> String {
    let commands: Vec<String> = button
        .commands
        .iter()
        .map(|c| {
            if c.delay > 0 {
                format!("{}:{}", c.data, c.delay)
            } else {
                c.data.clone()
            }
        })
        .collect();
    format!("{}  {}  {}", button.id, button.label, commands.join(" "))
}

/// One line per event, or None for events the watch view does not show.
pub(crate) fn event_line(event: &DeviceEvent) -> Option<String> {
    match event {
        DeviceEvent::ConnectionStateChanged(ConnectionState::Connecting { address }) => {
            Some(format!("connecting to {}", address))
        }
        DeviceEvent::ConnectionStateChanged(ConnectionState::Connected { address }) => {
            Some(format!("connected to {}", address))
        }
        DeviceEvent::ConnectionStateChanged(ConnectionState::Disconnected) => {
            Some("disconnected".to_string())
        }
        DeviceEvent::DeviceConnectionChanged { address, connected } => Some(format!(
            "{} is now {}",
            address,
            if *connected { "connected" } else { "disconnected" }
        )),
        DeviceEvent::SequenceProgress { index, total } => {
            Some(format!("sent command {}/{}", index + 1, total))
        }
        DeviceEvent::SequenceFinished { total } => {
            Some(format!("sequence of {} commands finished", total))
        }
        DeviceEvent::Notification { level, message } => {
            let tag = match level {
                NotificationLevel::Info => "info",
                NotificationLevel::Success => "ok",
                NotificationLevel::Error => "error",
            };
            Some(format!("[{}] {}", tag, message))
        }
        DeviceEvent::ConnectAttemptReset { .. }
        | DeviceEvent::ScanCompleted(_)
        | DeviceEvent::PairedDevicesChanged
        | DeviceEvent::FavoritesChanged { .. }
        | DeviceEvent::ButtonsChanged { .. } => None,
    }
}
