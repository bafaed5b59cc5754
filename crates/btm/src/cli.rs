//! Command-line interface definition.

use std::path::PathBuf;

use btm_core::{DeviceCommand, DeviceType, validate_hex_payload};
use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Client for a Bluetooth device-manager backend.
#[derive(Debug, Parser)]
#[command(name = "btm", version, about)]
pub(crate) struct Cli {
    /// Config file (defaults to the platform config dir).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding the config file.
    #[arg(long, global = true)]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub(crate) enum Command {
    /// Scan for nearby devices and list them, new devices first.
    Scan,
    /// List paired devices.
    Devices {
        /// Only devices of this category (power, volume, other).
        #[arg(long = "type", value_parser = parse_device_type)]
        device_type: Option<DeviceType>,
        /// Only favourites.
        #[arg(long)]
        favorites: bool,
        /// Show the last scan results instead of the paired list.
        #[arg(long, conflicts_with = "favorites")]
        discovered: bool,
    },
    /// Merge the backend's paired devices into the local list.
    Sync,
    /// Pair a device found by the last scan.
    Pair {
        /// Device MAC address.
        address: String,
    },
    /// Forget a paired device and its buttons.
    Unpair {
        /// Device MAC address.
        address: String,
    },
    /// Toggle the favourite flag of a paired device.
    Favorite {
        /// Device MAC address.
        address: String,
    },
    /// Connect to a device.
    Connect {
        /// Device MAC address.
        address: String,
    },
    /// Disconnect the current device.
    Disconnect,
    /// Show the connected device.
    Status,
    /// Poll the connection status and print events until Ctrl-C.
    Watch,
    /// Send one hex payload to the connected device.
    Send {
        /// Hex payload, with or without 0x prefix.
        data: String,
    },
    /// Run the default command list stored on a device.
    Run {
        /// Device MAC address.
        address: String,
    },
    /// Manage custom buttons.
    Buttons {
        #[command(subcommand)]
        action: ButtonsCommand,
    },
    /// Press a custom button by label or id.
    Press {
        /// Button label (case-insensitive) or id.
        button: String,
        /// Look the button up on this device instead of the global set.
        #[arg(long)]
        device: Option<String>,
    },
    /// Continue a command sequence interrupted by a previous run.
    Resume,
    /// Ask the backend to clear its logs.
    ClearLogs,
    /// Ask a debug backend to fake a connection.
    Simulate,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub(crate) enum ButtonsCommand {
    /// List buttons.
    List {
        /// Device buttons instead of the global set.
        #[arg(long)]
        device: Option<String>,
    },
    /// Add a button.
    Add {
        /// Button label.
        label: String,
        /// Commands as `HEX[:DELAY_MS]`, sent in order.
        #[arg(long = "command", short = 'c', required = true, value_parser = parse_command)]
        commands: Vec<DeviceCommand>,
        /// Attach to this device instead of the global set.
        #[arg(long)]
        device: Option<String>,
    },
    /// Remove a button by id.
    Remove {
        /// Button id.
        id: Uuid,
        /// Device the button belongs to.
        #[arg(long)]
        device: Option<String>,
    },
}

pub(crate) fn parse_device_type(value: &str) -> Result<DeviceType, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "power" => Ok(DeviceType::Power),
        "volume" => Ok(DeviceType::Volume),
        "other" => Ok(DeviceType::Other),
        other => Err(format!(
            "unknown device type {:?} (expected power, volume or other)",
            other
        )),
    }
}

/// Parse `HEX[:DELAY_MS]`, e.g. `0x0102:250`.
pub(crate) fn parse_command(value: &str) -> Result<DeviceCommand, String> {
    let (data, delay) = match value.split_once(':') {
        Some((data, delay)) => {
            let delay = delay
                .trim()
                .parse::<u64>()
                .map_err(|e| format!("invalid delay {:?}: {}", delay, e))?;
            (data.trim(), delay)
        }
        None => (value.trim(), 0),
    };

    validate_hex_payload(data).map_err(|_| format!("invalid hex payload {:?}", data))?;

    Ok(DeviceCommand::new(data, delay))
}
