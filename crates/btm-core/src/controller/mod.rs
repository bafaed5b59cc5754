mod button_registry;
mod command_sequencer;
mod connection_controller;
mod pairing_controller;
mod scan_controller;
mod scan_report;
mod timing;

pub use {
    button_registry::ButtonRegistry,
    command_sequencer::{CommandSequencer, SequenceState},
    connection_controller::ConnectionController,
    pairing_controller::PairingController,
    scan_controller::{ScanController, dedupe_by_address, order_new_before_paired},
    scan_report::{ScanEntry, ScanReport},
    timing::Timing,
};
