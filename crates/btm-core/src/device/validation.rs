//! Input validation for addresses and command payloads.

use crate::{CoreError, CoreResult, device::DeviceCommand};

use std::panic::Location;

use error_location::ErrorLocation;

/// Returns true for a colon-separated six-octet MAC address (`00:11:22:33:44:55`).
pub fn is_valid_mac(address: &str) -> bool {
    let octets: Vec<&str> = address.split(':').collect();

    octets.len() == 6
        && octets
            .iter()
            .all(|octet| octet.len() == 2 && octet.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Validate a MAC address and return it in canonical uppercase form.
#[track_caller]
pub fn validate_mac(address: &str) -> CoreResult<String> {
    let trimmed = address.trim();
    if !is_valid_mac(trimmed) {
        return Err(CoreError::InvalidAddress {
            address: address.to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }
    Ok(trimmed.to_ascii_uppercase())
}

/// Validate a hex payload and return it unchanged.
///
/// An optional `0x`/`0X` prefix is allowed. The remaining digits must be
/// non-empty, of even length and all hexadecimal.
#[track_caller]
pub fn validate_hex_payload(payload: &str) -> CoreResult<&str> {
    let digits = payload
        .strip_prefix("0x")
        .or_else(|| payload.strip_prefix("0X"))
        .unwrap_or(payload);

    if digits.is_empty() {
        return Err(invalid_hex(payload, "empty payload"));
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid_hex(payload, "non-hex character"));
    }
    if digits.len() % 2 != 0 {
        return Err(invalid_hex(payload, "odd number of hex digits"));
    }

    Ok(payload)
}

#[track_caller]
fn invalid_hex(payload: &str, reason: &str) -> CoreError {
    CoreError::InvalidHexPayload {
        payload: payload.to_string(),
        reason: reason.to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}

/// Convenience wrapper for [`validate_hex_payload`] returning a bool.
pub fn is_valid_hex_payload(payload: &str) -> bool {
    validate_hex_payload(payload).is_ok()
}

/// Validate every payload of a sequence before anything is sent.
#[track_caller]
pub fn validate_commands(commands: &[DeviceCommand]) -> CoreResult<()> {
    for command in commands {
        validate_hex_payload(&command.data)?;
    }
    Ok(())
}
