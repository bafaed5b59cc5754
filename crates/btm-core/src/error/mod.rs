use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Device manager client errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The request never produced a response (connection refused, DNS, body decode).
    #[error("Transport error on {endpoint}: {reason} {location}")]
    Transport {
        /// Endpoint path that was being called.
        endpoint: String,
        /// Description of the transport failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The server answered with a non-2xx status.
    #[error("Server returned HTTP {status} for {endpoint} {location}")]
    HttpStatus {
        /// Endpoint path that was being called.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The server answered 2xx but reported `status: "error"` in the body.
    #[error("Server rejected request: {message} {location}")]
    ServerRejected {
        /// Message reported by the server.
        message: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Connection was confirmed for a different device than requested.
    #[error("Connected to {actual:?} instead of {expected} {location}")]
    AddressMismatch {
        /// Address the client asked to connect to.
        expected: String,
        /// Address the server reports as connected, if any.
        actual: Option<String>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Connect attempt did not complete within the client-side timeout.
    #[error("Connection to {address} timed out after {timeout_ms}ms {location}")]
    ConnectTimeout {
        /// Address of the device being connected.
        address: String,
        /// Timeout that elapsed.
        timeout_ms: u64,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Address is not of the form `XX:XX:XX:XX:XX:XX`.
    #[error("Invalid Bluetooth address: {address} {location}")]
    InvalidAddress {
        /// The rejected address.
        address: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Command payload is not an even-length hex string.
    #[error("Invalid hex payload {payload:?}: {reason} {location}")]
    InvalidHexPayload {
        /// The rejected payload.
        payload: String,
        /// Why it was rejected.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No device with this address in the relevant list.
    #[error("Device not found: {address} {location}")]
    DeviceNotFound {
        /// Address that was looked up.
        address: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No custom button matched the lookup.
    #[error("Button not found: {button} {location}")]
    ButtonNotFound {
        /// Button label or id that was looked up.
        button: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A command sequence is already being executed.
    #[error("A command sequence is already running {location}")]
    SequenceAlreadyRunning {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Persisted store could not be encoded or written.
    #[error("Storage error: {reason} {location}")]
    Storage {
        /// Description of the storage failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl From<std::io::Error> for CoreError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        CoreError::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
