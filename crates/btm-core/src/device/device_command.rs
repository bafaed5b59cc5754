use serde::{Deserialize, Serialize};

/// One step of a command sequence: a hex payload and the pause after sending it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCommand {
    /// Hex payload, with or without a `0x` prefix.
    pub data: String,
    /// Milliseconds to wait after this command before sending the next one.
    #[serde(default)]
    pub delay: u64,
}

impl DeviceCommand {
    /// Create a command step.
    pub fn new(data: impl Into<String>, delay: u64) -> Self {
        Self {
            data: data.into(),
            delay,
        }
    }
}
