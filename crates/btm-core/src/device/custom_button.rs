use crate::device::DeviceCommand;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User-defined button that fires a command sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomButton {
    /// Stable identifier.
    pub id: Uuid,
    /// Label shown to the user and used for lookups.
    pub label: String,
    /// Commands executed when the button is pressed.
    pub commands: Vec<DeviceCommand>,
}

impl CustomButton {
    /// Create a button with a fresh id.
    pub fn new(label: impl Into<String>, commands: Vec<DeviceCommand>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            commands,
        }
    }
}
