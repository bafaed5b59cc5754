use crate::device::DeviceCommand;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A command sequence in flight, persisted so it can be resumed after a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSequence {
    /// Sequence id for log correlation.
    pub id: Uuid,
    /// All steps of the sequence.
    pub commands: Vec<DeviceCommand>,
    /// Index of the next command to send.
    pub current_index: usize,
    /// Number of commands when the sequence started.
    pub total_commands: usize,
}

impl ActiveSequence {
    /// Start a sequence at index 0.
    pub fn new(commands: Vec<DeviceCommand>) -> Self {
        let total_commands = commands.len();
        Self {
            id: Uuid::new_v4(),
            commands,
            current_index: 0,
            total_commands,
        }
    }

    /// True once every command has been sent.
    pub fn is_finished(&self) -> bool {
        self.current_index >= self.commands.len()
    }

    /// The next command to send, if any.
    pub fn current(&self) -> Option<&DeviceCommand> {
        self.commands.get(self.current_index)
    }
}
