use std::fmt;

use serde::{Deserialize, Serialize};

/// Device category reported by the backend. Only used for icons and filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// Power switches, smart plugs.
    Power,
    /// Volume controllers, speakers.
    Volume,
    /// Anything the backend does not classify.
    #[default]
    #[serde(other)]
    Other,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceType::Power => "power",
            DeviceType::Volume => "volume",
            DeviceType::Other => "other",
        };
        f.write_str(name)
    }
}
