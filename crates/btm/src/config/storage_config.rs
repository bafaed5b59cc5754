use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Device store location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Store file path (None = `store.json` in the platform data dir).
    #[serde(default)]
    pub path: Option<PathBuf>,
}
