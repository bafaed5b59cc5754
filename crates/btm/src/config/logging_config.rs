use crate::config::default_log_level;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Log output settings. `RUST_LOG` overrides `level` when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level for btm crates (`error`, `warn`, `info`, `debug`, `trace`).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human readable output.
    #[serde(default)]
    pub json: bool,
    /// Also write a daily rolling log file.
    #[serde(default)]
    pub file: bool,
    /// Directory for log files (None = platform data dir).
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            file: false,
            directory: None,
        }
    }
}
