use crate::config::{
    default_confirm_delay_ms, default_connect_timeout_ms, default_scan_settle_delay_ms,
    default_status_poll_interval_ms,
};

use std::time::Duration;

use btm_core::Timing;
use serde::{Deserialize, Serialize};

/// Delays and timeouts of the connect, scan and status flows, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Bound on a whole connect attempt.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Wait between `/connect` and the confirming status poll.
    #[serde(default = "default_confirm_delay_ms")]
    pub confirm_delay_ms: u64,
    /// Wait between `/scan` and fetching results.
    #[serde(default = "default_scan_settle_delay_ms")]
    pub scan_settle_delay_ms: u64,
    /// Interval of the `watch` status poll.
    #[serde(default = "default_status_poll_interval_ms")]
    pub status_poll_interval_ms: u64,
}

impl TimingConfig {
    pub fn to_timing(&self) -> Timing {
        Timing {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            confirm_delay: Duration::from_millis(self.confirm_delay_ms),
            scan_settle_delay: Duration::from_millis(self.scan_settle_delay_ms),
            status_poll_interval: Duration::from_millis(self.status_poll_interval_ms),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            confirm_delay_ms: default_confirm_delay_ms(),
            scan_settle_delay_ms: default_scan_settle_delay_ms(),
            status_poll_interval_ms: default_status_poll_interval_ms(),
        }
    }
}
