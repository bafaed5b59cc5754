use std::time::Duration;

/// Client-side timeout for a whole connect attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Pause between a successful `POST /connect` and the confirming status poll.
///
/// The backend does not signal completion, so the client waits and then asks.
pub const DEFAULT_CONFIRM_DELAY: Duration = Duration::from_secs(2);

/// Pause between `POST /scan` and fetching the discovered devices.
pub const DEFAULT_SCAN_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Interval of the background connection status poll.
pub const DEFAULT_STATUS_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Delays and timeouts used by the controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Bound on a whole connect attempt.
    pub connect_timeout: Duration,
    /// Wait before confirming a connect via `/connection_status`.
    pub confirm_delay: Duration,
    /// Wait before fetching scan results.
    pub scan_settle_delay: Duration,
    /// Background status poll interval.
    pub status_poll_interval: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            confirm_delay: DEFAULT_CONFIRM_DELAY,
            scan_settle_delay: DEFAULT_SCAN_SETTLE_DELAY,
            status_poll_interval: DEFAULT_STATUS_POLL_INTERVAL,
        }
    }
}
