mod logging_config;
#[allow(clippy::module_inception)]
mod config;
mod server_config;
mod storage_config;
mod timing_config;

pub(crate) use {
    config::Config, logging_config::LoggingConfig, server_config::ServerConfig,
    storage_config::StorageConfig, timing_config::TimingConfig,
};

use btm_core::Timing;

pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub(crate) const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";

pub(crate) fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

pub(crate) fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

pub(crate) fn default_connect_timeout_ms() -> u64 {
    duration_ms(Timing::default().connect_timeout)
}

pub(crate) fn default_confirm_delay_ms() -> u64 {
    duration_ms(Timing::default().confirm_delay)
}

pub(crate) fn default_scan_settle_delay_ms() -> u64 {
    duration_ms(Timing::default().scan_settle_delay)
}

pub(crate) fn default_status_poll_interval_ms() -> u64 {
    duration_ms(Timing::default().status_poll_interval)
}

pub(crate) fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn duration_ms(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
