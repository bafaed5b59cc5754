//! Tracing subscriber setup.

use crate::{AppError, AppResult, config::LoggingConfig};

use std::{panic::Location, path::Path};

use error_location::ErrorLocation;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

const LOG_FILE_PREFIX: &str = "btm";
const LOG_FILE_SUFFIX: &str = "log";

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. When `log_dir` is given a
/// daily rolling file is written as well; the returned guard must be kept
/// alive until exit so buffered lines are flushed.
#[track_caller]
pub(crate) fn init(
    config: &LoggingConfig,
    log_dir: Option<&Path>,
) -> AppResult<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => filter_for_level(&config.level)?,
    };

    let stderr_layer = if config.json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .filename_suffix(LOG_FILE_SUFFIX)
                .build(dir)
                .map_err(|e| AppError::LoggingError {
                    reason: format!("Failed to open log directory {:?}: {}", dir, e),
                    location: ErrorLocation::from(Location::caller()),
                })?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::LoggingError {
            reason: format!("Failed to install subscriber: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(guard)
}

/// Filter enabling `level` for the btm crates only.
#[track_caller]
pub(crate) fn filter_for_level(level: &str) -> AppResult<EnvFilter> {
    let level: LevelFilter = level.trim().parse().map_err(|e| AppError::LoggingError {
        reason: format!("Invalid log level {:?}: {}", level, e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    EnvFilter::try_new(format!("btm={level},btm_core={level}")).map_err(|e| {
        AppError::LoggingError {
            reason: format!("Invalid log filter: {}", e),
            location: ErrorLocation::from(Location::caller()),
        }
    })
}
