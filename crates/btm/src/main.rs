//! btm: command-line client for a Bluetooth device-manager backend.

mod app;
mod cli;
mod config;
mod error;
mod logging;
mod output;
#[cfg(test)]
mod tests;

pub(crate) use {
    app::App,
    error::{AppError, Result as AppResult},
};

use crate::{cli::Cli, config::Config};

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

/// Application entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}", e);
        std::process::exit(1);
    });

    if let Some(server) = cli.server {
        config.server.base_url = server;
    }

    let log_dir = if config.logging.file {
        match config.log_dir() {
            Ok(dir) => Some(dir),
            Err(e) => {
                eprintln!("Failed to resolve log directory: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        None
    };

    // Dropping the guard flushes the log file, keep it until main returns.
    let _log_guard = match logging::init(&config.logging, log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialise logging: {}", e);
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(async {
        let app = App::new(&config)?;
        app.run(cli.command).await
    });

    match result {
        Ok(()) => {
            info!("Command finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
