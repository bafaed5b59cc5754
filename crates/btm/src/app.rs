use crate::{
    AppError, AppResult,
    cli::{ButtonsCommand, Command},
    config::Config,
    output,
};

use std::panic::Location;

use btm_core::{DeviceManager, DeviceStore, HttpApi};
use error_location::ErrorLocation;
use tokio::sync::{broadcast::error::RecvError, watch};
use tracing::{debug, info, instrument, warn};

/// Runs one CLI command against the backend.
pub(crate) struct App {
    pub(crate) manager: DeviceManager<HttpApi>,
}

impl App {
    /// Build the HTTP client and open the device store from config.
    #[track_caller]
    pub(crate) fn new(config: &Config) -> AppResult<Self> {
        let api = HttpApi::new(config.server.base_url.as_str(), config.server.request_timeout())?;
        let store = DeviceStore::open(config.store_path()?)?;

        info!(base_url = %api.base_url(), "Backend client ready");

        Ok(Self {
            manager: DeviceManager::new(api, store, config.timing.to_timing()),
        })
    }

    /// Execute a command and print its result to stdout.
    #[instrument(skip(self))]
    pub(crate) async fn run(&self, command: Command) -> AppResult<()> {
        match command {
            Command::Scan => self.scan().await,
            Command::Devices {
                device_type,
                favorites,
                discovered,
            } => {
                let devices = if discovered {
                    self.manager.scan().discovered_devices()
                } else if favorites {
                    self.manager.pairing().favorite_devices()
                } else {
                    self.manager.pairing().paired_devices()
                };
                let devices: Vec<_> = devices
                    .into_iter()
                    .filter(|d| device_type.is_none_or(|t| d.device_type == t))
                    .collect();

                if devices.is_empty() {
                    println!("No devices");
                }
                for device in &devices {
                    println!("{}", output::device_line(device));
                }
                Ok(())
            }
            Command::Sync => {
                let added = self.manager.pairing().sync_paired().await?;
                println!(
                    "{} paired devices ({} new)",
                    self.manager.pairing().paired_devices().len(),
                    added
                );
                Ok(())
            }
            Command::Pair { address } => {
                if self.manager.pairing().pair(&address)? {
                    println!("Paired {}", address);
                } else {
                    println!("{} was already paired", address);
                }
                Ok(())
            }
            Command::Unpair { address } => {
                self.manager.pairing().unpair(&address)?;
                println!("Unpaired {}", address);
                Ok(())
            }
            Command::Favorite { address } => {
                let favorite = self.manager.pairing().toggle_favorite(&address)?;
                println!(
                    "{} {} favorites",
                    address,
                    if favorite { "added to" } else { "removed from" }
                );
                Ok(())
            }
            Command::Connect { address } => {
                self.manager.connection().connect(&address).await?;
                println!("Connected to {}", address.to_ascii_uppercase());
                Ok(())
            }
            Command::Disconnect => {
                self.manager.connection().disconnect().await?;
                println!("Disconnected");
                Ok(())
            }
            Command::Status => {
                match self.manager.connection().refresh_status().await? {
                    Some(address) => println!("Connected to {}", address),
                    None => println!("Not connected"),
                }
                Ok(())
            }
            Command::Watch => self.watch().await,
            Command::Send { data } => {
                self.manager.sequencer().send_command(&data).await?;
                println!("Sent {}", data);
                Ok(())
            }
            Command::Run { address } => {
                self.manager.sequencer().run_device_commands(&address).await?;
                println!("Device commands sent");
                Ok(())
            }
            Command::Buttons { action } => self.buttons(action),
            Command::Press { button, device } => {
                self.manager
                    .press_button(device.as_deref(), &button)
                    .await?;
                println!("Pressed {}", button);
                Ok(())
            }
            Command::Resume => {
                if self.manager.sequencer().resume_active().await? {
                    println!("Sequence resumed and finished");
                } else {
                    println!("No interrupted sequence");
                }
                Ok(())
            }
            Command::ClearLogs => {
                self.manager.clear_logs().await?;
                println!("Backend logs cleared");
                Ok(())
            }
            Command::Simulate => {
                match self.manager.simulate_connection().await? {
                    Some(address) => println!("Simulated connection to {}", address),
                    None => println!("Simulation requested, backend reports no connection"),
                }
                Ok(())
            }
        }
    }

    async fn scan(&self) -> AppResult<()> {
        println!("Scanning...");
        let report = self.manager.scan().start_scanning().await?;

        if report.is_empty() {
            println!("No devices found");
            return Ok(());
        }
        for entry in &report.entries {
            println!("{}", output::scan_line(entry));
        }
        Ok(())
    }

    fn buttons(&self, action: ButtonsCommand) -> AppResult<()> {
        let buttons = self.manager.buttons();

        match action {
            ButtonsCommand::List { device } => {
                let list = buttons.list(device.as_deref())?;
                if list.is_empty() {
                    println!("No buttons");
                }
                for button in &list {
                    println!("{}", output::button_line(button));
                }
            }
            ButtonsCommand::Add {
                label,
                commands,
                device,
            } => {
                let button = buttons.add(device.as_deref(), &label, commands)?;
                println!("Added {}", output::button_line(&button));
            }
            ButtonsCommand::Remove { id, device } => {
                buttons.remove(device.as_deref(), id)?;
                println!("Removed {}", id);
            }
        }

        Ok(())
    }

    /// Poll the connection status and print events until Ctrl-C.
    async fn watch(&self) -> AppResult<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut events = self.manager.subscribe();

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        println!("Watching connection status, Ctrl-C to stop");

        let printer = async {
            let result = loop {
                tokio::select! {
                    signal = &mut ctrl_c => {
                        break signal.map_err(|e| AppError::RuntimeError {
                            reason: format!("Failed to listen for Ctrl-C: {}", e),
                            location: ErrorLocation::from(Location::caller()),
                        });
                    }
                    event = events.recv() => match event {
                        Ok(event) => {
                            if let Some(line) = output::event_line(&event) {
                                println!("{}", line);
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Event printer lagging, events dropped");
                        }
                        Err(RecvError::Closed) => break Ok(()),
                    }
                }
            };

            if shutdown_tx.send(true).is_err() {
                debug!("Status watcher already stopped");
            }
            result
        };

        let ((), result) = tokio::join!(
            self.manager.connection().watch_status(shutdown_rx),
            printer
        );
        result
    }
}
