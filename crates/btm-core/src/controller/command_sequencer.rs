//! Serial execution of hex command sequences.
//!
//! A running sequence is persisted in the store after every step so a
//! restarted client can pick it up again with [`CommandSequencer::resume_active`].

use crate::{
    CoreError, CoreResult, DeviceManagerApi, DeviceStore, EventBus,
    device::{
        ActiveSequence, DeviceCommand, DeviceRecord,
        validation::{validate_commands, validate_hex_payload, validate_mac},
    },
    events::{DeviceEvent, NotificationLevel},
};

use std::{
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Executor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    /// No sequence is being executed.
    Idle,
    /// A sequence is being executed.
    Running,
}

/// Sends command sequences one step at a time.
pub struct CommandSequencer<A> {
    api: Arc<A>,
    store: DeviceStore,
    events: EventBus,
    running: AtomicBool,
}

/// Marks the sequencer as running and returns it to idle on drop,
/// including when the executing future is dropped mid-sequence.
struct RunningGuard<'a> {
    running: &'a AtomicBool,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

impl<A: DeviceManagerApi> CommandSequencer<A> {
    /// Create a sequencer sharing the given store and bus.
    pub fn new(api: Arc<A>, store: DeviceStore, events: EventBus) -> Self {
        Self {
            api,
            store,
            events,
            running: AtomicBool::new(false),
        }
    }

    /// Current executor state.
    pub fn state(&self) -> SequenceState {
        if self.running.load(Ordering::Acquire) {
            SequenceState::Running
        } else {
            SequenceState::Idle
        }
    }

    /// The persisted in-flight sequence, if any.
    pub fn active_sequence(&self) -> Option<ActiveSequence> {
        self.store.read(|state| state.active_sequence().cloned())
    }

    /// Execute a sequence: send each payload, then wait its delay before the next.
    ///
    /// All payloads are validated before anything is sent. An empty sequence
    /// completes immediately.
    ///
    /// # Errors
    ///
    /// `InvalidHexPayload` for a bad payload, `SequenceAlreadyRunning` when
    /// another sequence is executing, or the first send failure (the stored
    /// sequence is cleared in that case).
    #[instrument(skip(self, commands), fields(count = commands.len()))]
    pub async fn execute(&self, commands: Vec<DeviceCommand>) -> CoreResult<()> {
        self.reported(validate_commands(&commands))?;
        let _guard = self.claim()?;

        if commands.is_empty() {
            debug!("Empty sequence, nothing to send");
            return Ok(());
        }

        let sequence = ActiveSequence::new(commands);
        let stored = sequence.clone();
        self.reported(
            self.store
                .update(|state| state.active_sequence = Some(stored)),
        )?;

        info!(sequence_id = %sequence.id, total = sequence.total_commands, "Sequence started");

        self.drive(sequence).await
    }

    /// Continue a sequence left in the store by a previous run.
    ///
    /// Returns false when there was nothing to resume.
    #[instrument(skip(self))]
    pub async fn resume_active(&self) -> CoreResult<bool> {
        let _guard = self.claim()?;

        let Some(sequence) = self.active_sequence() else {
            return Ok(false);
        };

        if sequence.is_finished() {
            debug!(sequence_id = %sequence.id, "Stored sequence already finished, clearing");
            self.clear_stored();
            return Ok(false);
        }

        if let Err(e) = validate_commands(&sequence.commands) {
            warn!(sequence_id = %sequence.id, error = %e, "Stored sequence is invalid, discarding");
            self.clear_stored();
            self.report_failure(&e);
            return Err(e);
        }

        info!(
            sequence_id = %sequence.id,
            index = sequence.current_index,
            total = sequence.total_commands,
            "Resuming sequence"
        );

        self.drive(sequence).await?;
        Ok(true)
    }

    /// Send a single payload outside of any sequence.
    #[instrument(skip(self))]
    pub async fn send_command(&self, data: &str) -> CoreResult<()> {
        self.reported(validate_hex_payload(data))?;

        if let Err(e) = self.api.send(data, false).await {
            self.report_failure(&e);
            return Err(e);
        }

        info!(data = %data, "Command sent");
        Ok(())
    }

    /// Execute the default commands attached to a device.
    ///
    /// A device without commands completes immediately.
    #[instrument(skip(self))]
    pub async fn run_device_commands(&self, address: &str) -> CoreResult<()> {
        let device = self.reported(self.find_device(address))?;
        self.execute(device.commands.unwrap_or_default()).await
    }

    async fn drive(&self, mut sequence: ActiveSequence) -> CoreResult<()> {
        let total = sequence.commands.len();

        while let Some(command) = sequence.current().cloned() {
            let index = sequence.current_index;
            let more = index + 1 < total;

            if let Err(e) = self.api.send(&command.data, more).await {
                error!(sequence_id = %sequence.id, index, error = %e, "Sequence step failed");
                self.clear_stored();
                self.report_failure(&e);
                return Err(e);
            }

            sequence.current_index += 1;
            let stored = sequence.clone();
            self.reported(self.store.update(|state| {
                state.active_sequence = if stored.is_finished() {
                    None
                } else {
                    Some(stored)
                };
            }))?;

            debug!(sequence_id = %sequence.id, index, total, data = %command.data, "Sequence step sent");
            self.events
                .publish(DeviceEvent::SequenceProgress { index, total });

            if more && command.delay > 0 {
                tokio::time::sleep(Duration::from_millis(command.delay)).await;
            }
        }

        info!(sequence_id = %sequence.id, total, "Sequence finished");
        self.events.publish(DeviceEvent::SequenceFinished { total });

        Ok(())
    }

    #[track_caller]
    fn claim(&self) -> CoreResult<RunningGuard<'_>> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            let e = CoreError::SequenceAlreadyRunning {
                location: ErrorLocation::from(Location::caller()),
            };
            self.report_failure(&e);
            return Err(e);
        }

        Ok(RunningGuard {
            running: &self.running,
        })
    }

    #[track_caller]
    fn find_device(&self, address: &str) -> CoreResult<DeviceRecord> {
        let address = validate_mac(address)?;

        match self.store.read(|state| state.device(&address)) {
            Some(device) => Ok(device),
            None => Err(CoreError::DeviceNotFound {
                address,
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    fn clear_stored(&self) {
        if let Err(e) = self.store.update(|state| state.active_sequence = None) {
            error!(error = %e, "Failed to clear stored sequence");
        }
    }

    fn reported<T>(&self, result: CoreResult<T>) -> CoreResult<T> {
        if let Err(e) = &result {
            self.report_failure(e);
        }
        result
    }

    fn report_failure(&self, e: &CoreError) {
        self.events
            .notify(NotificationLevel::Error, format!("Sending command failed: {}", e));
    }
}
