//! Persisted single source of truth for client-side device state.
//!
//! All reads and writes go through one mutex. Writes mutate a copy of the
//! state, persist it with an atomic temp-file rename, and only then replace
//! the shared state, so a failed write leaves memory and disk in agreement.

use crate::{CoreError, CoreResult, store::StoreState};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use error_location::ErrorLocation;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

/// Shared handle to the device store. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct DeviceStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    state: Mutex<StoreState>,
    path: Option<PathBuf>,
}

impl DeviceStore {
    /// Open (or create) a store backed by a JSON file.
    ///
    /// A missing file yields an empty store. A file that is not a JSON object
    /// is reset to empty, and individual keys that fail to decode are reset
    /// while the rest are kept.
    #[track_caller]
    #[instrument(skip_all)]
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
                debug!(dir = ?parent, "Created store directory");
            }
        }

        let (state, repaired) = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            match serde_json::from_str::<Value>(&contents) {
                Ok(Value::Object(document)) => StoreState::from_document(&document),
                Ok(_) | Err(_) => {
                    warn!(path = ?path, "Store file is not a JSON object, resetting");
                    (StoreState::default(), true)
                }
            }
        } else {
            (StoreState::default(), false)
        };

        let store = Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(state),
                path: Some(path.clone()),
            }),
        };

        if repaired {
            let state = store.lock();
            store.persist(&state)?;
        }

        info!(path = ?path, "Device store opened");

        Ok(store)
    }

    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::with_state(StoreState::default())
    }

    /// In-memory store seeded with state.
    pub fn with_state(state: StoreState) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(state),
                path: None,
            }),
        }
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    /// Run a read-only closure against the current state.
    pub fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> R {
        let state = self.lock();
        f(&state)
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> StoreState {
        self.read(StoreState::clone)
    }

    /// Atomically apply a mutation and persist it.
    ///
    /// The closure runs on a copy; the shared state is replaced only after the
    /// copy has been written to disk.
    #[track_caller]
    pub fn update<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> CoreResult<R> {
        let mut state = self.lock();
        let mut next = state.clone();
        let result = f(&mut next);

        if next != *state {
            self.persist(&next)?;
            *state = next;
        }

        Ok(result)
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner.state.lock().unwrap_or_else(|e| {
            error!("Device store lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    #[track_caller]
    fn persist(&self, state: &StoreState) -> CoreResult<()> {
        let Some(path) = self.inner.path.as_deref() else {
            return Ok(());
        };

        let document = state.to_document().map_err(|e| CoreError::Storage {
            reason: format!("Failed to encode store: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let contents =
            serde_json::to_string_pretty(&document).map_err(|e| CoreError::Storage {
                reason: format!("Failed to serialize store: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let temp_path = path.with_extension("json.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| CoreError::Storage {
            reason: format!("Failed to create temp store file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| CoreError::Storage {
                reason: format!("Failed to write temp store file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| CoreError::Storage {
            reason: format!("Failed to sync temp store file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, path).map_err(|e| CoreError::Storage {
            reason: format!("Failed to rename temp store to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(path = ?path, "Device store persisted");

        Ok(())
    }
}
