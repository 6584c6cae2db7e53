//! Persisted control values
//!
//! `state.json` maps device name → control id → last value. It is read once
//! at startup and written back only when the active device changes or the
//! app closes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::error::StateError;

/// Control id → last value for one device
pub type DeviceValues = BTreeMap<String, i32>;

/// Last known control values for every device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedState {
    devices: BTreeMap<String, DeviceValues>,
}

impl PersistedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from JSON. A missing file is an empty state, not an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StateError> {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No state file at {}, starting empty", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(StateError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let state: PersistedState =
            serde_json::from_str(&json).map_err(|source| StateError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(
            "State loaded for {} device(s) from {}",
            state.devices.len(),
            path.display()
        );
        Ok(state)
    }

    /// Write to JSON, creating the parent directory if needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StateError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(StateError::Serialize)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StateError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(path, json).map_err(|source| StateError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Saved values for a device
    pub fn device(&self, device: &str) -> Option<&DeviceValues> {
        self.devices.get(device)
    }

    /// Saved value of one control
    pub fn value(&self, device: &str, control_id: &str) -> Option<i32> {
        self.devices.get(device)?.get(control_id).copied()
    }

    /// Replace the saved values of a device. An empty snapshot keeps
    /// whatever was saved before.
    pub fn record_device(&mut self, device: &str, values: DeviceValues) {
        if values.is_empty() {
            return;
        }
        self.devices.insert(device.to_string(), values);
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
