//! Device configuration
//!
//! Loads `controls.json`, which describes for each device name the rows of
//! controls to show and the CC number each one drives. The file is read once
//! at startup and never changes afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use crate::error::ConfigError;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ControllerConfig {
    #[serde(rename = "device", default)]
    pub devices: Vec<DeviceConfig>,
}

/// One physical device and its control layout
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DeviceConfig {
    /// Matched as a substring of MIDI port names
    pub name: String,
    #[serde(default)]
    pub layout: Vec<LayoutRow>,
}

/// A row of controls
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LayoutRow {
    #[serde(default)]
    pub row: i64,
    #[serde(default)]
    pub items: Vec<ControlSpec>,
}

/// One control entry of a layout row
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ControlSpec {
    #[serde(rename = "type")]
    pub kind: ControlKind,
    #[serde(default)]
    pub name: String,
    /// Key in the state file. Controls with an empty id are never persisted.
    #[serde(default)]
    pub id: String,
    pub cc: u8,
    /// Option labels for multi-option knobs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub texts: Vec<String>,
    /// Initial state for toggles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_off: Option<bool>,
}

impl ControlSpec {
    /// Toggles start OFF unless `initial_off` is explicitly false
    pub fn starts_off(&self) -> bool {
        self.initial_off.unwrap_or(true)
    }
}

/// Control type
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum ControlKind {
    /// 0-127 knob shown on a 0.0-10.0 scale
    #[serde(rename = "volume", alias = "knob")]
    Continuous,
    /// Knob stepping through a list of labels
    #[serde(rename = "toggle_knob", alias = "toggle")]
    MultiOption,
    /// ON/OFF button
    #[serde(rename = "toggle_button", alias = "button")]
    Toggle,
    /// Unrecognised type, skipped when the grid is built
    #[serde(other)]
    Unknown,
}

impl ControllerConfig {
    /// Load configuration from file with validation
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: ControllerConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        config.validate()?;

        debug!(
            "Loaded {} device(s) from {}",
            config.devices.len(),
            path.display()
        );
        Ok(config)
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (device_idx, device) in self.devices.iter().enumerate() {
            if device.name.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "device {} name cannot be empty",
                    device_idx
                )));
            }

            let mut seen_ids = HashSet::new();
            for control in device.controls() {
                if !control.id.is_empty() && !seen_ids.insert(control.id.as_str()) {
                    return Err(ConfigError::Invalid(format!(
                        "duplicate control id '{}' in device '{}'",
                        control.id, device.name
                    )));
                }

                if control.cc > 127 {
                    return Err(ConfigError::Invalid(format!(
                        "control '{}' in device '{}' has invalid CC number {} (must be 0-127)",
                        control.id, device.name, control.cc
                    )));
                }
            }
        }

        Ok(())
    }

    /// First configured device whose name appears in `port_name`
    pub fn device_for_port(&self, port_name: &str) -> Option<&DeviceConfig> {
        self.devices
            .iter()
            .find(|device| port_name.contains(device.name.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl DeviceConfig {
    /// All control specs in layout order
    pub fn controls(&self) -> impl Iterator<Item = &ControlSpec> {
        self.layout.iter().flat_map(|row| row.items.iter())
    }
}
