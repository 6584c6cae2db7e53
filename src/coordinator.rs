//! Device/config coordinator
//!
//! Owns the loaded config, the persisted values and the MIDI output. Port
//! selection switches the active device: the outgoing device's values are
//! saved, the new port is opened, the control grid is rebuilt from the
//! matching layout and saved values are restored. Every control change is
//! sent straight to the device as a Control Change.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::ControllerConfig;
use crate::controls::ControlEvent;
use crate::grid::{ControlGrid, ControlSlot};
use crate::state::PersistedState;
use crate::transport::{MidiTransport, PortBackend, PortInfo};

/// Placeholder shown when no port matches a configured device
pub const NO_MATCHING_DEVICES: &str = "(no matching devices)";

/// MIDI channel range shown to the user
pub const CHANNEL_RANGE: std::ops::RangeInclusive<u8> = 1..=16;

/// Entry of the device selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortChoice {
    /// Port whose name matched a configured device
    Device { port: PortInfo, device: String },
    /// Disabled placeholder
    NoMatchingDevices,
}

impl PortChoice {
    pub fn label(&self) -> &str {
        match self {
            PortChoice::Device { port, .. } => &port.name,
            PortChoice::NoMatchingDevices => NO_MATCHING_DEVICES,
        }
    }

    pub fn is_selectable(&self) -> bool {
        matches!(self, PortChoice::Device { .. })
    }
}

/// The device currently driven by the panel
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveDevice {
    /// Configured device name, also the key in the state file
    pub name: String,
    /// MIDI port the device was selected through
    pub port: String,
    pub grid: ControlGrid,
}

/// Selection state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DeviceSelection {
    #[default]
    NoDeviceSelected,
    DeviceActive(ActiveDevice),
}

/// User-visible warning raised by the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

/// Coordinates config, persisted state, controls and the MIDI output
pub struct Coordinator<B: PortBackend> {
    config: ControllerConfig,
    state: PersistedState,
    state_path: PathBuf,
    midi: MidiTransport<B>,
    choices: Vec<PortChoice>,
    selected: Option<usize>,
    selection: DeviceSelection,
    channel: u8,
    notices: Vec<Notice>,
}

impl<B: PortBackend> Coordinator<B> {
    /// Create a coordinator from already loaded config and state
    pub fn new(
        config: ControllerConfig,
        state: PersistedState,
        state_path: impl Into<PathBuf>,
        backend: B,
    ) -> Self {
        Self {
            config,
            state,
            state_path: state_path.into(),
            midi: MidiTransport::new(backend),
            choices: Vec::new(),
            selected: None,
            selection: DeviceSelection::NoDeviceSelected,
            channel: *CHANNEL_RANGE.start(),
            notices: Vec::new(),
        }
    }

    /// Load config and state from disk.
    ///
    /// A config that cannot be loaded raises a notice and leaves the panel
    /// with no devices. A state file that cannot be loaded is ignored.
    pub fn startup(config_path: &Path, state_path: &Path, backend: B) -> Self {
        let mut notices = Vec::new();

        let config = match ControllerConfig::load(config_path) {
            Ok(config) => {
                info!(
                    "Loaded {} device(s) from {}",
                    config.devices.len(),
                    config_path.display()
                );
                config
            }
            Err(e) => {
                warn!("Failed to load config: {}", e);
                notices.push(Notice {
                    title: "Config Error".to_string(),
                    message: format!("Failed to load {}\n{}", config_path.display(), e),
                });
                ControllerConfig::default()
            }
        };

        let state = PersistedState::load(state_path).unwrap_or_else(|e| {
            debug!("Ignoring unreadable state: {}", e);
            PersistedState::default()
        });

        let mut coordinator = Self::new(config, state, state_path, backend);
        coordinator.notices = notices;
        coordinator
    }

    /// Re-enumerate ports and keep those matching a configured device.
    ///
    /// When at least one port matches, the first one is selected.
    pub fn refresh_ports(&mut self) {
        let ports = self.midi.list_ports();

        self.choices = ports
            .into_iter()
            .filter_map(|port| {
                let device = self.config.device_for_port(&port.name)?.name.clone();
                Some(PortChoice::Device { port, device })
            })
            .collect();

        if self.choices.is_empty() {
            info!("No MIDI port matches a configured device");
            self.choices.push(PortChoice::NoMatchingDevices);
            self.selected = None;
            return;
        }

        debug!("{} matching port(s)", self.choices.len());
        self.select_port(0);
    }

    /// Switch to the port at `choice` in [`Coordinator::choices`].
    ///
    /// The placeholder entry and out-of-range indices are ignored.
    pub fn select_port(&mut self, choice: usize) {
        let Some(PortChoice::Device { port, .. }) = self.choices.get(choice).cloned() else {
            return;
        };

        self.persist_active();
        self.flush_state();

        self.midi.open_port(port.index);
        self.selected = Some(choice);

        let Some(device) = self.config.device_for_port(&port.name).cloned() else {
            warn!("Port '{}' no longer matches a configured device", port.name);
            self.selection = DeviceSelection::NoDeviceSelected;
            return;
        };

        let mut grid = ControlGrid::build(&device);
        let events = self.restore_values(&device.name, &mut grid);

        info!(
            "Active device: {} on '{}' ({} controls)",
            device.name,
            port.name,
            grid.len()
        );

        self.selection = DeviceSelection::DeviceActive(ActiveDevice {
            name: device.name,
            port: port.name,
            grid,
        });

        for event in &events {
            self.on_control_changed(event);
        }
    }

    /// Apply saved values to a freshly built grid, clamped to each control's
    /// range. Returns the change notifications the restore produced.
    fn restore_values(&self, device: &str, grid: &mut ControlGrid) -> Vec<ControlEvent> {
        let Some(saved) = self.state.device(device) else {
            return Vec::new();
        };

        let mut events = Vec::new();
        for control in grid.controls_mut() {
            let Some(&value) = saved.get(&control.id) else {
                continue;
            };

            let range = control.range();
            let clamped = value.clamp(*range.start(), *range.end());
            if clamped != value {
                warn!(
                    "Saved value {} for '{}' on {} is outside {:?}, using {}",
                    value, control.id, device, range, clamped
                );
            }

            events.extend(control.set_value(clamped));
        }
        events
    }

    /// UI entry point for a user edit of the control at `slot`
    pub fn set_control_at(&mut self, slot: ControlSlot, value: i32) {
        let DeviceSelection::DeviceActive(active) = &mut self.selection else {
            return;
        };

        let Some(control) = active.grid.control_at_mut(slot) else {
            warn!("No control at {:?} on {}", slot, active.name);
            return;
        };

        if let Some(event) = control.set_value(value) {
            self.on_control_changed(&event);
        }
    }

    /// Edit a control by id. Controls without an id can only be reached
    /// through [`Coordinator::set_control_at`].
    pub fn set_control_value(&mut self, id: &str, value: i32) {
        let Some(active) = self.active_device() else {
            return;
        };

        match active.grid.slot_of(id) {
            Some(slot) => self.set_control_at(slot, value),
            None => warn!("No control '{}' on {}", id, active.name),
        }
    }

    /// Forward a change to the device
    pub fn on_control_changed(&mut self, event: &ControlEvent) {
        debug!("{} -> {}", event.id, event.value);
        self.midi
            .send_cc(self.channel as i32 - 1, event.cc as i32, event.value);
    }

    /// Set the 1-based MIDI channel, clamped to 1-16
    pub fn set_channel(&mut self, channel: i32) {
        let channel = channel.clamp(
            *CHANNEL_RANGE.start() as i32,
            *CHANNEL_RANGE.end() as i32,
        ) as u8;
        if channel != self.channel {
            info!("MIDI channel set to {}", channel);
        }
        self.channel = channel;
    }

    /// Save the active device and release the port
    pub fn shutdown(&mut self) {
        self.persist_active();
        self.flush_state();
        self.midi.close();
        info!("Coordinator shut down");
    }

    /// Copy the active device's values into the persisted state
    fn persist_active(&mut self) {
        if let DeviceSelection::DeviceActive(active) = &self.selection {
            self.state.record_device(&active.name, active.grid.snapshot());
        }
    }

    fn flush_state(&self) {
        match self.state.save(&self.state_path) {
            Ok(()) => debug!("State saved to {}", self.state_path.display()),
            Err(e) => warn!("Failed to save state: {}", e),
        }
    }

    pub fn choices(&self) -> &[PortChoice] {
        &self.choices
    }

    /// Index of the selected entry in [`Coordinator::choices`]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selection(&self) -> &DeviceSelection {
        &self.selection
    }

    pub fn active_device(&self) -> Option<&ActiveDevice> {
        match &self.selection {
            DeviceSelection::DeviceActive(active) => Some(active),
            DeviceSelection::NoDeviceSelected => None,
        }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    pub fn transport(&self) -> &MidiTransport<B> {
        &self.midi
    }

    /// Drain pending user-visible warnings
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests;
