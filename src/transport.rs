//! MIDI output transport
//!
//! [`MidiTransport`] is the fire-and-forget sender the coordinator talks to.
//! The native port handling lives behind [`PortBackend`] so the production
//! build uses midir while tests run against an in-memory backend.

#[cfg(test)]
pub(crate) mod mock;

use midir::{MidiOutput, MidiOutputConnection};
use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::midi::{format_hex, ControlChange};

/// Client name registered with the OS MIDI service
const CLIENT_NAME: &str = "UAFX-Controller";

/// Information about a MIDI output port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Index as reported by the backend, used to open the port
    pub index: usize,
    pub name: String,
}

/// Native MIDI output operations
pub trait PortBackend {
    /// Enumerate output ports. Ports whose name cannot be read are skipped
    /// without shifting the indices of the others.
    fn ports(&mut self) -> Result<Vec<PortInfo>, TransportError>;

    /// Open the port at `index`, returning its name
    fn connect(&mut self, index: usize) -> Result<String, TransportError>;

    /// Close the open port, if any
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    fn send(&mut self, message: &[u8]) -> Result<(), TransportError>;
}

/// midir-backed output
pub struct MidirBackend {
    client_name: String,
    connection: Option<MidiOutputConnection>,
}

impl MidirBackend {
    pub fn new() -> Self {
        Self {
            client_name: CLIENT_NAME.to_string(),
            connection: None,
        }
    }

    fn output(&self) -> Result<MidiOutput, TransportError> {
        MidiOutput::new(&self.client_name).map_err(|e| TransportError::Init(e.to_string()))
    }
}

impl Default for MidirBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PortBackend for MidirBackend {
    fn ports(&mut self) -> Result<Vec<PortInfo>, TransportError> {
        let midi_out = self.output()?;

        let mut port_infos = Vec::new();
        for (index, port) in midi_out.ports().iter().enumerate() {
            match midi_out.port_name(port) {
                Ok(name) => port_infos.push(PortInfo { index, name }),
                Err(e) => warn!(
                    "{}",
                    TransportError::PortInfo {
                        index,
                        reason: e.to_string()
                    }
                ),
            }
        }

        Ok(port_infos)
    }

    fn connect(&mut self, index: usize) -> Result<String, TransportError> {
        let midi_out = self.output()?;

        let port = midi_out
            .ports()
            .into_iter()
            .nth(index)
            .ok_or(TransportError::NoSuchPort(index))?;

        let name = midi_out
            .port_name(&port)
            .map_err(|e| TransportError::PortInfo {
                index,
                reason: e.to_string(),
            })?;

        let connection = midi_out
            .connect(&port, "uafx-controller-out")
            .map_err(|e| TransportError::Connect {
                port: name.clone(),
                reason: e.to_string(),
            })?;

        self.connection = Some(connection);
        Ok(name)
    }

    fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
        }
    }

    fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    fn send(&mut self, message: &[u8]) -> Result<(), TransportError> {
        let connection = self.connection.as_mut().ok_or(TransportError::NotOpen)?;
        connection
            .send(message)
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}

/// MIDI output used by the coordinator.
///
/// Listing and opening errors are logged and turned into empty results;
/// send errors are dropped since a newer value always supersedes a lost one.
pub struct MidiTransport<B: PortBackend> {
    backend: B,
    open_port: Option<String>,
}

impl<B: PortBackend> MidiTransport<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            open_port: None,
        }
    }

    /// List output ports, empty when enumeration fails
    pub fn list_ports(&mut self) -> Vec<PortInfo> {
        match self.backend.ports() {
            Ok(ports) => {
                debug!("Found {} MIDI output ports", ports.len());
                ports
            }
            Err(e) => {
                warn!("Failed to list MIDI ports: {}", e);
                Vec::new()
            }
        }
    }

    /// Close the current port and open the one at `index`.
    ///
    /// An unavailable device leaves the transport closed.
    pub fn open_port(&mut self, index: usize) {
        self.close();

        match self.backend.connect(index) {
            Ok(name) => {
                info!("Opened MIDI output port: {}", name);
                self.open_port = Some(name);
            }
            Err(e) => warn!("Failed to open MIDI port {}: {}", index, e),
        }
    }

    /// Release the open port
    pub fn close(&mut self) {
        if let Some(name) = self.open_port.take() {
            debug!("Closing MIDI output port: {}", name);
        }
        self.backend.disconnect();
    }

    pub fn is_open(&self) -> bool {
        self.open_port.is_some() && self.backend.is_connected()
    }

    /// Name of the open port
    pub fn open_port_name(&self) -> Option<&str> {
        self.open_port.as_deref()
    }

    /// Send a Control Change if a port is open. Channel is 0-based and
    /// clamped to 0-15.
    pub fn send_cc(&mut self, channel: i32, cc: i32, value: i32) {
        if !self.is_open() {
            return;
        }

        let message = ControlChange::new(channel, cc, value);
        let data = message.encode();
        match self.backend.send(&data) {
            Ok(()) => debug!("Sent: {} | {}", format_hex(&data), message),
            Err(e) => debug!("Dropped {}: {}", message, e),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: PortBackend> Drop for MidiTransport<B> {
    fn drop(&mut self) {
        self.backend.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockBackend;
    use super::*;

    fn transport(ports: &[&str]) -> MidiTransport<MockBackend> {
        MidiTransport::new(MockBackend::with_ports(ports))
    }

    #[test]
    fn test_send_without_open_port_is_noop() {
        let mut midi = transport(&["UA Apollo Twin"]);
        midi.send_cc(0, 20, 64);
        assert!(midi.backend().sent().is_empty());
    }

    #[test]
    fn test_send_cc_wire_format() {
        let mut midi = transport(&["UA Apollo Twin"]);
        midi.open_port(0);
        midi.send_cc(3, 20, 64);
        assert_eq!(midi.backend().sent(), vec![vec![0xB3, 20, 64]]);
    }

    #[test]
    fn test_out_of_range_channel_clamped_to_15() {
        let mut midi = transport(&["UA Apollo Twin"]);
        midi.open_port(0);
        midi.send_cc(17, 1, 2);
        assert_eq!(midi.backend().sent()[0][0], 0xBF);
    }

    #[test]
    fn test_open_missing_port_leaves_transport_closed() {
        let mut midi = transport(&["UA Apollo Twin"]);
        midi.open_port(0);
        assert!(midi.is_open());

        midi.open_port(5);
        assert!(!midi.is_open());
        assert_eq!(midi.open_port_name(), None);
    }

    #[test]
    fn test_open_port_closes_previous() {
        let mut midi = transport(&["A", "B"]);
        midi.open_port(0);
        midi.open_port(1);
        assert_eq!(midi.open_port_name(), Some("B"));
        assert_eq!(midi.backend().events(), vec!["open A", "close", "open B"]);
    }

    #[test]
    fn test_send_errors_are_swallowed() {
        let mut backend = MockBackend::with_ports(&["A"]);
        backend.fail_sends(true);
        let mut midi = MidiTransport::new(backend);
        midi.open_port(0);
        midi.send_cc(0, 1, 1);
        assert!(midi.backend().sent().is_empty());
    }

    #[test]
    fn test_list_ports_failure_yields_empty() {
        let mut backend = MockBackend::with_ports(&["A"]);
        backend.fail_listing(true);
        let mut midi = MidiTransport::new(backend);
        assert!(midi.list_ports().is_empty());
    }
}
