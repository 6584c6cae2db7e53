//! In-memory port backend for tests

use super::{PortBackend, PortInfo};
use crate::error::TransportError;

type ConnectHook = Box<dyn FnMut(&str)>;

/// Records every connect, disconnect and sent message
#[derive(Default)]
pub(crate) struct MockBackend {
    ports: Vec<String>,
    connected: Option<String>,
    sent: Vec<Vec<u8>>,
    events: Vec<String>,
    fail_listing: bool,
    fail_sends: bool,
    on_connect: Option<ConnectHook>,
}

impl MockBackend {
    pub(crate) fn with_ports(ports: &[&str]) -> Self {
        Self {
            ports: ports.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    pub(crate) fn fail_listing(&mut self, fail: bool) {
        self.fail_listing = fail;
    }

    pub(crate) fn fail_sends(&mut self, fail: bool) {
        self.fail_sends = fail;
    }

    /// Run `hook` with the port name each time a port is opened
    pub(crate) fn on_connect(&mut self, hook: impl FnMut(&str) + 'static) {
        self.on_connect = Some(Box::new(hook));
    }

    pub(crate) fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.clone()
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.events.clone()
    }
}

impl PortBackend for MockBackend {
    fn ports(&mut self) -> Result<Vec<PortInfo>, TransportError> {
        if self.fail_listing {
            return Err(TransportError::Init("mock listing failure".into()));
        }
        Ok(self
            .ports
            .iter()
            .enumerate()
            .map(|(index, name)| PortInfo {
                index,
                name: name.clone(),
            })
            .collect())
    }

    fn connect(&mut self, index: usize) -> Result<String, TransportError> {
        let name = self
            .ports
            .get(index)
            .cloned()
            .ok_or(TransportError::NoSuchPort(index))?;

        if let Some(hook) = self.on_connect.as_mut() {
            hook(&name);
        }

        self.events.push(format!("open {}", name));
        self.connected = Some(name.clone());
        Ok(name)
    }

    fn disconnect(&mut self) {
        if self.connected.take().is_some() {
            self.events.push("close".to_string());
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.is_some()
    }

    fn send(&mut self, message: &[u8]) -> Result<(), TransportError> {
        if self.connected.is_none() {
            return Err(TransportError::NotOpen);
        }
        if self.fail_sends {
            return Err(TransportError::Send("mock send failure".into()));
        }
        self.sent.push(message.to_vec());
        Ok(())
    }
}
