//! Error types for config loading, state persistence and the MIDI transport.
//!
//! None of these are fatal: the coordinator reports config errors to the
//! user, treats state errors as an empty state and logs transport errors.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to load `controls.json`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure to load or save `state.json`
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read state file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse state file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize state: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write state file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// MIDI output failures
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to initialise MIDI output: {0}")]
    Init(String),

    #[error("failed to read name of MIDI port {index}: {reason}")]
    PortInfo { index: usize, reason: String },

    #[error("no MIDI output port at index {0}")]
    NoSuchPort(usize),

    #[error("failed to connect to MIDI port '{port}': {reason}")]
    Connect { port: String, reason: String },

    #[error("failed to send MIDI message: {0}")]
    Send(String),

    #[error("no MIDI output port is open")]
    NotOpen,
}
