//! UAFX MIDI Controller
//!
//! Configurable on-screen knobs and buttons mapped to MIDI Control Change
//! messages. Device layouts come from `controls.json`; the last value of
//! every control is kept per device in `state.json`.

pub mod cli;
pub mod config;
pub mod controls;
pub mod coordinator;
pub mod error;
pub mod grid;
pub mod midi;
pub mod paths;
pub mod state;
pub mod transport;
pub mod ui;
