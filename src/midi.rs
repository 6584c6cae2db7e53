//! MIDI Control Change message encoding
//!
//! The panel only ever speaks Control Change, so this is the one message type
//! modelled here. Channels are 0-15 on the wire and 1-16 in the UI.

use std::fmt;

/// Status nibble for Control Change
pub const CONTROL_CHANGE: u8 = 0xB0;

/// Highest wire channel (channel 16 in the UI)
pub const MAX_CHANNEL: u8 = 15;

/// Highest 7-bit data value
pub const MAX_DATA: u8 = 0x7F;

/// Control Change: channel (0-15), cc (0-127), value (0-127)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlChange {
    pub channel: u8,
    pub cc: u8,
    pub value: u8,
}

impl ControlChange {
    /// Build a message from unchecked integers.
    ///
    /// The channel is clamped to 0-15. The controller number and value are
    /// masked to 7 bits, matching what ends up on the wire.
    pub fn new(channel: i32, cc: i32, value: i32) -> Self {
        Self {
            channel: channel.clamp(0, MAX_CHANNEL as i32) as u8,
            cc: (cc & MAX_DATA as i32) as u8,
            value: (value & MAX_DATA as i32) as u8,
        }
    }

    /// Encode to the 3-byte wire format
    pub fn encode(&self) -> [u8; 3] {
        [
            CONTROL_CHANGE | (self.channel & 0x0F),
            self.cc & MAX_DATA,
            self.value & MAX_DATA,
        ]
    }
}

impl fmt::Display for ControlChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CC ch:{} cc:{} v:{}", self.channel + 1, self.cc, self.value)
    }
}

/// Format MIDI bytes as hex string for debugging
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
