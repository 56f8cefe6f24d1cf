//! Control unit mode bits reported with every status message
//!
//! The low nibble of the status `mode` byte; anything above it is carried
//! through untouched.

use serde::{Deserialize, Serialize};

pub mod mode {
    pub const FUEL: u8 = 0x01;
    pub const REAL: u8 = 0x02;
    pub const PIT_LANE: u8 = 0x04;
    pub const LAP_COUNTER: u8 = 0x08;
}

/// Mode flags byte from a status message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeFlags(pub u8);

impl ModeFlags {
    pub fn new(value: u8) -> Self {
        Self(value)
    }

    /// Check if a flag is set using a bitmask.
    pub fn has_flag(&self, flag: u8) -> bool {
        (self.0 & flag) != 0
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Short labels for the flags that are set, in bit order.
    pub fn labels(&self) -> Vec<&'static str> {
        [
            (mode::FUEL, "FUEL"),
            (mode::REAL, "REAL"),
            (mode::PIT_LANE, "PIT"),
            (mode::LAP_COUNTER, "LAPS"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.has_flag(*flag))
        .map(|(_, label)| label)
        .collect()
    }
}
