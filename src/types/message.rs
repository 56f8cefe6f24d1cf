//! Messages reported by the control unit

use serde::{Deserialize, Serialize};

use super::{Lane, Millis, ModeFlags};

/// Number of controller addresses the control unit reports on.
pub const MAX_LANES: usize = 8;

/// Start-light phase and auxiliary mode state.
///
/// The core only interprets `start`; fuel levels, mode and pit flags are
/// carried for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Status {
    /// Fuel level per controller address
    pub fuel: [u8; MAX_LANES],
    /// Start-light phase, 0..=7 in normal operation
    pub start: u8,
    /// Hardware mode flags
    pub mode: ModeFlags,
    /// Pit lane occupancy per controller address
    pub pit: [bool; MAX_LANES],
}

impl Status {
    /// Status carrying only a start-light phase.
    pub fn with_phase(start: u8) -> Self {
        Self { start, ..Self::default() }
    }
}

/// A car crossing the timing point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    /// Controller address of the lane
    pub address: Lane,
    /// Control unit clock in milliseconds
    pub timestamp: Millis,
    /// Sector the crossing was reported on
    #[serde(default = "default_sector")]
    pub sector: u8,
}

fn default_sector() -> u8 {
    1
}

impl Timer {
    pub fn new(address: Lane, timestamp: Millis) -> Self {
        Self { address, timestamp, sector: default_sector() }
    }
}

/// A single message polled from the control unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Message {
    Status(Status),
    Timer(Timer),
    /// Anything the driver could not classify, kept verbatim for logging
    Unknown { raw: String },
}

impl Message {
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Status(_) => "status",
            Message::Timer(_) => "timer",
            Message::Unknown { .. } => "unknown",
        }
    }
}

impl From<Status> for Message {
    fn from(status: Status) -> Self {
        Message::Status(status)
    }
}

impl From<Timer> for Message {
    fn from(timer: Timer) -> Self {
        Message::Timer(timer)
    }
}
