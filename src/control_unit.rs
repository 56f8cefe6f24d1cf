//! Control unit port
//!
//! The bit-level protocol lives behind this trait; the race core only sees
//! decoded [`Message`]s and issues the handful of commands below.

use crate::types::Message;
use crate::{RaceError, Result};

/// Commands the race core sends to the control unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reset,
    Start,
    ClearPositions,
    SetLap(u8),
}

/// Trait for lane-timing control units
///
/// Implementations must never block in [`request`](ControlUnit::request):
/// when nothing is pending they return `Ok(None)` straight away.
#[async_trait::async_trait]
pub trait ControlUnit: Send {
    /// Firmware version string
    async fn version(&mut self) -> Result<String>;

    /// Next message from the control unit
    ///
    /// Returns:
    /// - `Ok(Some(message))` - A status report or timer crossing
    /// - `Ok(None)` - Nothing available right now
    /// - `Err(e)` - I/O failure; interrupted calls may be retried
    async fn request(&mut self) -> Result<Option<Message>>;

    /// Reset the control unit's timer
    async fn reset(&mut self) -> Result<()>;

    /// Initiate the start-light sequence
    async fn start(&mut self) -> Result<()>;

    /// Clear all position information
    async fn clrpos(&mut self) -> Result<()>;

    /// Show `lap` on the hardware lap counter
    async fn setlap(&mut self, lap: u8) -> Result<()>;
}

/// Check that a lap count fits the hardware lap counter.
pub fn lap_counter_value(lap: u32) -> Result<u8> {
    u8::try_from(lap).map_err(|_| RaceError::LapCounterRange { value: lap })
}
