//! Race-wide clock and status bookkeeping

use tracing::{debug, trace};

use crate::driver::Driver;
use crate::types::{Message, Millis, Status, Timer};

/// Aggregates that belong to the race rather than to a lane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaceState {
    /// Timestamp of the first crossing of the race, on any lane
    pub start: Option<Millis>,
    /// Highest completed lap count over all drivers
    pub max_lap: u32,
    /// Most recent status report
    pub status: Status,
    /// Last message taken from the control unit, for duplicate suppression
    pub last_message: Option<Message>,
}

/// Owns the [`RaceState`] and applies timing and status updates to it.
#[derive(Debug, Clone, Default)]
pub struct RaceClock {
    state: RaceState,
}

impl RaceClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RaceState {
        &self.state
    }

    pub fn start(&self) -> Option<Millis> {
        self.state.start
    }

    pub fn max_lap(&self) -> u32 {
        self.state.max_lap
    }

    pub fn status(&self) -> &Status {
        &self.state.status
    }

    /// Account for a crossing already applied to `driver`.
    ///
    /// Returns the new maximum lap count when it increased, which is the cue
    /// to update the hardware lap counter.
    pub fn on_timing(&mut self, timer: &Timer, driver: &Driver) -> Option<u32> {
        if self.state.start.is_none() {
            debug!(lane = timer.address, timestamp = timer.timestamp, "Race clock started");
            self.state.start = Some(timer.timestamp);
        }

        let laps = driver.finished_laps();
        if laps > self.state.max_lap {
            self.state.max_lap = laps;
            debug!(max_lap = laps, "Lap count advanced");
            Some(laps)
        } else {
            None
        }
    }

    /// Replace the status wholesale; the newest report always wins.
    pub fn on_status(&mut self, status: Status) {
        trace!(phase = status.start, "Status update");
        self.state.status = status;
    }

    /// Whether `message` repeats the previously accepted message.
    pub fn is_repeat(&self, message: &Message) -> bool {
        self.state.last_message.as_ref() == Some(message)
    }

    pub fn remember(&mut self, message: Message) {
        self.state.last_message = Some(message);
    }

    /// Clear race history. Status reflects live hardware and is kept.
    pub fn reset(&mut self) {
        self.state.start = None;
        self.state.max_lap = 0;
        self.state.last_message = None;
    }
}
