//! Per-lane lap timing state machine

use tracing::{debug, info};

use crate::driver::Driver;
use crate::types::{Millis, elapsed};

/// Phase of a single lane's timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneState {
    /// No crossing seen yet
    Idle,
    /// Clock running, laps accumulating
    Running,
    /// Lap target reached; terminal until reset
    Finished,
}

/// Outcome of feeding one crossing to a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    /// Driver already finished; nothing changed
    Ignored,
    /// First crossing: starts the clock, no lap
    Started,
    /// A lap was completed
    Lap { lap: Millis, number: u32 },
    /// The lap that reached the target was completed
    Finished { lap: Millis, number: u32 },
}

impl Crossing {
    pub fn is_finish(&self) -> bool {
        matches!(self, Crossing::Finished { .. })
    }

    /// Whether the driver record was touched.
    pub fn changed(&self) -> bool {
        !matches!(self, Crossing::Ignored)
    }
}

/// Turns crossings into laps for a configured lap target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LapTimer {
    lap_target: u32,
}

impl LapTimer {
    pub fn new(lap_target: u32) -> Self {
        Self { lap_target }
    }

    pub fn lap_target(&self) -> u32 {
        self.lap_target
    }

    pub fn state(&self, driver: &Driver) -> LaneState {
        if driver.is_finished(self.lap_target) {
            LaneState::Finished
        } else if driver.last_crossing().is_some() {
            LaneState::Running
        } else {
            LaneState::Idle
        }
    }

    /// Apply a crossing at `timestamp` to `driver`.
    ///
    /// Crossings after the driver finished are ignored. The first crossing
    /// only starts the clock (flying start).
    pub fn record_crossing(&self, driver: &mut Driver, timestamp: Millis) -> Crossing {
        if driver.is_finished(self.lap_target) {
            debug!(lane = driver.lane(), timestamp, "Crossing after finish ignored");
            return Crossing::Ignored;
        }

        let lap = driver.last_crossing().map(|last| elapsed(timestamp, last));
        driver.record(timestamp, lap);

        let Some(lap) = lap else {
            debug!(lane = driver.lane(), timestamp, "Clock started");
            return Crossing::Started;
        };

        let number = driver.finished_laps();
        if driver.is_finished(self.lap_target) {
            info!(
                lane = driver.lane(),
                driver = %driver.display_name(),
                lap,
                best = ?driver.best_lap(),
                "Driver finished"
            );
            Crossing::Finished { lap, number }
        } else {
            debug!(lane = driver.lane(), lap, number, "Lap completed");
            Crossing::Lap { lap, number }
        }
    }
}
