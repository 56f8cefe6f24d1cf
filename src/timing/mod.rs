//! Lap timing and race clock state machines.
//!
//! [`LapTimer`] owns the per-lane transitions `Idle → Running → Finished`;
//! [`RaceClock`] keeps the race-wide start time, lap count and status.

mod clock;
mod lap_timer;

pub use clock::{RaceClock, RaceState};
pub use lap_timer::{Crossing, LaneState, LapTimer};
