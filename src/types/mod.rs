//! Core types shared by the timing, ranking and dispatch layers.
//!
//! - [`Message`] is what the control unit reports: a [`Status`], a [`Timer`]
//!   crossing, or something unrecognised
//! - [`ModeFlags`] wraps the status mode byte
//! - [`StartLight`] turns a status phase into lit indicator cells
//!
//! Timestamps come from the control unit's own millisecond clock, a `u32` that
//! wraps; differences are always taken with [`elapsed`].

mod message;
pub mod mode_flags;
mod start_light;

pub use message::{MAX_LANES, Message, Status, Timer};
pub use mode_flags::ModeFlags;
pub use start_light::{LIGHT_CELLS, StartLight, blink_on};

/// Controller address of a lane.
pub type Lane = u8;

/// Control unit clock value, or a duration, in milliseconds.
pub type Millis = u32;

/// Milliseconds from `earlier` to `later` on the wrapping control unit clock.
pub fn elapsed(later: Millis, earlier: Millis) -> Millis {
    later.wrapping_sub(earlier)
}
