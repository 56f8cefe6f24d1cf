//! Lap and race time formatting

use crate::types::Millis;

/// Placeholder for a time that has not been recorded.
pub const NOT_AVAILABLE: &str = "n/a";

/// Time display form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// `S.mmm`, whole seconds unbounded
    Short,
    /// `M:SS.mmm`, or `H:MM:SS.mmm` from one hour on
    Long,
}

/// Format a millisecond duration, `n/a` when there is none.
///
/// ```rust
/// use lanetimer::leaderboard::{TimeFormat, format_time};
///
/// assert_eq!(format_time(Some(61_234), TimeFormat::Short), "61.234");
/// assert_eq!(format_time(Some(61_234), TimeFormat::Long), "1:01.234");
/// assert_eq!(format_time(Some(3_661_234), TimeFormat::Long), "1:01:01.234");
/// assert_eq!(format_time(None, TimeFormat::Long), "n/a");
/// ```
pub fn format_time(time: Option<Millis>, format: TimeFormat) -> String {
    let Some(time) = time else {
        return NOT_AVAILABLE.to_string();
    };
    let s = time / 1000;
    let ms = time % 1000;

    match format {
        TimeFormat::Short => format!("{}.{:03}", s, ms),
        TimeFormat::Long if s < 3600 => format!("{}:{:02}.{:03}", s / 60, s % 60, ms),
        TimeFormat::Long => format!("{}:{:02}:{:02}.{:03}", s / 3600, (s / 60) % 60, s % 60, ms),
    }
}
