//! Start-light indicator derived from the status phase

/// Number of light cells on the indicator.
pub const LIGHT_CELLS: usize = 5;

/// What the start-light indicator should show for a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartLight {
    /// Nothing lit (phase 0, or 7 once the race is under way)
    Off,
    /// The given number of cells lit
    Lit(usize),
    /// Full indicator blinking, driven off the wall clock
    Blink,
}

impl StartLight {
    pub fn from_phase(phase: u8) -> Self {
        match phase {
            0 | 7 => StartLight::Off,
            1 => StartLight::Lit(LIGHT_CELLS),
            2..=6 => StartLight::Lit(7 - phase as usize),
            _ => StartLight::Blink,
        }
    }

    /// Number of cells to light, given whether the blink cycle is currently on.
    pub fn lit_cells(self, blink_on: bool) -> usize {
        match self {
            StartLight::Off => 0,
            StartLight::Lit(n) => n,
            StartLight::Blink if blink_on => LIGHT_CELLS,
            StartLight::Blink => 0,
        }
    }
}

/// Half-second blink cycle derived from wall-clock time.
pub fn blink_on(now: std::time::SystemTime) -> bool {
    let millis =
        now.duration_since(std::time::UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or_default();
    (millis / 500) % 2 == 0
}
