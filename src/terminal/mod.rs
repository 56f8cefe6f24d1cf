//! Terminal port used by the leaderboard view.
//!
//! The dispatch loop only needs buffered drawing and a non-blocking key read;
//! [`ScreenBuffer`] provides both in memory and [`AnsiTerminal`] puts them on a
//! real terminal.

mod ansi;
mod buffer;

pub use ansi::AnsiTerminal;
pub use buffer::ScreenBuffer;

use crate::Result;

/// Display attribute for drawn text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Attr {
    #[default]
    Normal,
    /// Reverse video, used for the title bar
    Standout,
    /// Lit start-light cell
    Light,
}

/// Commands the user can issue from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// ESC or `q`
    Quit,
    /// SPACE: reset and start a race
    Start,
    /// `r`: reset without starting
    Reset,
    Other(char),
}

impl Key {
    pub fn from_char(c: char) -> Self {
        match c {
            '\x1b' | 'q' | 'Q' => Key::Quit,
            ' ' => Key::Start,
            'r' | 'R' => Key::Reset,
            other => Key::Other(other),
        }
    }
}

/// Minimal terminal interface: buffered drawing plus non-blocking input.
pub trait Terminal {
    /// Visible size as `(rows, columns)`.
    fn size(&self) -> (usize, usize);

    fn clear(&mut self);

    /// Draw `text` at `row`/`col`, clipped to the right edge.
    fn draw(&mut self, row: usize, col: usize, text: &str, attr: Attr);

    /// Push the drawn frame to the screen.
    fn refresh(&mut self) -> Result<()>;

    /// Next pending key, `Ok(None)` when nothing was pressed. Never blocks.
    fn read_key(&mut self) -> Result<Option<Key>>;
}
