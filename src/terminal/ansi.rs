//! ANSI terminal output with line-buffered keyboard input

use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::{Attr, Key, ScreenBuffer, Terminal};
use crate::{RaceError, Result};

const CLEAR_HOME: &str = "\x1b[H\x1b[2J";
const RESET: &str = "\x1b[0m";

/// Draws into a back buffer and repaints stdout only when the frame changed.
///
/// Keys are read line by line from stdin on a background task, so a key
/// takes effect once ENTER is pressed.
pub struct AnsiTerminal {
    back: ScreenBuffer,
    shown: Option<String>,
    keys: mpsc::UnboundedReceiver<Key>,
}

impl AnsiTerminal {
    /// Create a terminal of the given size and start reading stdin.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(rows: usize, cols: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                trace!(line = %line, "Keyboard input");
                for c in line.chars() {
                    if tx.send(Key::from_char(c)).is_err() {
                        return;
                    }
                }
            }
            debug!("Keyboard input closed");
        });
        Self::with_keys(rows, cols, rx)
    }

    /// Terminal fed from an existing key channel.
    pub fn with_keys(rows: usize, cols: usize, keys: mpsc::UnboundedReceiver<Key>) -> Self {
        Self { back: ScreenBuffer::new(rows, cols), shown: None, keys }
    }

    fn sgr(attr: Attr) -> &'static str {
        match attr {
            Attr::Normal => RESET,
            Attr::Standout => "\x1b[7m",
            Attr::Light => "\x1b[31;1m",
        }
    }

    fn encode(&self) -> String {
        let mut frame = String::from(CLEAR_HOME);
        for runs in self.back.styled_rows() {
            for (attr, text) in runs {
                frame.push_str(Self::sgr(attr));
                frame.push_str(&text);
            }
            frame.push_str(RESET);
            frame.push_str("\r\n");
        }
        frame
    }
}

impl Terminal for AnsiTerminal {
    fn size(&self) -> (usize, usize) {
        self.back.size()
    }

    fn clear(&mut self) {
        self.back.clear();
    }

    fn draw(&mut self, row: usize, col: usize, text: &str, attr: Attr) {
        self.back.draw(row, col, text, attr);
    }

    fn refresh(&mut self) -> Result<()> {
        let frame = self.encode();
        if self.shown.as_deref() == Some(frame.as_str()) {
            return Ok(());
        }
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(frame.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|e| RaceError::port_error("terminal", e))?;
        self.shown = Some(frame);
        Ok(())
    }

    fn read_key(&mut self) -> Result<Option<Key>> {
        match self.keys.try_recv() {
            Ok(key) => Ok(Some(key)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            // stdin closed; the race keeps running until quit by other means
            Err(mpsc::error::TryRecvError::Disconnected) => Ok(None),
        }
    }
}
