//! In-memory screen

use std::collections::VecDeque;

use super::{Attr, Key, Terminal};
use crate::Result;

/// Fixed-size character grid with a queue of pending keys.
#[derive(Debug, Clone)]
pub struct ScreenBuffer {
    rows: usize,
    cols: usize,
    cells: Vec<(char, Attr)>,
    keys: VecDeque<Key>,
    refreshes: usize,
}

impl ScreenBuffer {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![(' ', Attr::Normal); rows * cols],
            keys: VecDeque::new(),
            refreshes: 0,
        }
    }

    /// Queue a key for a later [`Terminal::read_key`].
    pub fn push_key(&mut self, key: Key) {
        self.keys.push_back(key);
    }

    /// Text of `row` with trailing blanks removed.
    pub fn row_text(&self, row: usize) -> String {
        if row >= self.rows {
            return String::new();
        }
        let start = row * self.cols;
        let text: String = self.cells[start..start + self.cols].iter().map(|(c, _)| *c).collect();
        text.trim_end().to_string()
    }

    pub fn attr_at(&self, row: usize, col: usize) -> Option<Attr> {
        (row < self.rows && col < self.cols).then(|| self.cells[row * self.cols + col].1)
    }

    /// Whole screen, one line per row.
    pub fn contents(&self) -> String {
        (0..self.rows).map(|row| self.row_text(row)).collect::<Vec<_>>().join("\n")
    }

    /// Runs of equal attributes per row, for renderers that emit escape codes.
    pub fn styled_rows(&self) -> Vec<Vec<(Attr, String)>> {
        (0..self.rows)
            .map(|row| {
                let mut runs: Vec<(Attr, String)> = Vec::new();
                for &(c, attr) in &self.cells[row * self.cols..(row + 1) * self.cols] {
                    match runs.last_mut() {
                        Some((current, text)) if *current == attr => text.push(c),
                        _ => runs.push((attr, c.to_string())),
                    }
                }
                runs
            })
            .collect()
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes
    }
}

impl Terminal for ScreenBuffer {
    fn size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn clear(&mut self) {
        self.cells.fill((' ', Attr::Normal));
    }

    fn draw(&mut self, row: usize, col: usize, text: &str, attr: Attr) {
        if row >= self.rows {
            return;
        }
        for (offset, c) in text.chars().enumerate() {
            let col = col + offset;
            if col >= self.cols {
                break;
            }
            self.cells[row * self.cols + col] = (c, attr);
        }
    }

    fn refresh(&mut self) -> Result<()> {
        self.refreshes += 1;
        Ok(())
    }

    fn read_key(&mut self) -> Result<Option<Key>> {
        Ok(self.keys.pop_front())
    }
}
