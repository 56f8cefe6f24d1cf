//! Leaderboard view drawn through the [`Terminal`] port

use crate::leaderboard::{LeaderboardSnapshot, Standing, TimeFormat, format_time};
use crate::terminal::{Attr, Terminal};
use crate::types::StartLight;
use crate::Result;

pub const HEADER: &str =
    "Pos No  Name                Time  Lap time  Best lap  Laps Finished";

pub const FOOTER: &str = " * * * * *  SPACE start/restart, R reset, ESC quit, then ENTER";

const NAME_WIDTH: usize = 12;

fn format_row(standing: &Standing) -> String {
    let name: String = standing.name.as_deref().unwrap_or("").chars().take(NAME_WIDTH).collect();
    format!(
        "{:<4}#{:<3}{:<width$}{:>12}{:>10}{:>10}{:>6} {}",
        standing.position,
        standing.number,
        name,
        standing.time,
        format_time(standing.last_lap, TimeFormat::Short),
        format_time(standing.best_lap, TimeFormat::Short),
        standing.laps,
        if standing.finished { "FINISHED" } else { "" },
        width = NAME_WIDTH,
    )
}

/// Draw one full frame: title bar, standings, footer with start lights.
pub fn render<T: Terminal + ?Sized>(
    terminal: &mut T,
    snapshot: &LeaderboardSnapshot,
    blink_on: bool,
) -> Result<()> {
    let (rows, cols) = terminal.size();
    terminal.clear();
    if rows == 0 || cols == 0 {
        return terminal.refresh();
    }

    terminal.draw(0, 0, &format!("{:<cols$}", HEADER), Attr::Standout);

    let footer_row = rows - 1;
    for standing in snapshot.standings.iter().take(rows.saturating_sub(2)) {
        terminal.draw(standing.position, 0, &format_row(standing), Attr::Normal);
    }

    if footer_row > 0 {
        let width = FOOTER.len().min(cols.saturating_sub(1));
        terminal.draw(footer_row, 0, &FOOTER[..width], Attr::Normal);

        let lit = StartLight::from_phase(snapshot.status.start).lit_cells(blink_on);
        if lit > 0 {
            let cells: String = FOOTER.chars().take(2 * lit).collect();
            terminal.draw(footer_row, 0, &cells, Attr::Light);
        }

        let mut tags = snapshot.status.mode.labels().join(" ");
        if snapshot.max_lap > 0 {
            if !tags.is_empty() {
                tags.push(' ');
            }
            tags.push_str(&format!("LAP {}/{}", snapshot.max_lap, snapshot.lap_target));
        }
        if !tags.is_empty() && tags.len() + FOOTER.len() + 2 < cols {
            terminal.draw(footer_row, cols - tags.len() - 1, &tags, Attr::Normal);
        }
    }

    terminal.refresh()
}
