//! Leaderboard ranking and formatting.
//!
//! Ranking is a pure projection of the roster: nothing here mutates timing
//! state. Two policies are supported:
//!
//! - [`RankingPolicy::ProgressFirst`] (race): most laps first, then earliest
//!   crossing; followers show their gap to the leader
//! - [`RankingPolicy::BestLapFirst`] (time trial): fastest lap first, drivers
//!   without a lap last with a `-` placeholder
//!
//! Both give dense positions `1..=N` and break remaining ties by lane.

mod format;

pub use format::{NOT_AVAILABLE, TimeFormat, format_time};

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use crate::driver::Driver;
use crate::types::{Lane, Millis, Status, elapsed};

/// Shown in place of a best lap that has not been set.
pub const NO_TIME: &str = "-";

/// How drivers are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankingPolicy {
    /// Race mode
    #[default]
    #[serde(alias = "progress")]
    ProgressFirst,
    /// Time-trial mode
    #[serde(alias = "best-lap")]
    BestLapFirst,
}

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub position: usize,
    pub lane: Lane,
    pub number: u16,
    pub name: Option<String>,
    /// Race time for the leader, gap for followers, or best lap in time trial
    pub time: String,
    pub last_lap: Option<Millis>,
    pub best_lap: Option<Millis>,
    pub laps: u32,
    pub finished: bool,
}

/// Everything a view needs to draw one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeaderboardSnapshot {
    pub standings: Vec<Standing>,
    pub max_lap: u32,
    pub lap_target: u32,
    pub status: Status,
}

/// Ranking policy bound to a lap target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leaderboard {
    policy: RankingPolicy,
    lap_target: u32,
}

impl Leaderboard {
    pub fn new(policy: RankingPolicy, lap_target: u32) -> Self {
        Self { policy, lap_target }
    }

    pub fn policy(&self) -> RankingPolicy {
        self.policy
    }

    /// Rank `drivers` relative to the race start time.
    pub fn rank(&self, drivers: &[Driver], start: Option<Millis>) -> Vec<Standing> {
        match self.policy {
            RankingPolicy::ProgressFirst => self.rank_progress(drivers, start),
            RankingPolicy::BestLapFirst => self.rank_best_lap(drivers),
        }
    }

    fn rank_progress(&self, drivers: &[Driver], start: Option<Millis>) -> Vec<Standing> {
        let race_time = |driver: &Driver| {
            driver.last_crossing().map(|t| start.map_or(t, |start| elapsed(t, start)))
        };

        let mut ranked: Vec<&Driver> =
            drivers.iter().filter(|d| d.last_crossing().is_some()).collect();
        ranked.sort_by_key(|d| (Reverse(d.finished_laps()), race_time(d), d.lane()));

        let Some(leader) = ranked.first().copied() else {
            return Vec::new();
        };

        ranked
            .iter()
            .enumerate()
            .map(|(index, driver)| {
                let time = if index == 0 {
                    let since_start = start.and_then(|_| race_time(driver));
                    format_time(since_start, TimeFormat::Long)
                } else if driver.finished_laps() == leader.finished_laps() {
                    let gap = race_time(driver)
                        .zip(race_time(leader))
                        .map(|(own, lead)| own.saturating_sub(lead));
                    format!("+{}s", format_time(gap, TimeFormat::Short))
                } else {
                    let behind = leader.finished_laps() - driver.finished_laps();
                    format!("+{} Lap{}", behind, if behind != 1 { "s" } else { "" })
                };
                self.standing(index + 1, driver, time)
            })
            .collect()
    }

    fn rank_best_lap(&self, drivers: &[Driver]) -> Vec<Standing> {
        let mut ranked: Vec<&Driver> = drivers.iter().filter(|d| d.is_participant()).collect();
        ranked.sort_by_key(|d| {
            (d.best_lap().is_none(), d.best_lap(), Reverse(d.finished_laps()), d.lane())
        });

        ranked
            .iter()
            .enumerate()
            .map(|(index, driver)| {
                let time = match driver.best_lap() {
                    Some(best) => format_time(Some(best), TimeFormat::Short),
                    None => NO_TIME.to_string(),
                };
                self.standing(index + 1, driver, time)
            })
            .collect()
    }

    fn standing(&self, position: usize, driver: &Driver, time: String) -> Standing {
        Standing {
            position,
            lane: driver.lane(),
            number: driver.number(),
            name: driver.name().map(str::to_string),
            time,
            last_lap: driver.last_lap(),
            best_lap: driver.best_lap(),
            laps: driver.finished_laps(),
            finished: driver.is_finished(self.lap_target),
        }
    }
}
