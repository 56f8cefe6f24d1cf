//! Per-lane timing records and the fixed-size roster that holds them
//!
//! A [`Driver`] is a passive record: it is only ever mutated by
//! [`LapTimer`](crate::timing::LapTimer) and by [`Driver::reset`].

use std::collections::BTreeMap;

use crate::types::{Lane, MAX_LANES, Millis};
use crate::{RaceError, Result};

/// Timing history for one lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Driver {
    lane: Lane,
    name: Option<String>,
    last_crossing: Option<Millis>,
    laps: Vec<Millis>,
    best_lap: Option<Millis>,
    last_lap: Option<Millis>,
}

impl Driver {
    pub fn new(lane: Lane, name: Option<String>) -> Self {
        Self { lane, name, last_crossing: None, laps: Vec::new(), best_lap: None, last_lap: None }
    }

    pub fn lane(&self) -> Lane {
        self.lane
    }

    /// Car number shown on the leaderboard (lane address + 1).
    pub fn number(&self) -> u16 {
        self.lane as u16 + 1
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name used in result records; anonymous lanes fall back to their car number.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Car #{}", self.number()),
        }
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// A driver is registered when the roster gave it a name.
    pub fn is_registered(&self) -> bool {
        self.name.is_some()
    }

    pub fn last_crossing(&self) -> Option<Millis> {
        self.last_crossing
    }

    /// Completed lap durations, oldest first.
    pub fn laps(&self) -> &[Millis] {
        &self.laps
    }

    pub fn best_lap(&self) -> Option<Millis> {
        self.best_lap
    }

    pub fn last_lap(&self) -> Option<Millis> {
        self.last_lap
    }

    pub fn finished_laps(&self) -> u32 {
        self.laps.len() as u32
    }

    pub fn is_finished(&self, lap_target: u32) -> bool {
        self.finished_laps() >= lap_target
    }

    /// Registered, or seen at the timing point at least once.
    pub fn is_participant(&self) -> bool {
        self.is_registered() || self.last_crossing.is_some()
    }

    /// Sum of all lap durations.
    pub fn total_time(&self) -> Millis {
        self.laps.iter().fold(0, |acc: Millis, lap| acc.wrapping_add(*lap))
    }

    /// Record a crossing at `timestamp`, closing a lap of `lap` ms when one was open.
    pub(crate) fn record(&mut self, timestamp: Millis, lap: Option<Millis>) {
        if let Some(lap) = lap {
            self.laps.push(lap);
            self.best_lap = Some(self.best_lap.map_or(lap, |best| best.min(lap)));
            self.last_lap = Some(lap);
        }
        self.last_crossing = Some(timestamp);
    }

    /// Clear all timing history; the name survives.
    pub fn reset(&mut self) {
        self.last_crossing = None;
        self.laps.clear();
        self.best_lap = None;
        self.last_lap = None;
    }
}

/// Fixed-size set of drivers indexed by lane address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    drivers: Vec<Driver>,
}

impl Roster {
    /// Create a roster of `lanes` drivers, naming those listed in `names`.
    pub fn new(lanes: usize, names: &BTreeMap<Lane, String>) -> Result<Self> {
        if lanes == 0 || lanes > MAX_LANES {
            return Err(RaceError::config_invalid(format!(
                "lane count {} outside 1..={}",
                lanes, MAX_LANES
            )));
        }
        if let Some(lane) = names.keys().find(|lane| **lane as usize >= lanes) {
            return Err(RaceError::LaneOutOfRange { lane: *lane, lanes });
        }

        let drivers = (0..lanes as Lane)
            .map(|lane| Driver::new(lane, names.get(&lane).cloned()))
            .collect();
        Ok(Self { drivers })
    }

    /// Roster of anonymous drivers.
    pub fn anonymous(lanes: usize) -> Result<Self> {
        Self::new(lanes, &BTreeMap::new())
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    pub fn get(&self, lane: Lane) -> Option<&Driver> {
        self.drivers.get(lane as usize)
    }

    pub(crate) fn get_mut(&mut self, lane: Lane) -> Option<&mut Driver> {
        self.drivers.get_mut(lane as usize)
    }

    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    pub fn iter(&self) -> impl Iterator<Item = &Driver> {
        self.drivers.iter()
    }

    /// Rename a lane, e.g. when a driver signs in at the terminal.
    pub fn rename(&mut self, lane: Lane, name: Option<String>) -> Result<()> {
        let lanes = self.len();
        let driver = self.get_mut(lane).ok_or(RaceError::LaneOutOfRange { lane, lanes })?;
        driver.set_name(name);
        Ok(())
    }

    /// True once there is at least one participant and every participant is finished.
    pub fn all_finished(&self, lap_target: u32) -> bool {
        let mut participants = self.drivers.iter().filter(|d| d.is_participant()).peekable();
        participants.peek().is_some() && participants.all(|d| d.is_finished(lap_target))
    }

    pub fn reset(&mut self) {
        for driver in &mut self.drivers {
            driver.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> BTreeMap<Lane, String> {
        BTreeMap::from([(0, "Alice".to_string()), (2, "Carol".to_string())])
    }

    #[test]
    fn roster_is_indexed_by_lane() {
        let roster = Roster::new(4, &names()).unwrap();
        assert_eq!(roster.len(), 4);
        assert_eq!(roster.get(0).unwrap().name(), Some("Alice"));
        assert_eq!(roster.get(1).unwrap().name(), None);
        assert_eq!(roster.get(2).unwrap().lane(), 2);
        assert!(roster.get(4).is_none());
    }

    #[test]
    fn roster_rejects_bad_sizes() {
        assert!(matches!(Roster::anonymous(0), Err(RaceError::Config { .. })));
        assert!(matches!(Roster::anonymous(MAX_LANES + 1), Err(RaceError::Config { .. })));
        assert!(matches!(
            Roster::new(2, &names()),
            Err(RaceError::LaneOutOfRange { lane: 2, lanes: 2 })
        ));
    }

    #[test]
    fn record_tracks_best_and_last() {
        let mut driver = Driver::new(0, None);
        driver.record(1_000, None);
        assert_eq!(driver.finished_laps(), 0);
        driver.record(6_000, Some(5_000));
        driver.record(10_000, Some(4_000));
        driver.record(14_500, Some(4_500));
        assert_eq!(driver.laps(), &[5_000, 4_000, 4_500]);
        assert_eq!(driver.best_lap(), Some(4_000));
        assert_eq!(driver.last_lap(), Some(4_500));
        assert_eq!(driver.last_crossing(), Some(14_500));
        assert_eq!(driver.total_time(), 13_500);
    }

    #[test]
    fn reset_keeps_name() {
        let mut roster = Roster::new(3, &names()).unwrap();
        roster.get_mut(0).unwrap().record(100, None);
        roster.get_mut(0).unwrap().record(900, Some(800));
        roster.reset();

        let alice = roster.get(0).unwrap();
        assert_eq!(alice.name(), Some("Alice"));
        assert_eq!(alice.finished_laps(), 0);
        assert_eq!(alice.best_lap(), None);
        assert_eq!(alice.last_lap(), None);
        assert_eq!(alice.last_crossing(), None);
    }

    #[test]
    fn display_name_falls_back_to_car_number() {
        let roster = Roster::new(3, &names()).unwrap();
        assert_eq!(roster.get(0).unwrap().display_name(), "Alice");
        assert_eq!(roster.get(1).unwrap().display_name(), "Car #2");
    }

    #[test]
    fn all_finished_needs_participants() {
        let mut roster = Roster::anonymous(2).unwrap();
        assert!(!roster.all_finished(1));

        roster.get_mut(1).unwrap().record(0, None);
        assert!(!roster.all_finished(1));
        roster.get_mut(1).unwrap().record(500, Some(500));
        assert!(roster.all_finished(1));

        roster.rename(0, Some("Late".to_string())).unwrap();
        assert!(!roster.all_finished(1));
    }
}
