//! Shared fakes and builders for tests and benchmarks
//!
//! Everything here is in-memory: a scripted control unit with error
//! injection, a capturing result log, remote stores that fail or stall and
//! driver builders.

#![cfg(any(test, feature = "benchmark"))]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::control_unit::{Command, ControlUnit};
use crate::driver::Driver;
use crate::persist::{Fields, RemoteStore, ResultLog, ResultRecord};
use crate::timing::LapTimer;
use crate::types::{Lane, Message, Millis};
use crate::{RaceError, Result};

/// Driver on `lane` that crossed the timing point at each of `stamps`.
pub fn driver_with_crossings(lane: Lane, name: Option<&str>, stamps: &[Millis]) -> Driver {
    let timer = LapTimer::new(u32::MAX);
    let mut driver = Driver::new(lane, name.map(str::to_string));
    for stamp in stamps {
        timer.record_crossing(&mut driver, *stamp);
    }
    driver
}

/// Fixed completion time used by [`sample_record`].
pub fn sample_completed_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 4, 18, 30, 0).single().unwrap_or_default()
}

/// A three-lap result for `name`.
pub fn sample_record(name: &str, best_lap: Option<Millis>) -> ResultRecord {
    ResultRecord {
        driver_name: name.to_string(),
        lane: 0,
        best_lap,
        total_time: best_lap.map_or(0, |best| best * 3),
        race_time: None,
        laps: 3,
        completed_at: sample_completed_at(),
    }
}

/// Control unit that replays a queue of poll outcomes and records commands.
///
/// Once the queue is empty every poll returns `Ok(None)`.
#[derive(Debug, Default)]
pub struct ScriptedControlUnit {
    polls: VecDeque<Result<Option<Message>>>,
    commands: Vec<Command>,
}

impl ScriptedControlUnit {
    pub fn with_messages(messages: impl IntoIterator<Item = Message>) -> Self {
        let mut cu = Self::default();
        for message in messages {
            cu.push_message(message);
        }
        cu
    }

    pub fn push_message(&mut self, message: Message) {
        self.polls.push_back(Ok(Some(message)));
    }

    /// Queue a poll failing with an I/O error of `kind`.
    pub fn push_error(&mut self, kind: std::io::ErrorKind) {
        let source = std::io::Error::from(kind);
        self.push_failure(RaceError::port_error("scripted control unit", source));
    }

    /// Queue a poll failing with `error`.
    pub fn push_failure(&mut self, error: RaceError) {
        self.polls.push_back(Err(error));
    }

    /// Poll outcomes not yet consumed.
    pub fn pending(&self) -> usize {
        self.polls.len()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.clone()
    }
}

#[async_trait]
impl ControlUnit for ScriptedControlUnit {
    async fn version(&mut self) -> Result<String> {
        Ok("scripted".to_string())
    }

    async fn request(&mut self) -> Result<Option<Message>> {
        self.polls.pop_front().unwrap_or(Ok(None))
    }

    async fn reset(&mut self) -> Result<()> {
        self.commands.push(Command::Reset);
        Ok(())
    }

    async fn start(&mut self) -> Result<()> {
        self.commands.push(Command::Start);
        Ok(())
    }

    async fn clrpos(&mut self) -> Result<()> {
        self.commands.push(Command::ClearPositions);
        Ok(())
    }

    async fn setlap(&mut self, lap: u8) -> Result<()> {
        self.commands.push(Command::SetLap(lap));
        Ok(())
    }
}

/// Result log that keeps lines in memory; clones share the same lines.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryLog {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl ResultLog for MemoryLog {
    fn append(&mut self, line: &str) -> Result<()> {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
        Ok(())
    }
}

/// Remote store that is never reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStore;

#[async_trait]
impl RemoteStore for FailingStore {
    async fn put(&self, key: &str, _fields: &Fields) -> Result<()> {
        Err(RaceError::remote_failed(format!("store offline, {} not written", key)))
    }
}

/// Remote store whose puts never complete.
#[derive(Debug, Clone, Copy, Default)]
pub struct PendingStore;

#[async_trait]
impl RemoteStore for PendingStore {
    async fn put(&self, _key: &str, _fields: &Fields) -> Result<()> {
        std::future::pending().await
    }
}
