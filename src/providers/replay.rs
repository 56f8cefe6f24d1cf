//! Replay control unit for recorded message scripts
//!
//! Stands in for the hardware driver: messages from a YAML script are handed
//! out one per pacing tick, and every command is recorded.

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;
use tokio::time::{Duration, Interval, MissedTickBehavior, interval};
use tracing::{debug, info, trace};

use crate::control_unit::{Command, ControlUnit};
use crate::types::Message;
use crate::{RaceError, Result};

/// A recorded control unit session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayScript {
    /// Version string reported by the replayed unit
    pub version: String,
    /// Milliseconds between messages; 0 hands one out on every poll
    pub pace_ms: u64,
    /// Hold messages back until the start command is issued
    pub wait_for_start: bool,
    pub messages: Vec<Message>,
}

impl ReplayScript {
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| RaceError::Script {
            context: "Replay script".to_string(),
            details: e.to_string(),
        })
    }
}

/// Replay control unit
pub struct ReplayControlUnit {
    version: String,
    pending: VecDeque<Message>,
    pace: Option<Duration>,
    interval: Option<Interval>,
    wait_for_start: bool,
    started: bool,
    commands: Vec<Command>,
}

impl ReplayControlUnit {
    /// Load a replay script from a YAML file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| RaceError::port_error(path.display().to_string(), e))?;
        let script = ReplayScript::parse(&yaml)?;
        info!(
            "Loaded replay script {} ({} messages, {}ms pace)",
            path.display(),
            script.messages.len(),
            script.pace_ms
        );
        Ok(Self::from_script(script))
    }

    pub fn from_script(script: ReplayScript) -> Self {
        let version = if script.version.is_empty() { "replay".to_string() } else { script.version };
        Self {
            version,
            pending: script.messages.into(),
            pace: (script.pace_ms > 0).then(|| Duration::from_millis(script.pace_ms)),
            interval: None,
            wait_for_start: script.wait_for_start,
            started: false,
            commands: Vec::new(),
        }
    }

    /// Unpaced replay of `messages`
    pub fn from_messages(messages: impl IntoIterator<Item = Message>) -> Self {
        Self::from_script(ReplayScript {
            messages: messages.into_iter().collect(),
            ..Default::default()
        })
    }

    /// Commands issued so far, oldest first
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    fn ready(&mut self) -> bool {
        let Some(pace) = self.pace else {
            return true;
        };
        // Created on first poll so construction does not need a runtime
        let interval = self.interval.get_or_insert_with(|| {
            let mut interval = interval(pace);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        interval.tick().now_or_never().is_some()
    }
}

#[async_trait::async_trait]
impl ControlUnit for ReplayControlUnit {
    async fn version(&mut self) -> Result<String> {
        Ok(self.version.clone())
    }

    async fn request(&mut self) -> Result<Option<Message>> {
        if self.pending.is_empty() || (self.wait_for_start && !self.started) || !self.ready() {
            return Ok(None);
        }
        let message = self.pending.pop_front();
        if let Some(message) = &message {
            trace!("Replaying {} message ({} left)", message.kind(), self.pending.len());
        }
        Ok(message)
    }

    async fn reset(&mut self) -> Result<()> {
        debug!("Replay reset");
        self.commands.push(Command::Reset);
        Ok(())
    }

    async fn start(&mut self) -> Result<()> {
        debug!("Replay start");
        self.commands.push(Command::Start);
        self.started = true;
        Ok(())
    }

    async fn clrpos(&mut self) -> Result<()> {
        self.commands.push(Command::ClearPositions);
        Ok(())
    }

    async fn setlap(&mut self, lap: u8) -> Result<()> {
        trace!(lap, "Replay lap counter");
        self.commands.push(Command::SetLap(lap));
        Ok(())
    }
}
