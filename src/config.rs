//! Race configuration
//!
//! Loaded from YAML, then overridden by command line flags in the binary.
//! Every field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::leaderboard::RankingPolicy;
use crate::persist::RemoteConfig;
use crate::types::{Lane, MAX_LANES};
use crate::{RaceError, Result};

/// Idle polls never wait longer than this, so the start lights keep blinking.
const MAX_IDLE_PAUSE: Duration = Duration::from_millis(250);

/// What to do with a crossing reported for a lane outside the roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanePolicy {
    /// Log a warning and drop the crossing
    #[default]
    Ignore,
    /// Stop the race with [`RaceError::LaneOutOfRange`]
    Reject,
}

/// Where finished results go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultsConfig {
    /// Local append-only log, one JSON record per line
    pub local_path: PathBuf,
    /// Remote keyed store; results stay local-only when unset
    pub remote: Option<RemoteConfig>,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self { local_path: PathBuf::from("results.jsonl"), remote: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// Control unit to open (a replay script path)
    pub device: Option<PathBuf>,
    /// Laps a driver must complete to finish
    pub lap_target: u32,
    /// Poll timeout in milliseconds
    pub poll_timeout: u64,
    pub log_file: PathBuf,
    pub verbose: bool,
    /// Roster size
    pub lanes: usize,
    /// Registered driver names by lane
    pub drivers: BTreeMap<Lane, String>,
    pub ranking: RankingPolicy,
    /// Stop once every participant has finished
    pub auto_stop: bool,
    pub lane_policy: LanePolicy,
    pub results: ResultsConfig,
    /// Pause between hardware reset and start, in milliseconds
    pub settle_delay: u64,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            device: None,
            lap_target: 3,
            poll_timeout: 1000,
            log_file: PathBuf::from("lanetimer.log"),
            verbose: false,
            lanes: MAX_LANES,
            drivers: BTreeMap::new(),
            ranking: RankingPolicy::default(),
            auto_stop: false,
            lane_policy: LanePolicy::default(),
            results: ResultsConfig::default(),
            settle_delay: 500,
        }
    }
}

impl RaceConfig {
    /// Parse and validate a YAML configuration.
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml).map_err(|e| RaceError::Script {
            context: "Race configuration".to_string(),
            details: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            RaceError::config_invalid(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::parse(&yaml)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lap_target == 0 {
            return Err(RaceError::config_invalid("lap_target must be at least 1"));
        }
        if self.lanes == 0 || self.lanes > MAX_LANES {
            return Err(RaceError::config_invalid(format!(
                "lanes must be within 1..={}, got {}",
                MAX_LANES, self.lanes
            )));
        }
        if let Some(lane) = self.drivers.keys().find(|lane| **lane as usize >= self.lanes) {
            return Err(RaceError::config_invalid(format!(
                "driver named for lane {} but only {} lanes configured",
                lane, self.lanes
            )));
        }
        Ok(())
    }

    /// Pause after a poll that found nothing to do.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_timeout).min(MAX_IDLE_PAUSE)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay)
    }
}
