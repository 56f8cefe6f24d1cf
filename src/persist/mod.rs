//! Durable race results.
//!
//! A finishing driver produces one [`ResultRecord`]. [`ResultPersister`]
//! writes it to the local log first; only after that succeeds is the remote
//! store tried, and a remote failure is logged and otherwise ignored.

mod local;
mod remote;
pub mod standings;

pub use local::{LocalLog, ResultLog};
pub use remote::{Fields, KeyedDirStore, MemoryStore, RemoteConfig, RemoteStore};
pub use standings::top_results;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::ResultsConfig;
use crate::driver::Driver;
use crate::types::{Lane, Millis, elapsed};
use crate::{RaceError, Result};

/// Immutable result of one finished driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub driver_name: String,
    pub lane: Lane,
    pub best_lap: Option<Millis>,
    /// Sum of all laps
    pub total_time: Millis,
    /// Finish crossing relative to the race start
    #[serde(default)]
    pub race_time: Option<Millis>,
    pub laps: u32,
    pub completed_at: DateTime<Utc>,
}

impl ResultRecord {
    pub fn from_driver(
        driver: &Driver,
        race_start: Option<Millis>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let race_time = driver.last_crossing().zip(race_start).map(|(t, start)| elapsed(t, start));
        Self {
            driver_name: driver.display_name(),
            lane: driver.lane(),
            best_lap: driver.best_lap(),
            total_time: driver.total_time(),
            race_time,
            laps: driver.finished_laps(),
            completed_at,
        }
    }

    /// Store key: driver name plus completion time.
    pub fn key(&self) -> String {
        format!("{}-{}", self.driver_name, self.completed_at.timestamp_millis())
    }

    pub fn to_fields(&self) -> Result<Fields> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            _ => Err(RaceError::remote_failed("result record did not encode as an object")),
        }
    }
}

/// What happened to the remote copy of a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteWrite {
    Stored,
    /// No remote store configured
    Disabled,
    /// Remote write failed; the local record stands
    Failed(String),
}

/// Writes finished results to the local log and, best effort, the remote store.
pub struct ResultPersister {
    local: Box<dyn ResultLog>,
    remote: Option<Box<dyn RemoteStore>>,
    remote_timeout: Duration,
}

impl ResultPersister {
    pub fn new(local: Box<dyn ResultLog>, remote: Option<Box<dyn RemoteStore>>) -> Self {
        Self { local, remote, remote_timeout: RemoteConfig::default().timeout() }
    }

    pub fn local_only(local: impl ResultLog + 'static) -> Self {
        Self::new(Box::new(local), None)
    }

    pub fn with_remote(
        local: impl ResultLog + 'static,
        remote: impl RemoteStore + 'static,
    ) -> Self {
        Self::new(Box::new(local), Some(Box::new(remote)))
    }

    /// Build from the results section of the race configuration.
    ///
    /// An unreachable remote store downgrades to local-only results.
    pub async fn from_config(results: &ResultsConfig) -> Self {
        let local = LocalLog::new(&results.local_path);
        let Some(remote) = &results.remote else {
            return Self::local_only(local);
        };
        match KeyedDirStore::connect(remote).await {
            Ok(store) => Self::with_remote(local, store).remote_timeout(remote.timeout()),
            Err(e) => {
                warn!("Remote result store unavailable, keeping results local: {}", e);
                Self::local_only(local)
            }
        }
    }

    /// Bound on a single remote put.
    pub fn remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    /// Persist `record`.
    ///
    /// A local log failure is returned as an error. Remote failures never are.
    pub async fn persist(&mut self, record: &ResultRecord) -> Result<RemoteWrite> {
        let line = serde_json::to_string(record)?;
        self.local.append(&line)?;
        info!(driver = %record.driver_name, best_lap = ?record.best_lap, "Result recorded");

        let Some(remote) = &self.remote else {
            return Ok(RemoteWrite::Disabled);
        };

        let key = record.key();
        let outcome = match record.to_fields() {
            Ok(fields) => tokio::time::timeout(self.remote_timeout, remote.put(&key, &fields))
                .await
                .unwrap_or_else(|_| {
                    Err(RaceError::remote_failed(format!(
                        "put timed out after {:?}",
                        self.remote_timeout
                    )))
                }),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(()) => Ok(RemoteWrite::Stored),
            Err(e) => {
                warn!(key = %key, "Remote result write failed, local record kept: {}", e);
                Ok(RemoteWrite::Failed(e.to_string()))
            }
        }
    }
}
