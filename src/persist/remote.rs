//! Remote keyed result store

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

use super::ResultRecord;
use crate::{RaceError, Result};

/// Fields of one stored result.
pub type Fields = Map<String, Value>;

/// Connection settings for the remote store, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Root the keyed documents are stored under
    pub location: PathBuf,
    /// Record kind, the collection results are filed under
    pub kind: String,
    /// Pre-provisioned credential file; must exist when set
    pub credential: Option<PathBuf>,
    /// Longest a single put may take before it is abandoned (milliseconds)
    pub timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            location: PathBuf::from("results"),
            kind: "race_results".to_string(),
            credential: None,
            timeout_ms: 5000,
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Keyed document store for finished results.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn put(&self, key: &str, fields: &Fields) -> Result<()>;
}

/// Store that files each result as a JSON document under `location/kind/`.
#[derive(Debug, Clone)]
pub struct KeyedDirStore {
    root: PathBuf,
}

impl KeyedDirStore {
    /// Check the credential reference and prepare the kind directory.
    pub async fn connect(config: &RemoteConfig) -> Result<Self> {
        if let Some(credential) = &config.credential {
            tokio::fs::metadata(credential).await.map_err(|e| {
                RaceError::remote_failed_with_source(
                    format!("credential {} unavailable", credential.display()),
                    Box::new(e),
                )
            })?;
        }

        let root = config.location.join(&config.kind);
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            RaceError::remote_failed_with_source(
                format!("cannot prepare {}", root.display()),
                Box::new(e),
            )
        })?;
        info!("Result store ready at {}", root.display());
        Ok(Self { root })
    }

    fn document_path(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.root.join(format!("{}.json", file))
    }

    /// Every stored result, in key order.
    pub async fn records(&self) -> Result<Vec<ResultRecord>> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| RaceError::remote_failed_with_source("cannot list results", Box::new(e)))?;

        let mut documents = BTreeMap::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RaceError::remote_failed_with_source("cannot list results", Box::new(e)))?
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let bytes = tokio::fs::read(&path).await.map_err(|e| {
                RaceError::remote_failed_with_source(
                    format!("cannot read {}", path.display()),
                    Box::new(e),
                )
            })?;
            let record: ResultRecord = serde_json::from_slice(&bytes).map_err(|e| {
                RaceError::remote_failed_with_source(
                    format!("malformed {}", path.display()),
                    Box::new(e),
                )
            })?;
            documents.insert(path, record);
        }
        Ok(documents.into_values().collect())
    }
}

#[async_trait]
impl RemoteStore for KeyedDirStore {
    async fn put(&self, key: &str, fields: &Fields) -> Result<()> {
        let path = self.document_path(key);
        let body = serde_json::to_vec_pretty(fields)?;
        tokio::fs::write(&path, body).await.map_err(|e| {
            RaceError::remote_failed_with_source(format!("put {} failed", key), Box::new(e))
        })?;
        debug!("Stored {} at {}", key, path.display());
        Ok(())
    }
}

/// In-process store, for offline races and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<String, Fields>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Fields> {
        self.documents.lock().ok()?.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().map(|docs| docs.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decoded copies of every stored result.
    pub fn records(&self) -> Vec<ResultRecord> {
        let Ok(documents) = self.documents.lock() else {
            return Vec::new();
        };
        documents
            .values()
            .filter_map(|fields| serde_json::from_value(Value::Object(fields.clone())).ok())
            .collect()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn put(&self, key: &str, fields: &Fields) -> Result<()> {
        let mut documents =
            self.documents.lock().map_err(|_| RaceError::remote_failed("store lock poisoned"))?;
        documents.insert(key.to_string(), fields.clone());
        Ok(())
    }
}

#[async_trait]
impl<S: RemoteStore + ?Sized> RemoteStore for std::sync::Arc<S> {
    async fn put(&self, key: &str, fields: &Fields) -> Result<()> {
        (**self).put(key, fields).await
    }
}
