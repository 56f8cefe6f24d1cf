//! Error types for race timing.
//!
//! All errors implement `std::error::Error` and carry enough context to decide
//! how the dispatch loop should react to them.
//!
//! ## Error Categories
//!
//! - **Port Errors**: I/O failures while polling the control unit or the terminal
//! - **Persistence Errors**: local result log and remote store failures
//! - **Configuration Errors**: invalid race setup or replay scripts
//! - **Range Errors**: lane addresses or lap counter values the hardware cannot take
//!
//! ## Classification
//!
//! ```rust
//! use lanetimer::RaceError;
//!
//! let interrupted = std::io::Error::from(std::io::ErrorKind::Interrupted);
//! let error = RaceError::from(interrupted);
//! assert!(error.is_interrupted());
//! assert!(!error.is_fatal());
//!
//! let remote = RaceError::remote_failed("store unreachable");
//! assert!(!remote.is_fatal());
//! for suggestion in remote.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for race operations.
pub type Result<T, E = RaceError> = std::result::Result<T, E>;

/// Main error type for race operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RaceError {
    #[error("I/O error on {port}")]
    Io {
        port: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write result log {path}")]
    LocalLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Remote result store error: {reason}")]
    Remote {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Parse error in {context}: {details}")]
    Script { context: String, details: String },

    #[error("Lane {lane} is outside the configured roster of {lanes} lanes")]
    LaneOutOfRange { lane: u8, lanes: usize },

    #[error("Lap counter value {value} out of range (0-255)")]
    LapCounterRange { value: u32 },

    #[error("Failed to encode result record")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },
}

impl RaceError {
    /// Returns whether this error is an interrupted system call that should be
    /// retried within the same loop iteration.
    pub fn is_interrupted(&self) -> bool {
        matches!(
            self,
            RaceError::Io { source, .. } if source.kind() == std::io::ErrorKind::Interrupted
        )
    }

    /// Returns whether this error must terminate the dispatch loop.
    pub fn is_fatal(&self) -> bool {
        match self {
            RaceError::Io { .. } => !self.is_interrupted(),
            RaceError::LocalLog { .. } => true,
            RaceError::Remote { .. } => false,
            RaceError::Config { .. } => true,
            RaceError::Script { .. } => true,
            RaceError::LaneOutOfRange { .. } => true,
            RaceError::LapCounterRange { .. } => false,
            RaceError::Serialization { .. } => true,
        }
    }

    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            RaceError::Io { .. } => self.is_interrupted(),
            RaceError::Remote { .. } => true,
            RaceError::LocalLog { .. } => false,
            RaceError::Config { .. } => false,
            RaceError::Script { .. } => false,
            RaceError::LaneOutOfRange { .. } => false,
            RaceError::LapCounterRange { .. } => false,
            RaceError::Serialization { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            RaceError::Io { .. } => vec![
                "Check the control unit connection",
                "Verify the device path is correct",
                "Power cycle the control unit",
            ],
            RaceError::LocalLog { .. } => vec![
                "Check the result log directory exists",
                "Check file permissions on the result log",
                "Ensure sufficient disk space",
            ],
            RaceError::Remote { .. } => vec![
                "Check connectivity to the result store",
                "Verify the store credential reference",
                "Results remain available in the local log",
            ],
            RaceError::Config { .. } => vec![
                "Check the configuration file syntax",
                "Compare settings against the documented defaults",
            ],
            RaceError::Script { .. } => vec![
                "Check the replay script syntax",
                "Verify every entry has a valid kind",
            ],
            RaceError::LaneOutOfRange { .. } => vec![
                "Increase the configured lane count",
                "Switch the lane policy to ignore",
            ],
            RaceError::LapCounterRange { .. } => vec![
                "Lower the lap target below 256",
                "Disable the hardware lap counter display",
            ],
            RaceError::Serialization { .. } => vec![
                "Check driver names for unsupported characters",
                "Report the record that failed to encode",
            ],
        }
    }

    /// Helper constructor for port I/O errors.
    pub fn port_error(port: impl Into<String>, source: std::io::Error) -> Self {
        RaceError::Io { port: port.into(), source }
    }

    /// Helper constructor for local result log errors with path context.
    pub fn local_log_error(path: PathBuf, source: std::io::Error) -> Self {
        RaceError::LocalLog { path, source }
    }

    /// Helper constructor for remote store errors.
    pub fn remote_failed(reason: impl Into<String>) -> Self {
        RaceError::Remote { reason: reason.into(), source: None }
    }

    /// Helper constructor for remote store errors with source.
    pub fn remote_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        RaceError::Remote { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for configuration errors.
    pub fn config_invalid(reason: impl Into<String>) -> Self {
        RaceError::Config { reason: reason.into() }
    }
}

impl From<std::io::Error> for RaceError {
    fn from(err: std::io::Error) -> Self {
        RaceError::Io { port: "<unknown>".to_string(), source: err }
    }
}

impl From<serde_json::Error> for RaceError {
    fn from(err: serde_json::Error) -> Self {
        RaceError::Serialization { source: err }
    }
}
