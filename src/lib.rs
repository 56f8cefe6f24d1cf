//! Lap timing and live leaderboard for slot-car lane-timing control units.
//!
//! lanetimer turns the crossings reported by a control unit into lap times, a
//! ranked leaderboard and durable race results.
//!
//! # Features
//!
//! - **Lap timing**: flying-start lap counting per lane, frozen once finished
//! - **Two ranking policies**: race (progress first) and time trial (best lap first)
//! - **Non-blocking loop**: hardware, keyboard and rendering on one thread
//! - **Results**: local JSON log first, remote keyed store best effort
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use lanetimer::{Dispatcher, LocalLog, RaceConfig, ReplayControlUnit, ResultPersister};
//! use lanetimer::terminal::AnsiTerminal;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RaceConfig { lap_target: 5, ..RaceConfig::default() };
//!     let cu = ReplayControlUnit::open("session.yaml")?;
//!     let persister = ResultPersister::local_only(LocalLog::new("results.jsonl"));
//!
//!     let mut race = Dispatcher::new(&config, cu, AnsiTerminal::spawn(24, 80), persister)?;
//!     let reason = race.run(&CancellationToken::new()).await?;
//!     println!("Race ended: {:?}", reason);
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Race state
pub mod driver;
pub mod leaderboard;
pub mod timing;

// Ports and their implementations
pub mod control_unit;
pub mod providers;
pub mod terminal;

// Loop, view and results
pub mod config;
pub mod dispatcher;
pub mod logging;
pub mod persist;
pub mod render;

// Core exports
pub use error::*;
pub use types::*;

pub use config::{LanePolicy, RaceConfig, ResultsConfig};
pub use control_unit::{Command, ControlUnit};
pub use dispatcher::{Dispatcher, LeaderboardFeed, Step, StopReason};
pub use driver::{Driver, Roster};
pub use leaderboard::{Leaderboard, LeaderboardSnapshot, RankingPolicy, Standing, format_time};
pub use persist::{
    KeyedDirStore, LocalLog, MemoryStore, RemoteConfig, RemoteStore, RemoteWrite, ResultLog,
    ResultPersister, ResultRecord,
};
pub use providers::{ReplayControlUnit, ReplayScript};
pub use timing::{Crossing, LapTimer, RaceClock, RaceState};
