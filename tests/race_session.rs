//! End-to-end race sessions: replayed control unit, headless screen,
//! results on disk.

use lanetimer::control_unit::Command;
use lanetimer::persist::{KeyedDirStore, LocalLog, RemoteConfig, ResultPersister, top_results};
use lanetimer::terminal::ScreenBuffer;
use lanetimer::{
    Dispatcher, RaceConfig, RankingPolicy, ReplayControlUnit, ReplayScript, StopReason,
};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

const SESSION: &str = r#"
version: "5337"
messages:
  - kind: status
    start: 0
  - kind: timer
    address: 0
    timestamp: 1000
  - kind: timer
    address: 1
    timestamp: 1200
  - kind: timer
    address: 0
    timestamp: 5000
  - kind: timer
    address: 0
    timestamp: 5000
  - kind: timer
    address: 1
    timestamp: 5600
  - kind: unknown
    raw: "?:1234"
  - kind: timer
    address: 0
    timestamp: 9000
  - kind: timer
    address: 1
    timestamp: 9900
"#;

fn config(ranking: RankingPolicy, dir: &std::path::Path) -> RaceConfig {
    let mut config = RaceConfig {
        lap_target: 2,
        lanes: 2,
        drivers: BTreeMap::from([(0, "Alice".to_string())]),
        ranking,
        auto_stop: true,
        poll_timeout: 1,
        settle_delay: 0,
        ..RaceConfig::default()
    };
    config.results.local_path = dir.join("results.jsonl");
    config
}

fn replay() -> ReplayControlUnit {
    ReplayControlUnit::from_script(ReplayScript::parse(SESSION).unwrap())
}

#[tokio::test]
async fn race_runs_to_completion() {
    let _ = tracing_subscriber::fmt::try_init();
    let dir = tempfile::tempdir().unwrap();
    let config = config(RankingPolicy::ProgressFirst, dir.path());

    let remote = RemoteConfig { location: dir.path().join("store"), ..RemoteConfig::default() };
    let store = KeyedDirStore::connect(&remote).await.unwrap();
    let persister =
        ResultPersister::with_remote(LocalLog::new(&config.results.local_path), store);

    let mut race =
        Dispatcher::new(&config, replay(), ScreenBuffer::new(12, 80), persister).unwrap();
    let feed = race.feed();

    let reason = race.run(&CancellationToken::new()).await.unwrap();
    assert_eq!(reason, StopReason::AllFinished);

    assert_eq!(
        race.control_unit().commands(),
        &[
            Command::Reset,
            Command::ClearPositions,
            Command::SetLap(1),
            Command::SetLap(2),
            Command::Reset
        ]
    );

    let board = feed.current();
    assert_eq!(board.max_lap, 2);
    let names: Vec<_> = board.standings.iter().map(|s| s.name.clone()).collect();
    assert_eq!(names, vec![Some("Alice".to_string()), None]);
    assert_eq!(board.standings[0].time, "0:08.000");
    assert_eq!(board.standings[1].time, "+0.900s");
    assert!(board.standings.iter().all(|s| s.finished));

    let screen = race.terminal();
    assert!(screen.row_text(1).contains("Alice"));
    assert!(screen.row_text(2).ends_with("FINISHED"));

    let local = LocalLog::read_all(&config.results.local_path).unwrap();
    assert_eq!(local.len(), 2);
    let reconnected = KeyedDirStore::connect(&remote).await.unwrap();
    assert_eq!(reconnected.records().await.unwrap().len(), 2);

    let top = top_results(local, 10);
    assert_eq!(top[0].driver_name, "Alice");
    assert_eq!(top[0].best_lap, Some(4_000));
    assert_eq!(top[1].driver_name, "Car #2");
    assert_eq!(top[1].best_lap, Some(4_300));
}

#[tokio::test]
async fn time_trial_ranks_by_best_lap() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(RankingPolicy::BestLapFirst, dir.path());
    let persister = ResultPersister::local_only(LocalLog::new(&config.results.local_path));

    let mut race =
        Dispatcher::new(&config, replay(), ScreenBuffer::new(12, 80), persister).unwrap();
    race.run(&CancellationToken::new()).await.unwrap();

    let board = race.snapshot();
    assert_eq!(board.standings[0].lane, 0);
    assert_eq!(board.standings[0].time, "4.000");
    assert_eq!(board.standings[1].time, "4.300");
}

#[tokio::test]
async fn cancelled_session_keeps_partial_state() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(RankingPolicy::ProgressFirst, dir.path());
    let persister = ResultPersister::local_only(LocalLog::new(&config.results.local_path));
    let cu = ReplayControlUnit::from_script(ReplayScript {
        wait_for_start: true,
        ..ReplayScript::parse(SESSION).unwrap()
    });

    let mut race = Dispatcher::new(&config, cu, ScreenBuffer::new(12, 80), persister).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    assert_eq!(race.run(&cancel).await.unwrap(), StopReason::Cancelled);
    assert!(race.snapshot().standings.is_empty());
    assert_eq!(race.control_unit().remaining(), 9);
    assert!(!config.results.local_path.exists());
}
