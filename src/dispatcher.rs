//! Single-threaded race loop
//!
//! Each iteration renders the leaderboard, handles one key, then takes at most
//! one message from the control unit. Nothing here blocks: both ports return
//! `None` when idle, and the only sleeps are the idle pause and the settle
//! delay between hardware reset and start.
//!
//! Whatever way the loop ends (quit, cancellation, error or panic) the control
//! unit is sent a reset before [`Dispatcher::run`] returns.

use chrono::Utc;
use futures::{FutureExt, Stream};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::config::{LanePolicy, RaceConfig};
use crate::control_unit::{ControlUnit, lap_counter_value};
use crate::driver::Roster;
use crate::leaderboard::{Leaderboard, LeaderboardSnapshot};
use crate::persist::{RemoteWrite, ResultPersister, ResultRecord};
use crate::render::render;
use crate::terminal::{Key, Terminal};
use crate::timing::{LapTimer, RaceClock};
use crate::types::{Message, Timer, blink_on};
use crate::{RaceError, Result};

/// Interrupted polls retried within one iteration; past this the port counts as idle.
const MAX_INTERRUPTS: u32 = 8;

/// Messages discarded while waiting for a status report during reset.
const MAX_DRAIN: usize = 256;

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Quit key pressed
    Quit,
    /// Every participant finished and auto-stop is on
    AllFinished,
    /// Cancellation token fired
    Cancelled,
}

/// Outcome of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A key or message was handled
    Busy,
    /// Both ports were idle
    Idle,
    Stop(StopReason),
}

/// Read-only view of the leaderboard as the dispatcher renders it.
#[derive(Debug, Clone)]
pub struct LeaderboardFeed {
    snapshots: watch::Receiver<Arc<LeaderboardSnapshot>>,
}

impl LeaderboardFeed {
    /// Snapshot stream; yields the current snapshot first, then every change.
    pub fn updates(&self) -> impl Stream<Item = Arc<LeaderboardSnapshot>> + 'static {
        WatchStream::new(self.snapshots.clone())
    }

    pub fn current(&self) -> Arc<LeaderboardSnapshot> {
        self.snapshots.borrow().clone()
    }
}

/// Owns all race state and the ports it is driven through.
pub struct Dispatcher<C, T> {
    cu: C,
    terminal: T,
    persister: ResultPersister,
    roster: Roster,
    timer: LapTimer,
    clock: RaceClock,
    board: Leaderboard,
    lane_policy: LanePolicy,
    auto_stop: bool,
    poll_interval: Duration,
    settle_delay: Duration,
    feed: watch::Sender<Arc<LeaderboardSnapshot>>,
}

impl<C, T> Dispatcher<C, T>
where
    C: ControlUnit,
    T: Terminal,
{
    pub fn new(
        config: &RaceConfig,
        cu: C,
        terminal: T,
        persister: ResultPersister,
    ) -> Result<Self> {
        config.validate()?;
        let roster = Roster::new(config.lanes, &config.drivers)?;
        let (feed, _) = watch::channel(Arc::new(LeaderboardSnapshot::default()));

        Ok(Self {
            cu,
            terminal,
            persister,
            roster,
            timer: LapTimer::new(config.lap_target),
            clock: RaceClock::new(),
            board: Leaderboard::new(config.ranking, config.lap_target),
            lane_policy: config.lane_policy,
            auto_stop: config.auto_stop,
            poll_interval: config.poll_interval(),
            settle_delay: config.settle_delay(),
            feed,
        })
    }

    pub fn feed(&self) -> LeaderboardFeed {
        LeaderboardFeed { snapshots: self.feed.subscribe() }
    }

    pub fn snapshot(&self) -> LeaderboardSnapshot {
        LeaderboardSnapshot {
            standings: self.board.rank(self.roster.drivers(), self.clock.start()),
            max_lap: self.clock.max_lap(),
            lap_target: self.timer.lap_target(),
            status: self.clock.status().clone(),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn clock(&self) -> &RaceClock {
        &self.clock
    }

    pub fn control_unit(&self) -> &C {
        &self.cu
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }

    /// Run until quit, cancellation, auto-stop or a fatal error.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<StopReason> {
        let outcome = AssertUnwindSafe(self.run_loop(cancel)).catch_unwind().await;
        self.release().await;

        match outcome {
            Ok(Ok(reason)) => {
                info!(?reason, "Race loop stopped");
                Ok(reason)
            }
            Ok(Err(e)) => {
                error!("Race loop failed: {}", e);
                Err(e)
            }
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    async fn run_loop(&mut self, cancel: &CancellationToken) -> Result<StopReason> {
        self.reset().await?;
        loop {
            if cancel.is_cancelled() {
                return Ok(StopReason::Cancelled);
            }
            let step = match self.step().await {
                Ok(step) => step,
                Err(e) if !e.is_fatal() => {
                    warn!("Recovered from error, race continues: {}", e);
                    Step::Idle
                }
                Err(e) => return Err(e),
            };
            match step {
                Step::Stop(reason) => return Ok(reason),
                Step::Busy => tokio::task::yield_now().await,
                Step::Idle => {
                    tokio::select! {
                        _ = cancel.cancelled() => return Ok(StopReason::Cancelled),
                        _ = tokio::time::sleep(self.poll_interval) => {}
                    }
                }
            }
        }
    }

    /// One loop iteration: render, handle a key, handle a message.
    pub async fn step(&mut self) -> Result<Step> {
        self.render()?;

        let mut busy = false;
        if let Some(key) = self.read_key()? {
            busy = true;
            match key {
                Key::Quit => return Ok(Step::Stop(StopReason::Quit)),
                Key::Start => self.start_race().await?,
                Key::Reset => self.reset().await?,
                Key::Other(c) => trace!(key = %c, "Key ignored"),
            }
        }

        if let Some(message) = self.poll_message().await? {
            busy = true;
            if self.clock.is_repeat(&message) {
                trace!("Duplicate {} message discarded", message.kind());
            } else {
                self.clock.remember(message.clone());
                self.dispatch(message).await?;
            }
        }

        if self.auto_stop && self.roster.all_finished(self.timer.lap_target()) {
            self.render()?;
            return Ok(Step::Stop(StopReason::AllFinished));
        }

        Ok(if busy { Step::Busy } else { Step::Idle })
    }

    fn render(&mut self) -> Result<()> {
        let snapshot = self.snapshot();
        render(&mut self.terminal, &snapshot, blink_on(SystemTime::now()))?;
        self.feed.send_if_modified(|current| {
            if **current == snapshot {
                false
            } else {
                *current = Arc::new(snapshot);
                true
            }
        });
        Ok(())
    }

    fn read_key(&mut self) -> Result<Option<Key>> {
        let mut interrupts = 0;
        loop {
            match self.terminal.read_key() {
                Err(e) if e.is_interrupted() => {
                    interrupts += 1;
                    if interrupts > MAX_INTERRUPTS {
                        debug!(interrupts, "Key read kept being interrupted, no key this time");
                        return Ok(None);
                    }
                    trace!(interrupts, "Key read interrupted, retrying");
                }
                other => return other,
            }
        }
    }

    async fn poll_message(&mut self) -> Result<Option<Message>> {
        let mut interrupts = 0;
        loop {
            match self.cu.request().await {
                Err(e) if e.is_interrupted() => {
                    interrupts += 1;
                    if interrupts > MAX_INTERRUPTS {
                        debug!(interrupts, "Control unit poll kept being interrupted, no data");
                        return Ok(None);
                    }
                    trace!(interrupts, "Control unit poll interrupted, retrying");
                }
                other => return other,
            }
        }
    }

    async fn dispatch(&mut self, message: Message) -> Result<()> {
        match message {
            Message::Status(status) => self.clock.on_status(status),
            Message::Timer(timer) => self.on_timer(timer).await?,
            Message::Unknown { raw } => warn!(raw = %raw, "Unknown data from control unit"),
        }
        Ok(())
    }

    async fn on_timer(&mut self, timer: Timer) -> Result<()> {
        let lanes = self.roster.len();
        let Some(driver) = self.roster.get_mut(timer.address) else {
            return match self.lane_policy {
                LanePolicy::Ignore => {
                    warn!(lane = timer.address, lanes, "Crossing on unknown lane dropped");
                    Ok(())
                }
                LanePolicy::Reject => Err(RaceError::LaneOutOfRange { lane: timer.address, lanes }),
            };
        };

        let crossing = self.timer.record_crossing(driver, timer.timestamp);
        if !crossing.changed() {
            return Ok(());
        }

        let max_lap = self.clock.on_timing(&timer, driver);
        let record = crossing
            .is_finish()
            .then(|| ResultRecord::from_driver(driver, self.clock.start(), Utc::now()));

        if let Some(max_lap) = max_lap {
            match lap_counter_value(max_lap) {
                Ok(lap) => self.cu.setlap(lap).await?,
                Err(e) => warn!("Lap counter not updated: {}", e),
            }
        }

        if let Some(record) = record {
            if let RemoteWrite::Failed(reason) = self.persister.persist(&record).await? {
                debug!(driver = %record.driver_name, "Result kept locally only: {}", reason);
            }
        }
        Ok(())
    }

    /// Clear timing state and put the control unit back to its idle state.
    ///
    /// Pending crossings are discarded up to the first status report, which
    /// becomes the current status.
    pub async fn reset(&mut self) -> Result<()> {
        info!("Resetting race");
        self.roster.reset();
        self.clock.reset();

        for _ in 0..MAX_DRAIN {
            match self.poll_message().await? {
                Some(Message::Status(status)) => {
                    self.clock.on_status(status);
                    break;
                }
                Some(other) => trace!("Discarding pending {} message", other.kind()),
                None => break,
            }
        }

        self.cu.reset().await?;
        self.cu.clrpos().await?;
        Ok(())
    }

    /// Reset, let the hardware settle, then start the light sequence.
    pub async fn start_race(&mut self) -> Result<()> {
        self.reset().await?;
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        self.cu.start().await?;
        info!(lap_target = self.timer.lap_target(), "Race started");
        Ok(())
    }

    async fn release(&mut self) {
        match self.cu.reset().await {
            Ok(()) => debug!("Control unit reset on exit"),
            Err(e) => error!("Control unit reset on exit failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_unit::Command;
    use crate::leaderboard::RankingPolicy;
    use crate::persist::{LocalLog, MemoryStore};
    use crate::terminal::ScreenBuffer;
    use crate::test_utils::{FailingStore, MemoryLog, ScriptedControlUnit};
    use crate::types::Status;
    use futures::StreamExt;
    use std::io::ErrorKind;

    fn config(lap_target: u32) -> RaceConfig {
        RaceConfig {
            lap_target,
            lanes: 2,
            poll_timeout: 1,
            settle_delay: 0,
            ..RaceConfig::default()
        }
    }

    fn dispatcher(
        config: &RaceConfig,
        cu: ScriptedControlUnit,
        log: &MemoryLog,
    ) -> Dispatcher<ScriptedControlUnit, ScreenBuffer> {
        let persister = ResultPersister::local_only(log.clone());
        Dispatcher::new(config, cu, ScreenBuffer::new(10, 90), persister).unwrap()
    }

    async fn step_until_idle(d: &mut Dispatcher<ScriptedControlUnit, ScreenBuffer>) {
        for _ in 0..100 {
            if d.step().await.unwrap() == Step::Idle {
                return;
            }
        }
        panic!("dispatcher never went idle");
    }

    #[tokio::test]
    async fn repeated_message_applies_once() {
        let cu = ScriptedControlUnit::with_messages([
            Message::from(Timer::new(0, 0)),
            Message::from(Timer::new(0, 1_000)),
            Message::from(Timer::new(0, 1_000)),
            Message::from(Timer::new(0, 2_500)),
        ]);
        let log = MemoryLog::default();
        let mut d = dispatcher(&config(5), cu, &log);
        step_until_idle(&mut d).await;

        let driver = d.roster().get(0).unwrap();
        assert_eq!(driver.laps(), &[1_000, 1_500]);
        assert_eq!(d.clock().start(), Some(0));
        assert_eq!(d.clock().max_lap(), 2);
        assert_eq!(
            d.control_unit().commands(),
            vec![Command::SetLap(1), Command::SetLap(2)]
        );
    }

    #[tokio::test]
    async fn status_updates_replace_each_other() {
        let cu = ScriptedControlUnit::with_messages([
            Message::from(Status::with_phase(1)),
            Message::from(Status::with_phase(1)),
            Message::from(Status::with_phase(4)),
        ]);
        let log = MemoryLog::default();
        let mut d = dispatcher(&config(3), cu, &log);
        step_until_idle(&mut d).await;
        assert_eq!(d.clock().status().start, 4);
    }

    #[tokio::test]
    async fn unknown_and_foreign_lanes_are_dropped() {
        let _ = tracing_subscriber::fmt::try_init();
        let cu = ScriptedControlUnit::with_messages([
            Message::Unknown { raw: "?x".to_string() },
            Message::from(Timer::new(6, 100)),
            Message::from(Timer::new(1, 200)),
        ]);
        let log = MemoryLog::default();
        let mut d = dispatcher(&config(3), cu, &log);
        step_until_idle(&mut d).await;
        assert_eq!(d.clock().start(), Some(200));
        assert_eq!(d.roster().get(1).unwrap().last_crossing(), Some(200));
    }

    #[tokio::test]
    async fn foreign_lane_rejected_by_policy() {
        let cu = ScriptedControlUnit::with_messages([Message::from(Timer::new(6, 100))]);
        let log = MemoryLog::default();
        let config = RaceConfig { lane_policy: LanePolicy::Reject, ..config(3) };
        let mut d = dispatcher(&config, cu, &log);
        let err = d.step().await.unwrap_err();
        assert!(matches!(err, RaceError::LaneOutOfRange { lane: 6, lanes: 2 }));
    }

    #[tokio::test]
    async fn interrupted_poll_is_retried_in_the_same_step() {
        let mut cu = ScriptedControlUnit::default();
        cu.push_error(ErrorKind::Interrupted);
        cu.push_error(ErrorKind::Interrupted);
        cu.push_message(Message::from(Timer::new(0, 50)));
        let log = MemoryLog::default();
        let mut d = dispatcher(&config(3), cu, &log);

        assert_eq!(d.step().await.unwrap(), Step::Busy);
        assert_eq!(d.roster().get(0).unwrap().last_crossing(), Some(50));
    }

    #[tokio::test]
    async fn persistent_interrupts_never_end_the_race() {
        let mut cu = ScriptedControlUnit::default();
        for _ in 0..20 {
            cu.push_error(ErrorKind::Interrupted);
        }
        cu.push_message(Message::from(Timer::new(0, 50)));
        let log = MemoryLog::default();
        let mut d = dispatcher(&config(3), cu, &log);

        assert_eq!(d.step().await.unwrap(), Step::Idle);
        assert_eq!(d.step().await.unwrap(), Step::Idle);
        assert_eq!(d.step().await.unwrap(), Step::Busy);
        assert_eq!(d.roster().get(0).unwrap().last_crossing(), Some(50));
    }

    #[tokio::test]
    async fn recoverable_error_keeps_the_loop_running() {
        let _ = tracing_subscriber::fmt::try_init();
        let mut cu = ScriptedControlUnit::with_messages([Message::from(Status::with_phase(0))]);
        cu.push_failure(RaceError::LapCounterRange { value: 300 });
        cu.push_message(Message::from(Timer::new(1, 700)));
        let log = MemoryLog::default();
        let mut d = dispatcher(&config(3), cu, &log);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            trigger.cancel();
        });

        assert_eq!(d.run(&cancel).await.unwrap(), StopReason::Cancelled);
        assert_eq!(d.roster().get(1).unwrap().last_crossing(), Some(700));
    }

    /// Terminal whose keyboard blows up on first read.
    struct PanickingTerminal;

    impl Terminal for PanickingTerminal {
        fn size(&self) -> (usize, usize) {
            (0, 0)
        }

        fn clear(&mut self) {}

        fn draw(&mut self, _row: usize, _col: usize, _text: &str, _attr: crate::terminal::Attr) {}

        fn refresh(&mut self) -> Result<()> {
            Ok(())
        }

        fn read_key(&mut self) -> Result<Option<Key>> {
            panic!("keyboard driver crashed");
        }
    }

    #[tokio::test]
    async fn panic_still_resets_hardware() {
        let cu = ScriptedControlUnit::with_messages([Message::from(Status::with_phase(0))]);
        let persister = ResultPersister::local_only(MemoryLog::default());
        let mut d = Dispatcher::new(&config(3), cu, PanickingTerminal, persister).unwrap();

        let outcome = AssertUnwindSafe(d.run(&CancellationToken::new())).catch_unwind().await;
        assert!(outcome.is_err());
        assert_eq!(
            d.control_unit().commands(),
            vec![Command::Reset, Command::ClearPositions, Command::Reset]
        );
    }

    #[tokio::test]
    async fn quit_key_stops_and_resets_hardware() {
        let cu = ScriptedControlUnit::with_messages([Message::from(Status::with_phase(0))]);
        let log = MemoryLog::default();
        let mut d = dispatcher(&config(3), cu, &log);
        d.terminal_mut().push_key(Key::Quit);

        let reason = d.run(&CancellationToken::new()).await.unwrap();
        assert_eq!(reason, StopReason::Quit);
        assert_eq!(
            d.control_unit().commands(),
            vec![Command::Reset, Command::ClearPositions, Command::Reset]
        );
        assert!(d.terminal().row_text(0).starts_with("Pos No"));
    }

    #[tokio::test]
    async fn fatal_poll_error_still_resets_hardware() {
        let mut cu = ScriptedControlUnit::with_messages([Message::from(Status::with_phase(0))]);
        cu.push_error(ErrorKind::BrokenPipe);
        let log = MemoryLog::default();
        let mut d = dispatcher(&config(3), cu, &log);

        let err = d.run(&CancellationToken::new()).await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(d.control_unit().commands().last(), Some(&Command::Reset));
    }

    #[tokio::test]
    async fn cancellation_stops_an_idle_loop() {
        let log = MemoryLog::default();
        let mut d = dispatcher(&config(3), ScriptedControlUnit::default(), &log);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        assert_eq!(d.run(&cancel).await.unwrap(), StopReason::Cancelled);
        assert_eq!(d.control_unit().commands().last(), Some(&Command::Reset));
    }

    #[tokio::test]
    async fn reset_discards_pending_crossings_up_to_status() {
        let cu = ScriptedControlUnit::with_messages([
            Message::from(Timer::new(0, 10)),
            Message::from(Timer::new(1, 20)),
            Message::from(Status::with_phase(7)),
            Message::from(Timer::new(0, 5_000)),
        ]);
        let log = MemoryLog::default();
        let mut d = dispatcher(&config(3), cu, &log);
        d.reset().await.unwrap();

        assert_eq!(d.clock().status().start, 7);
        assert_eq!(d.control_unit().pending(), 1);
        assert_eq!(d.control_unit().commands(), vec![Command::Reset, Command::ClearPositions]);

        d.step().await.unwrap();
        assert_eq!(d.clock().start(), Some(5_000));
    }

    #[tokio::test]
    async fn start_key_resets_then_starts() {
        let cu = ScriptedControlUnit::with_messages([
            Message::from(Timer::new(0, 0)),
            Message::from(Timer::new(0, 900)),
        ]);
        let log = MemoryLog::default();
        let mut d = dispatcher(&config(3), cu, &log);
        d.step().await.unwrap();
        d.step().await.unwrap();
        assert_eq!(d.roster().get(0).unwrap().finished_laps(), 1);

        d.terminal_mut().push_key(Key::Start);
        d.step().await.unwrap();
        assert_eq!(d.roster().get(0).unwrap().finished_laps(), 0);
        assert_eq!(d.clock().max_lap(), 0);
        assert_eq!(
            d.control_unit().commands(),
            vec![Command::SetLap(1), Command::Reset, Command::ClearPositions, Command::Start]
        );
    }

    #[tokio::test]
    async fn finish_is_persisted_and_auto_stop_fires() {
        let cu = ScriptedControlUnit::with_messages([
            Message::from(Status::with_phase(0)),
            Message::from(Timer::new(0, 0)),
            Message::from(Timer::new(0, 4_000)),
            Message::from(Timer::new(0, 8_000)),
            Message::from(Timer::new(0, 12_000)),
        ]);
        let log = MemoryLog::default();
        let config = RaceConfig { auto_stop: true, ..config(2) };
        let mut d = dispatcher(&config, cu, &log);

        let reason = d.run(&CancellationToken::new()).await.unwrap();
        assert_eq!(reason, StopReason::AllFinished);

        let lines = log.lines();
        assert_eq!(lines.len(), 1);
        let record: ResultRecord = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(record.driver_name, "Car #1");
        assert_eq!(record.best_lap, Some(4_000));
        assert_eq!(record.laps, 2);
        assert_eq!(d.control_unit().pending(), 1);
    }

    #[tokio::test]
    async fn remote_failure_does_not_stop_the_race() {
        let _ = tracing_subscriber::fmt::try_init();
        let cu = ScriptedControlUnit::with_messages([
            Message::from(Timer::new(0, 0)),
            Message::from(Timer::new(0, 3_000)),
            Message::from(Timer::new(1, 3_100)),
        ]);
        let log = MemoryLog::default();
        let persister = ResultPersister::with_remote(log.clone(), FailingStore);
        let mut d =
            Dispatcher::new(&config(1), cu, ScreenBuffer::new(10, 90), persister).unwrap();

        step_until_idle(&mut d).await;
        assert_eq!(log.lines().len(), 1);
        assert_eq!(d.roster().get(1).unwrap().last_crossing(), Some(3_100));
    }

    #[tokio::test]
    async fn remote_copy_is_written_on_finish() {
        let cu = ScriptedControlUnit::with_messages([
            Message::from(Timer::new(1, 0)),
            Message::from(Timer::new(1, 3_000)),
        ]);
        let log = MemoryLog::default();
        let store = Arc::new(MemoryStore::new());
        let persister = ResultPersister::with_remote(log.clone(), store.clone());
        let config = RaceConfig { drivers: [(1, "Bea".to_string())].into(), ..config(1) };
        let mut d = Dispatcher::new(&config, cu, ScreenBuffer::new(10, 90), persister).unwrap();

        step_until_idle(&mut d).await;
        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].driver_name, "Bea");
    }

    #[tokio::test]
    async fn local_log_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cu = ScriptedControlUnit::with_messages([
            Message::from(Status::with_phase(0)),
            Message::from(Timer::new(0, 0)),
            Message::from(Timer::new(0, 3_000)),
        ]);
        let persister =
            ResultPersister::local_only(LocalLog::new(dir.path().join("missing").join("r.log")));
        let mut d =
            Dispatcher::new(&config(1), cu, ScreenBuffer::new(10, 90), persister).unwrap();

        let err = d.run(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, RaceError::LocalLog { .. }));
        assert_eq!(d.control_unit().commands().last(), Some(&Command::Reset));
    }

    #[tokio::test]
    async fn feed_follows_the_rendered_leaderboard() {
        let cu = ScriptedControlUnit::with_messages([
            Message::from(Timer::new(0, 0)),
            Message::from(Timer::new(1, 100)),
            Message::from(Timer::new(1, 4_100)),
        ]);
        let log = MemoryLog::default();
        let config = RaceConfig { ranking: RankingPolicy::ProgressFirst, ..config(5) };
        let mut d = dispatcher(&config, cu, &log);
        let feed = d.feed();
        let mut updates = Box::pin(feed.updates());

        assert!(updates.next().await.unwrap().standings.is_empty());

        step_until_idle(&mut d).await;
        let current = feed.current();
        assert_eq!(current.standings.len(), 2);
        assert_eq!(current.standings[0].lane, 1);
        assert_eq!(current.max_lap, 1);
        assert_eq!(*updates.next().await.unwrap(), *current);
    }
}
