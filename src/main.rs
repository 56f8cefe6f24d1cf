use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use lanetimer::persist::{LocalLog, ResultPersister, top_results};
use lanetimer::terminal::AnsiTerminal;
use lanetimer::{
    ControlUnit, Dispatcher, RaceConfig, RankingPolicy, ReplayControlUnit, format_time,
    leaderboard::TimeFormat, logging,
};

const SCREEN_ROWS: usize = 24;
const SCREEN_COLS: usize = 80;

#[derive(Parser, Debug)]
#[command(name = "lanetimer", version, about = "Slot-car lap timing and leaderboard")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a race against a control unit; keys take effect on ENTER
    Race(RaceArgs),
    /// Print the all-time best laps from the result log
    Results(ResultsArgs),
}

#[derive(Args, Debug)]
struct RaceArgs {
    /// Control unit device (replay script)
    #[arg(value_name = "DEVICE")]
    device: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log file
    #[arg(short = 'l', long = "logfile")]
    log_file: Option<PathBuf>,

    /// Poll timeout in seconds
    #[arg(short, long)]
    timeout: Option<f64>,

    /// Laps to finish
    #[arg(short = 'n', long)]
    laps: Option<u32>,

    /// Rank by best lap (time trial)
    #[arg(long)]
    best_lap: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args, Debug)]
struct ResultsArgs {
    /// Result log to read
    #[arg(long = "log", default_value = "results.jsonl")]
    log: PathBuf,

    /// Number of results to show
    #[arg(short = 'n', long, default_value_t = 10)]
    count: usize,
}

impl RaceArgs {
    fn into_config(self) -> Result<RaceConfig> {
        let mut config = match &self.config {
            Some(path) => RaceConfig::load(path)?,
            None => RaceConfig::default(),
        };
        if let Some(device) = self.device {
            config.device = Some(device);
        }
        if let Some(log_file) = self.log_file {
            config.log_file = log_file;
        }
        if let Some(timeout) = self.timeout {
            if !timeout.is_finite() || timeout < 0.0 {
                bail!("timeout must be a non-negative number of seconds");
            }
            config.poll_timeout = (timeout * 1000.0) as u64;
        }
        if let Some(laps) = self.laps {
            config.lap_target = laps;
        }
        if self.best_lap {
            config.ranking = RankingPolicy::BestLapFirst;
        }
        config.verbose |= self.verbose;
        config.validate()?;
        Ok(config)
    }
}

async fn race(args: RaceArgs) -> Result<()> {
    let config = args.into_config()?;
    let _log_guard = logging::init(&config.log_file, config.verbose)?;

    let device = config.device.clone().context("No control unit device given")?;
    let mut cu = ReplayControlUnit::open(&device)
        .with_context(|| format!("Failed to open control unit {}", device.display()))?;
    println!("CU version {}", cu.version().await?);

    let persister = ResultPersister::from_config(&config.results).await;
    let terminal = AnsiTerminal::spawn(SCREEN_ROWS, SCREEN_COLS);
    let mut dispatcher = Dispatcher::new(&config, cu, terminal, persister)?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => on_signal.cancel(),
            Err(e) => warn!("Cannot listen for Ctrl-C: {}", e),
        }
    });

    match dispatcher.run(&cancel).await {
        Ok(reason) => {
            info!(?reason, "Session finished");
            Ok(())
        }
        Err(e) => {
            error!("Race aborted: {}", e);
            eprintln!("Race aborted: {}", e);
            for suggestion in e.recovery_suggestions() {
                eprintln!("  - {}", suggestion);
            }
            Err(e.into())
        }
    }
}

fn results(args: ResultsArgs) -> Result<()> {
    let records = LocalLog::read_all(&args.log)
        .with_context(|| format!("Failed to read result log {}", args.log.display()))?;

    println!("{:<4}{:<20}{:>10}{:>12}  {}", "Pos", "Driver", "Best lap", "Total", "Date");
    for (index, record) in top_results(records, args.count).iter().enumerate() {
        println!(
            "{:<4}{:<20}{:>10}{:>12}  {}",
            index + 1,
            record.driver_name,
            format_time(record.best_lap, TimeFormat::Short),
            format_time(Some(record.total_time), TimeFormat::Long),
            record.completed_at.format("%Y-%m-%d %H:%M"),
        );
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Race(args) => race(args).await,
        Command::Results(args) => results(args),
    }
}
