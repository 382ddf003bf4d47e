//! Input loading shared by the commands.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::Args;
use rebalance_core::{
    AlertEngine, ChannelPerformanceRecord, CooldownEntry, CooldownGate, EngineConfig, ReallocationEngine,
    read_performance_csv, read_performance_json,
};
use tracing::debug;

/// Arguments every performance-table command accepts.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Performance table (.csv or .json)
    pub input: PathBuf,

    /// Evaluation time (YYYY-MM-DD or RFC 3339); defaults to the current time
    #[arg(long, value_parser = parse_now)]
    pub now: Option<DateTime<Utc>>,

    /// Cooldown history file (JSON), read before deciding
    #[arg(long)]
    pub history: Option<PathBuf>,
}

impl InputArgs {
    pub fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

/// Parses `--now`: a plain date means midnight UTC.
pub fn parse_now(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::default()).and_utc())
        .map_err(|_| format!("invalid time '{value}': expected YYYY-MM-DD or RFC 3339"))
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| format!("invalid date '{value}': expected YYYY-MM-DD"))
}

pub fn load_records(path: &Path) -> Result<Vec<ChannelPerformanceRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed = if is_json { read_performance_json(reader) } else { read_performance_csv(reader) };
    let records = parsed.with_context(|| format!("Invalid performance table {}", path.display()))?;
    debug!(records = records.len(), path = %path.display(), "Loaded performance table");
    Ok(records)
}

/// Reads a cooldown log; a missing file is an empty log.
pub fn load_history(path: Option<&Path>) -> Result<Vec<CooldownEntry>> {
    let Some(path) = path else { return Ok(Vec::new()) };
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path).with_context(|| format!("Failed to open history {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse history {}", path.display()))
}

pub fn save_history(path: &Path, entries: &[CooldownEntry]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(entries)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write history {}", path.display()))
}

/// Builds an engine with the cooldown log from `--history` injected.
pub fn build_engine(config: EngineConfig, history: Option<&Path>) -> Result<ReallocationEngine> {
    let gate = CooldownGate::from_entries(&config.cooldown, load_history(history)?);
    let alerts = AlertEngine::new(&config.alerts);
    Ok(ReallocationEngine::with_state(config, gate, alerts)?)
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
