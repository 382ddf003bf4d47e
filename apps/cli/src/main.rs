//! Rebalance CLI - command-line front end for the budget reallocation engine
//!
//! This CLI provides a `rebalance` command that reads a channel performance
//! table and prints decisions, equilibrated budgets, rollout plans, control
//! points and alerts.

mod colors;
mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{ConfigCommand, alerts, apply, control_points, decide, plan};

/// Rebalance - performance-driven budget reallocation
#[derive(Parser, Debug)]
#[command(
    name = "rebalance",
    author,
    version,
    about = "Rebalance - performance-driven budget reallocation",
    long_about = "Rebalance classifies marketing channels by cost per acquisition and conversion volume,\nproposes budget adjustments and keeps the campaign total fixed while rolling them out."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Configuration file (overrides REBALANCE_CONFIG and ./rebalance.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify channels and compute per-channel adjustments
    Decide(decide::DecideArgs),

    /// Equilibrate budgets and build the implementation plan
    ///
    /// Scales adjusted budgets so they sum to the target total, then orders
    /// the changes by magnitude and assigns rollout dates by urgency.
    Plan(plan::PlanArgs),

    /// Generate review checkpoints from a campaign calendar
    ControlPoints(control_points::ControlPointArgs),

    /// Evaluate channel state and emit urgency-tagged alerts
    Alerts(alerts::AlertArgs),

    /// Apply equilibrated budgets (or simulate them) and record cooldowns
    Apply(apply::ApplyArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    // stdout carries tables and JSON, logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let engine_config = config::load(args.config.as_deref())?;

    match &args.command {
        Command::Decide(cmd) => decide::execute(cmd, engine_config)?,
        Command::Plan(cmd) => plan::execute(cmd, engine_config)?,
        Command::ControlPoints(cmd) => control_points::execute(cmd, engine_config)?,
        Command::Alerts(cmd) => alerts::execute(cmd, engine_config)?,
        Command::Apply(cmd) => apply::execute(cmd, engine_config)?,
        Command::Config(cmd) => commands::config::execute(cmd, &engine_config)?,
    }

    Ok(())
}
