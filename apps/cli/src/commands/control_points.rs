//! `rebalance control-points`: review checkpoints from a campaign calendar.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Weekday;
use clap::Args;
use comfy_table::{Cell, Table};
use rebalance_core::{ControlPoint, ControlPointScheduler, EngineConfig, Frequency, read_calendar_csv};

use super::common::print_json;
use crate::colors::Palette;

#[derive(Args, Debug, Clone)]
pub struct ControlPointArgs {
    /// Campaign calendar CSV (campaign_id, campaign_start, campaign_end, ...)
    pub calendar: PathBuf,

    /// weekly, biweekly or monthly (defaults to the configured frequency)
    #[arg(long)]
    pub frequency: Option<Frequency>,

    /// Control weekday, repeatable (e.g. --weekday mon --weekday thu)
    #[arg(long = "weekday")]
    pub weekdays: Vec<Weekday>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: &ControlPointArgs, config: EngineConfig) -> Result<()> {
    let file = File::open(&args.calendar).with_context(|| format!("Failed to open {}", args.calendar.display()))?;
    let calendar = read_calendar_csv(BufReader::new(file))?;

    let frequency = args.frequency.unwrap_or(config.control_points.frequency);
    let weekdays = if args.weekdays.is_empty() { &config.control_points.weekdays } else { &args.weekdays };
    let points = ControlPointScheduler.generate(&calendar, frequency, Some(weekdays))?;

    if args.json {
        return print_json(&points);
    }
    print_points(&points, frequency);
    Ok(())
}

fn print_points(points: &[ControlPoint], frequency: Frequency) {
    println!("{}", Palette::heading(&format!("Control points ({frequency})")));
    let mut table = Table::new();
    table.set_header(vec!["Date", "Campaign", "Progress", "Days left", "Phase", "Adjustable"]);
    for point in points {
        table.add_row(vec![
            Cell::new(point.control_date.to_string()),
            Cell::new(&point.campaign_id),
            Cell::new(format!("{:.1}%", point.progress_pct)),
            Cell::new(point.days_remaining.to_string()),
            Cell::new(point.phase.to_string()),
            Cell::new(if point.adjustable { "yes" } else { "no" }),
        ]);
    }
    println!("{table}");
    println!("  {} {} control point(s)", Palette::check(), points.len());
}
