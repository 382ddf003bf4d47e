//! `rebalance alerts`: urgency-tagged alerts for a performance table.

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, ContentArrangement, Table};
use rebalance_core::{Alert, EngineConfig, UrgencyLevel};

use super::common::{InputArgs, build_engine, load_records, print_json};
use crate::colors::Palette;

#[derive(Args, Debug, Clone)]
pub struct AlertArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Minimum urgency to show (none, low, medium, high, critical); defaults to the configured floor
    #[arg(long)]
    pub min_urgency: Option<UrgencyLevel>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: &AlertArgs, config: EngineConfig) -> Result<()> {
    let mut engine = build_engine(config, args.input.history.as_deref())?;
    let records = load_records(&args.input.input)?;
    let now = args.input.now();

    let rows = engine.decide(&records, now)?;
    let alerts = engine.evaluate_alerts(&rows, now);
    let shown = engine.alert_engine().filter_by_minimum_urgency(&alerts, args.min_urgency);

    if args.json {
        return print_json(&shown);
    }
    print_alerts(&shown);
    Ok(())
}

fn print_alerts(alerts: &[Alert]) {
    if alerts.is_empty() {
        println!("No alerts at or above the minimum urgency");
        return;
    }
    println!("{}", Palette::heading("Alerts"));
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Urgency", "Channel", "State", "Message"]);
    for alert in alerts {
        table.add_row(vec![
            Palette::urgency_cell(alert.urgency_level),
            Cell::new(alert.channel_key.to_string()),
            Cell::new(alert.state.to_string()),
            Cell::new(&alert.message),
        ]);
    }
    println!("{table}");
}
