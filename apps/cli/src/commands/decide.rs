//! `rebalance decide`: the per-channel decision table.

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Table};
use rebalance_core::{DecisionRow, EngineConfig};

use super::common::{InputArgs, build_engine, load_records, print_json};
use crate::colors::Palette;

#[derive(Args, Debug, Clone)]
pub struct DecideArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: &DecideArgs, config: EngineConfig) -> Result<()> {
    let engine = build_engine(config, args.input.history.as_deref())?;
    let records = load_records(&args.input.input)?;
    let rows = engine.decide(&records, args.input.now())?;

    if args.json {
        return print_json(&rows);
    }
    print_decisions(&rows);
    Ok(())
}

pub fn print_decisions(rows: &[DecisionRow]) {
    println!("{}", Palette::heading("Decision table"));
    let mut table = Table::new();
    table.set_header(vec![
        "Channel", "Efficiency", "Potential", "CPA ratio", "Action", "Raw", "Applied", "Budget", "New budget", "Change",
    ]);
    for row in rows {
        let action = if row.cooldown_gated {
            Cell::new("cooldown")
        } else {
            Palette::action_cell(row.action)
        };
        table.add_row(vec![
            Cell::new(row.key().to_string()),
            Cell::new(row.efficiency_tier.to_string()),
            Cell::new(row.potential_tier.to_string()),
            Cell::new(format!("{:.2}", row.cpa_ratio)),
            action,
            Cell::new(format!("{:+.2}", row.adjustment.raw_factor)),
            Cell::new(format!("{:+.3}", row.adjustment.applied_factor)),
            Cell::new(format!("{:.2}", row.record.budget_assigned)),
            Cell::new(format!("{:.2}", row.adjustment.new_budget)),
            Palette::change_pct_cell(row.adjustment.change_pct),
        ]);
    }
    println!("{table}");

    let gated = rows.iter().filter(|row| row.cooldown_gated).count();
    let flagged = rows.iter().filter(|row| !row.warnings.is_empty()).count();
    println!("  {} {} channel(s), {} in cooldown", Palette::check(), rows.len(), gated);
    if flagged > 0 {
        println!("  {}", Palette::warn(&format!("{flagged} channel(s) fell back to medium tier")));
    }
}
