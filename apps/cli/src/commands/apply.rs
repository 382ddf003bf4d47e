//! `rebalance apply`: hand equilibrated budgets to the caller and record them.
//!
//! Nothing is pushed to an advertising platform. Committed adjustments are
//! appended to the cooldown history file.

use anyhow::{Result, bail};
use clap::Args;
use comfy_table::{Cell, Table};
use rebalance_core::{AppliedAdjustment, ApplyMode, EngineConfig};
use tracing::info;

use super::common::{InputArgs, build_engine, load_records, print_json, save_history};
use crate::colors::Palette;

#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Total to equilibrate to (defaults to the sum of assigned budgets)
    #[arg(long)]
    pub target_total: Option<f64>,

    /// Compute adjustments without recording them
    #[arg(long)]
    pub simulate: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: &ApplyArgs, config: EngineConfig) -> Result<()> {
    let history = args.input.history.as_deref();
    if !args.simulate && history.is_none() {
        bail!("--history <file> is required unless --simulate is given");
    }

    let mut engine = build_engine(config, history)?;
    let records = load_records(&args.input.input)?;
    let now = args.input.now();

    let report = engine.run(&records, now, args.target_total)?;
    let mode = if args.simulate { ApplyMode::Simulate } else { ApplyMode::Commit };
    let applied = engine.apply(&report.equilibration.rows, now.date_naive(), mode);

    if let (ApplyMode::Commit, Some(path)) = (mode, history) {
        save_history(path, engine.cooldown_gate().entries())?;
        info!(path = %path.display(), entries = engine.cooldown_gate().entries().len(), "Saved cooldown history");
    }

    if args.json {
        return print_json(&applied);
    }
    print_applied(&applied, args.simulate);
    Ok(())
}

fn print_applied(applied: &[AppliedAdjustment], simulated: bool) {
    let title = if simulated { "Simulated adjustments" } else { "Applied adjustments" };
    println!("{}", Palette::heading(title));
    let mut table = Table::new();
    table.set_header(vec!["Channel", "Before", "After", "Date"]);
    for adjustment in applied {
        table.add_row(vec![
            Cell::new(adjustment.channel_key.to_string()),
            Cell::new(format!("{:.2}", adjustment.before_budget)),
            Cell::new(format!("{:.2}", adjustment.after_budget)),
            Cell::new(adjustment.applied_on.to_string()),
        ]);
    }
    println!("{table}");
    if simulated {
        println!("  {}", Palette::warn("Simulation only: cooldown history unchanged"));
    } else {
        let recorded = applied.iter().filter(|adjustment| adjustment.recorded).count();
        println!(
            "  {} {} adjustment(s) applied, {} recorded in cooldown history",
            Palette::check(),
            applied.len(),
            recorded
        );
    }
}
