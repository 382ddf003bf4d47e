//! `rebalance plan`: equilibrated budgets and the rollout plan.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use comfy_table::{Cell, Table};
use rebalance_core::{EngineConfig, Equilibration, ImplementationTask, ReallocationReport};

use super::common::{InputArgs, build_engine, load_records, parse_date, print_json};
use crate::colors::Palette;

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Total to equilibrate to (defaults to the sum of assigned budgets)
    #[arg(long)]
    pub target_total: Option<f64>,

    /// First rollout day (defaults to the day after --now)
    #[arg(long, value_parser = parse_date)]
    pub start_date: Option<NaiveDate>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: &PlanArgs, config: EngineConfig) -> Result<()> {
    let engine = build_engine(config, args.input.history.as_deref())?;
    let records = load_records(&args.input.input)?;
    let now = args.input.now();

    let decisions = engine.decide(&records, now)?;
    let equilibration = engine.equilibrate(decisions.clone(), args.target_total)?;
    let plan = engine.schedule(&equilibration.rows, args.start_date, now);
    let report = ReallocationReport { generated_at: now, decisions, equilibration, plan };

    if args.json {
        return print_json(&report);
    }
    print_equilibration(&report.equilibration);
    println!();
    print_plan(&report.plan);
    Ok(())
}

pub fn print_equilibration(equilibration: &Equilibration) {
    println!("{}", Palette::heading("Equilibrated budgets"));
    let mut table = Table::new();
    table.set_header(vec!["Channel", "Budget", "Adjusted", "Equilibrated", "Change"]);
    for row in &equilibration.rows {
        table.add_row(vec![
            Cell::new(row.key().to_string()),
            Cell::new(format!("{:.2}", row.before_budget())),
            Cell::new(format!("{:.2}", row.decision.adjustment.new_budget)),
            Cell::new(format!("{:.2}", row.equilibrated_budget)),
            Palette::change_pct_cell(row.equilibrated_change_pct),
        ]);
    }
    println!("{table}");
    println!(
        "  {} Total {:.2} (target {:.2}, scale {:.4})",
        Palette::check(),
        equilibration.total(),
        equilibration.target_total,
        equilibration.scale
    );
    if equilibration.guarded {
        println!("  {}", Palette::warn("Adjusted budgets summed to zero; original budgets kept"));
    }
}

pub fn print_plan(plan: &[ImplementationTask]) {
    println!("{}", Palette::heading("Implementation plan"));
    let mut table = Table::new();
    table.set_header(vec!["Date", "Urgency", "Channel", "Action", "Before", "After"]);
    for task in plan {
        table.add_row(vec![
            Cell::new(task.implementation_date.to_string()),
            Palette::task_urgency_cell(task.urgency),
            Cell::new(task.channel_key.to_string()),
            Cell::new(&task.action_description),
            Cell::new(format!("{:.2}", task.before_budget)),
            Cell::new(format!("{:.2}", task.after_budget)),
        ]);
    }
    println!("{table}");
}
