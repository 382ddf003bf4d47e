//! Reallocation engine: the full decision pipeline behind one instance.
//!
//! classify → raw factor → time decay → clamp → cooldown gate → equilibrate → schedule.
//! The engine never reads the clock; every call takes `now` explicitly.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::alerts::{Alert, AlertEngine};
use crate::classifier::{average_conversion, PerformanceClassifier};
use crate::config::EngineConfig;
use crate::cooldown::CooldownGate;
use crate::decay::TimeDecayAdjuster;
use crate::decision::{budget_change, AdjustmentRecord, DecisionRow};
use crate::equilibrate::{BudgetEquilibrator, Equilibration, EquilibratedRow};
use crate::error::EngineResult;
use crate::matrix::DecisionMatrix;
use crate::record::{ensure_unique_keys, ChannelKey, ChannelPerformanceRecord};
use crate::schedule::{ImplementationScheduler, ImplementationTask};

/// Whether [`ReallocationEngine::apply`] records adjustments in the cooldown log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyMode {
    Simulate,
    Commit,
}

/// Budget change handed to the caller for execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedAdjustment {
    pub channel_key: ChannelKey,
    pub before_budget: f64,
    pub after_budget: f64,
    pub applied_on: NaiveDate,
    pub simulated: bool,
    /// Whether this row was written to the cooldown log.
    pub recorded: bool,
}

/// Everything one batch run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReallocationReport {
    pub generated_at: DateTime<Utc>,
    pub decisions: Vec<DecisionRow>,
    pub equilibration: Equilibration,
    pub plan: Vec<ImplementationTask>,
}

#[derive(Debug)]
pub struct ReallocationEngine {
    config: EngineConfig,
    classifier: PerformanceClassifier,
    matrix: DecisionMatrix,
    adjuster: TimeDecayAdjuster,
    scheduler: ImplementationScheduler,
    gate: CooldownGate,
    alerts: AlertEngine,
}

impl ReallocationEngine {
    /// Builds an engine with empty cooldown and alert histories.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        let gate = CooldownGate::new(&config.cooldown);
        let alerts = AlertEngine::new(&config.alerts);
        Self::with_state(config, gate, alerts)
    }

    /// Builds an engine around caller-owned histories.
    pub fn with_state(config: EngineConfig, gate: CooldownGate, alerts: AlertEngine) -> EngineResult<Self> {
        config.validate()?;
        let matrix = DecisionMatrix::from_config(&config.matrix)?;
        Ok(Self {
            classifier: PerformanceClassifier::new(&config.classification),
            adjuster: TimeDecayAdjuster::new(&config.adjustment),
            scheduler: ImplementationScheduler::new(&config.schedule),
            matrix,
            gate,
            alerts,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn matrix(&self) -> &DecisionMatrix {
        &self.matrix
    }

    #[must_use]
    pub fn cooldown_gate(&self) -> &CooldownGate {
        &self.gate
    }

    pub fn cooldown_gate_mut(&mut self) -> &mut CooldownGate {
        &mut self.gate
    }

    #[must_use]
    pub fn alert_engine(&self) -> &AlertEngine {
        &self.alerts
    }

    /// Consumes the engine, returning its histories for persistence.
    #[must_use]
    pub fn into_state(self) -> (CooldownGate, AlertEngine) {
        (self.gate, self.alerts)
    }

    /// Builds the decision table. Any invalid record fails the whole batch.
    pub fn decide(&self, records: &[ChannelPerformanceRecord], now: DateTime<Utc>) -> EngineResult<Vec<DecisionRow>> {
        ensure_unique_keys(records)?;
        let today = now.date_naive();
        let average = average_conversion(records);

        let rows = records
            .iter()
            .map(|record| self.decide_one(record, average, today))
            .collect::<EngineResult<Vec<_>>>()?;

        let gated = rows.iter().filter(|row| row.cooldown_gated).count();
        info!(channels = rows.len(), gated, average_conversion = average, "Built decision table");
        Ok(rows)
    }

    fn decide_one(&self, record: &ChannelPerformanceRecord, average: f64, today: NaiveDate) -> EngineResult<DecisionRow> {
        let raw = self.matrix.compute_raw_adjustment(&self.classifier, record, average)?;
        let raw_factor = raw.factor();

        let decayed = match (record.campaign_start, record.campaign_end) {
            (Some(start), Some(end)) => self.adjuster.adjust_detailed(raw_factor, start, end, today)?,
            _ => {
                if self.config.adjustment.use_time_decay {
                    warn!(channel = %record.key(), "No campaign window; time decay skipped");
                }
                self.adjuster.adjust_without_window(raw_factor)
            }
        };

        let key = record.key();
        let cooldown_gated = !self.gate.may_adjust(&key, today);
        let applied_factor = if cooldown_gated { 0.0 } else { decayed.clamped_factor };
        let new_budget = record.budget_assigned * (1.0 + applied_factor);
        let (change_amount, change_pct) = budget_change(record.budget_assigned, new_budget);

        Ok(DecisionRow {
            record: record.clone(),
            efficiency_tier: raw.classification.efficiency,
            potential_tier: raw.classification.potential,
            cpa_ratio: raw.classification.ratio,
            action: raw.rule.action(),
            description: raw.rule.description().to_string(),
            cooldown_gated,
            warnings: raw.classification.warnings,
            adjustment: AdjustmentRecord {
                raw_factor,
                time_decayed_factor: decayed.time_decayed_factor,
                clamped_factor: decayed.clamped_factor,
                applied_factor,
                new_budget,
                change_amount,
                change_pct,
            },
        })
    }

    /// Rescales the decision table to `target_total` (default: sum of assigned budgets).
    pub fn equilibrate(&self, rows: Vec<DecisionRow>, target_total: Option<f64>) -> EngineResult<Equilibration> {
        BudgetEquilibrator.equilibrate(rows, target_total)
    }

    /// Rollout plan starting at `start_date`, or the day after `now`.
    #[must_use]
    pub fn schedule(
        &self,
        rows: &[EquilibratedRow],
        start_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Vec<ImplementationTask> {
        let start = start_date.unwrap_or_else(|| ImplementationScheduler::default_start(now.date_naive()));
        self.scheduler.schedule(rows, start)
    }

    pub fn evaluate_alerts(&mut self, rows: &[DecisionRow], now: DateTime<Utc>) -> Vec<Alert> {
        self.alerts.evaluate(rows, now)
    }

    /// decide → equilibrate → schedule in one call.
    pub fn run(
        &self,
        records: &[ChannelPerformanceRecord],
        now: DateTime<Utc>,
        target_total: Option<f64>,
    ) -> EngineResult<ReallocationReport> {
        let decisions = self.decide(records, now)?;
        let equilibration = self.equilibrate(decisions.clone(), target_total)?;
        let plan = self.schedule(&equilibration.rows, None, now);
        Ok(ReallocationReport { generated_at: now, decisions, equilibration, plan })
    }

    /// Hands the equilibrated budgets to the caller.
    ///
    /// In `Commit` mode every row whose budget changes and that was not
    /// cooldown-gated is recorded in the cooldown log under `applied_on`.
    /// `Simulate` never touches the log.
    ///
    /// A gated row keeps factor 0 but can still move through the equilibration
    /// scale. It is handed out with its scaled budget and left out of the log, so
    /// its cooldown window is not restarted by rebalancing alone.
    pub fn apply(&mut self, rows: &[EquilibratedRow], applied_on: NaiveDate, mode: ApplyMode) -> Vec<AppliedAdjustment> {
        let simulated = mode == ApplyMode::Simulate;
        let mut recorded = 0usize;
        let applied: Vec<AppliedAdjustment> = rows
            .iter()
            .map(|row| {
                let key = row.key();
                let changed = (row.equilibrated_budget - row.before_budget()).abs() > f64::EPSILON;
                let logged = !simulated && changed && !row.decision.cooldown_gated;
                if logged {
                    self.gate.record_adjustment(key.clone(), applied_on);
                    recorded += 1;
                }
                AppliedAdjustment {
                    channel_key: key,
                    before_budget: row.before_budget(),
                    after_budget: row.equilibrated_budget,
                    applied_on,
                    simulated,
                    recorded: logged,
                }
            })
            .collect();

        info!(rows = applied.len(), recorded, simulated, %applied_on, "Applied adjustments");
        applied
    }
}
