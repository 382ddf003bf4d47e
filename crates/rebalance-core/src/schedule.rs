//! Rollout plan for equilibrated adjustments.

use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ScheduleConfig;
use crate::equilibrate::EquilibratedRow;
use crate::record::ChannelKey;

/// Changes smaller than this in absolute currency units are "maintain".
const MAINTAIN_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskUrgency {
    High,
    Medium,
    Low,
}

impl TaskUrgency {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for TaskUrgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the implementation plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplementationTask {
    pub channel_key: ChannelKey,
    pub urgency: TaskUrgency,
    pub implementation_date: NaiveDate,
    pub action_description: String,
    pub before_budget: f64,
    pub after_budget: f64,
    pub change_pct: f64,
}

/// Assigns urgency and a rollout date to each equilibrated row.
#[derive(Debug, Clone)]
pub struct ImplementationScheduler {
    config: ScheduleConfig,
}

impl Default for ImplementationScheduler {
    fn default() -> Self {
        Self::new(&ScheduleConfig::default())
    }
}

impl ImplementationScheduler {
    #[must_use]
    pub fn new(config: &ScheduleConfig) -> Self {
        Self { config: config.clone() }
    }

    /// Default rollout start: the day after `today`.
    #[must_use]
    pub fn default_start(today: NaiveDate) -> NaiveDate {
        today + Duration::days(1)
    }

    /// Urgency and offset in days for a percentage change.
    #[must_use]
    pub fn urgency_for(&self, change_pct: f64) -> (TaskUrgency, u32) {
        let magnitude = change_pct.abs();
        if magnitude > self.config.high_change_pct {
            (TaskUrgency::High, self.config.high_offset_days)
        } else if magnitude > self.config.medium_change_pct {
            (TaskUrgency::Medium, self.config.medium_offset_days)
        } else {
            (TaskUrgency::Low, self.config.low_offset_days)
        }
    }

    /// Builds the plan, largest absolute change first.
    ///
    /// With offsets ordered high <= medium <= low this is also ordered by
    /// implementation date. Ties keep input order.
    #[must_use]
    pub fn schedule(&self, rows: &[EquilibratedRow], start_date: NaiveDate) -> Vec<ImplementationTask> {
        let mut tasks: Vec<ImplementationTask> = rows
            .iter()
            .map(|row| {
                let change_pct = row.equilibrated_change_pct;
                let (urgency, offset) = self.urgency_for(change_pct);
                ImplementationTask {
                    channel_key: row.key(),
                    urgency,
                    implementation_date: start_date + Duration::days(i64::from(offset)),
                    action_description: describe(row.equilibrated_change_amount),
                    before_budget: row.before_budget(),
                    after_budget: row.equilibrated_budget,
                    change_pct,
                }
            })
            .collect();

        tasks.sort_by(|a, b| b.change_pct.abs().total_cmp(&a.change_pct.abs()));

        let high = tasks.iter().filter(|t| t.urgency == TaskUrgency::High).count();
        info!(tasks = tasks.len(), high, %start_date, "Scheduled implementation plan");
        tasks
    }
}

fn describe(change_amount: f64) -> String {
    if change_amount > MAINTAIN_EPSILON {
        format!("increase budget by {change_amount:.2}")
    } else if change_amount < -MAINTAIN_EPSILON {
        format!("decrease budget by {:.2}", change_amount.abs())
    } else {
        "maintain".to_string()
    }
}
