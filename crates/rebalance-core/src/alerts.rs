//! Urgency-tagged alerts with an append-only history.
//!
//! Thresholds are independent from the decision matrix. Channel state is
//! re-derived from (now, campaign window, CPA ratio) on every call.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::AlertConfig;
use crate::decision::DecisionRow;
use crate::record::ChannelKey;

/// Alert urgency, ordered from `None` to `Critical`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl UrgencyLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UrgencyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(format!("unknown urgency level '{other}'")),
        }
    }
}

/// CPA band of a running campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveState {
    Critical,
    High,
    Optimal,
    Efficient,
    VeryEfficient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    NotStarted,
    Active(ActiveState),
    Finished,
}

impl ChannelState {
    /// Base urgency before the pacing check.
    #[must_use]
    pub fn urgency(self) -> UrgencyLevel {
        match self {
            Self::NotStarted | Self::Finished => UrgencyLevel::None,
            Self::Active(ActiveState::Critical) => UrgencyLevel::Critical,
            Self::Active(ActiveState::High) => UrgencyLevel::High,
            Self::Active(ActiveState::VeryEfficient) => UrgencyLevel::Medium,
            Self::Active(ActiveState::Optimal | ActiveState::Efficient) => UrgencyLevel::Low,
        }
    }

    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active(_))
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotStarted => "not started",
            Self::Finished => "finished",
            Self::Active(ActiveState::Critical) => "critical CPA",
            Self::Active(ActiveState::High) => "high CPA",
            Self::Active(ActiveState::Optimal) => "optimal CPA",
            Self::Active(ActiveState::Efficient) => "efficient CPA",
            Self::Active(ActiveState::VeryEfficient) => "very efficient CPA",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub channel_key: ChannelKey,
    pub state: ChannelState,
    pub urgency_level: UrgencyLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Budget is being spent faster than campaign time elapses.
    #[serde(default)]
    pub pacing: bool,
}

/// Evaluates alert thresholds and keeps every generated batch.
#[derive(Debug, Clone, Default)]
pub struct AlertEngine {
    config: AlertConfig,
    history: BTreeMap<DateTime<Utc>, Vec<Alert>>,
}

impl AlertEngine {
    #[must_use]
    pub fn new(config: &AlertConfig) -> Self {
        Self { config: config.clone(), history: BTreeMap::new() }
    }

    #[must_use]
    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Lifecycle state of one row at `today`. Rows without a campaign window are active.
    #[must_use]
    pub fn channel_state(&self, row: &DecisionRow, today: NaiveDate) -> ChannelState {
        if let (Some(start), Some(end)) = (row.record.campaign_start, row.record.campaign_end) {
            if (today - start).num_days() <= 0 {
                return ChannelState::NotStarted;
            }
            if today >= end {
                return ChannelState::Finished;
            }
        }
        ChannelState::Active(self.active_state(row.cpa_ratio))
    }

    fn active_state(&self, ratio: f64) -> ActiveState {
        let c = &self.config;
        if ratio >= c.critical_ratio {
            ActiveState::Critical
        } else if ratio >= c.high_ratio {
            ActiveState::High
        } else if ratio >= c.optimal_min_ratio {
            ActiveState::Optimal
        } else if ratio <= c.opportunity_ratio {
            ActiveState::VeryEfficient
        } else {
            ActiveState::Efficient
        }
    }

    /// (spent fraction, elapsed fraction) when the channel is over-pacing.
    fn pacing(&self, row: &DecisionRow, today: NaiveDate) -> Option<(f64, f64)> {
        let record = &row.record;
        let spent = record.budget_spent?;
        let (start, end) = (record.campaign_start?, record.campaign_end?);
        let total = (end - start).num_days();
        if record.budget_assigned <= 0.0 || total <= 0 {
            return None;
        }
        let spent_fraction = spent / record.budget_assigned;
        let elapsed_fraction = ((today - start).num_days() as f64 / total as f64).clamp(0.0, 1.0);
        let over = spent_fraction >= self.config.budget_exhausted_ratio
            && elapsed_fraction < self.config.time_exhausted_ratio;
        over.then_some((spent_fraction, elapsed_fraction))
    }

    /// One alert per row, most urgent first. The batch is appended to the history
    /// under `now`.
    pub fn evaluate(&mut self, rows: &[DecisionRow], now: DateTime<Utc>) -> Vec<Alert> {
        let today = now.date_naive();
        let mut alerts: Vec<Alert> = rows
            .iter()
            .map(|row| {
                let state = self.channel_state(row, today);
                let mut urgency_level = state.urgency();
                let mut message = render_message(row, state);
                let pacing = if state.is_active() { self.pacing(row, today) } else { None };
                if let Some((spent, elapsed)) = pacing {
                    urgency_level = urgency_level.max(UrgencyLevel::High);
                    message.push_str(&format!(
                        " Pacing: {:.1}% of budget spent with {:.1}% of campaign time elapsed.",
                        spent * 100.0,
                        elapsed * 100.0
                    ));
                }
                Alert {
                    channel_key: row.key(),
                    state,
                    urgency_level,
                    message,
                    timestamp: now,
                    pacing: pacing.is_some(),
                }
            })
            .collect();

        alerts.sort_by(|a, b| b.urgency_level.cmp(&a.urgency_level));

        let critical = alerts.iter().filter(|a| a.urgency_level == UrgencyLevel::Critical).count();
        info!(alerts = alerts.len(), critical, "Evaluated alerts");
        self.history.entry(now).or_default().extend(alerts.iter().cloned());
        alerts
    }

    /// Alerts at or above `level`, or the configured floor when `None`.
    #[must_use]
    pub fn filter_by_minimum_urgency(&self, alerts: &[Alert], level: Option<UrgencyLevel>) -> Vec<Alert> {
        let floor = level.unwrap_or(self.config.minimum_urgency);
        alerts.iter().filter(|alert| alert.urgency_level >= floor).cloned().collect()
    }

    /// Every generated batch keyed by generation timestamp.
    #[must_use]
    pub fn history(&self) -> &BTreeMap<DateTime<Utc>, Vec<Alert>> {
        &self.history
    }

    #[must_use]
    pub fn latest(&self) -> Option<&[Alert]> {
        self.history.values().next_back().map(Vec::as_slice)
    }
}

fn render_message(row: &DecisionRow, state: ChannelState) -> String {
    let record = &row.record;
    let change = row.adjustment.change_pct;
    match state {
        ChannelState::Active(ActiveState::Critical) => format!(
            "CRITICAL: channel '{}' of '{}' has a very high CPA ({:.2} vs target {:.2}). Recommended budget change: {:+.1}%.",
            record.channel, record.brand, record.current_cpa, record.target_cpa, change
        ),
        ChannelState::Active(ActiveState::High) => format!(
            "WARNING: channel '{}' of '{}' has a CPA above target ({:.2} vs {:.2}). Recommended budget change: {:+.1}%.",
            record.channel, record.brand, record.current_cpa, record.target_cpa, change
        ),
        ChannelState::Active(ActiveState::VeryEfficient) => format!(
            "OPPORTUNITY: channel '{}' of '{}' is performing exceptionally (CPA {:.2}, {:.1}% below target). Recommended budget change: {:+.1}%.",
            record.channel,
            record.brand,
            record.current_cpa,
            (1.0 - row.cpa_ratio) * 100.0,
            change
        ),
        _ => format!("Alert for '{}' of '{}': state {}", record.channel, record.brand, state),
    }
}
