//! Decision table rows.

use serde::{Deserialize, Serialize};

use crate::classifier::ClassificationWarning;
use crate::record::{ChannelKey, ChannelPerformanceRecord};
use crate::tier::{Action, EfficiencyTier, PotentialTier};

/// Per-channel factor trail and the budget it produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRecord {
    /// Factor straight from the decision matrix.
    pub raw_factor: f64,
    /// After scaling by remaining campaign time.
    pub time_decayed_factor: f64,
    /// After clamping to the configured bounds.
    pub clamped_factor: f64,
    /// Factor actually used; 0 when the cooldown gate blocked the channel.
    pub applied_factor: f64,
    pub new_budget: f64,
    pub change_amount: f64,
    pub change_pct: f64,
}

/// One row of the decision table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRow {
    #[serde(flatten)]
    pub record: ChannelPerformanceRecord,
    pub efficiency_tier: EfficiencyTier,
    pub potential_tier: PotentialTier,
    pub cpa_ratio: f64,
    /// Action recommended by the matrix rule.
    pub action: Action,
    pub description: String,
    pub cooldown_gated: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ClassificationWarning>,
    #[serde(flatten)]
    pub adjustment: AdjustmentRecord,
}

impl DecisionRow {
    #[must_use]
    pub fn key(&self) -> ChannelKey {
        self.record.key()
    }

    /// Action implied by the applied factor, after decay, clamping and gating.
    #[must_use]
    pub fn effective_action(&self) -> Action {
        Action::from_factor(self.adjustment.applied_factor)
    }
}

/// Absolute and percentage change from `before` to `after`.
///
/// The percentage is 0 when `before` is 0.
#[must_use]
pub fn budget_change(before: f64, after: f64) -> (f64, f64) {
    let amount = after - before;
    let pct = if before == 0.0 { 0.0 } else { amount / before * 100.0 };
    (amount, pct)
}
