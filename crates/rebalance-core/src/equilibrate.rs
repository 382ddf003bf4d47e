//! Proportional rescaling of adjusted budgets to a target total.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::decision::{budget_change, DecisionRow};
use crate::error::{EngineResult, ValidationError};
use crate::record::ChannelKey;

/// A decision row after equilibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquilibratedRow {
    #[serde(flatten)]
    pub decision: DecisionRow,
    pub equilibrated_budget: f64,
    pub equilibrated_change_amount: f64,
    pub equilibrated_change_pct: f64,
}

impl EquilibratedRow {
    #[must_use]
    pub fn key(&self) -> ChannelKey {
        self.decision.key()
    }

    #[must_use]
    pub fn before_budget(&self) -> f64 {
        self.decision.record.budget_assigned
    }
}

/// Batch result of [`BudgetEquilibrator::equilibrate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equilibration {
    pub rows: Vec<EquilibratedRow>,
    pub target_total: f64,
    pub scale: f64,
    /// True when the zero-sum guard kept original budgets.
    pub guarded: bool,
}

impl Equilibration {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|row| row.equilibrated_budget).sum()
    }
}

/// Rescales all adjusted budgets so they sum to a target total.
#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetEquilibrator;

impl BudgetEquilibrator {
    /// Equilibrates a batch. `target_total` defaults to the sum of assigned budgets.
    ///
    /// When the adjusted budgets sum to zero the scale is 1 and every row keeps
    /// its original assigned budget.
    pub fn equilibrate(&self, rows: Vec<DecisionRow>, target_total: Option<f64>) -> EngineResult<Equilibration> {
        let original_total: f64 = rows.iter().map(|row| row.record.budget_assigned).sum();
        let target_total = target_total.unwrap_or(original_total);
        if !target_total.is_finite() || target_total < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "target_total",
                reason: format!("must be a finite value >= 0 (got {target_total})"),
            }
            .into());
        }

        let new_total: f64 = rows.iter().map(|row| row.adjustment.new_budget).sum();
        let guarded = new_total == 0.0;
        let scale = if guarded {
            if !rows.is_empty() {
                warn!("Adjusted budgets sum to zero; keeping original budgets");
            }
            1.0
        } else {
            target_total / new_total
        };

        let rows: Vec<EquilibratedRow> = rows
            .into_iter()
            .map(|decision| {
                let before = decision.record.budget_assigned;
                let equilibrated_budget = if guarded { before } else { decision.adjustment.new_budget * scale };
                let (amount, pct) = budget_change(before, equilibrated_budget);
                EquilibratedRow {
                    decision,
                    equilibrated_budget,
                    equilibrated_change_amount: amount,
                    equilibrated_change_pct: pct,
                }
            })
            .collect();

        info!(channels = rows.len(), target_total, scale, guarded, "Equilibrated budgets");
        Ok(Equilibration { rows, target_total, scale, guarded })
    }
}
