//! Engine configuration.
//!
//! Every section is optional in the TOML file; omitted keys take the defaults
//! documented on each field.

use std::path::Path;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::alerts::UrgencyLevel;
use crate::control_points::Frequency;
use crate::error::{EngineError, EngineResult};
use crate::matrix::MatrixCell;

/// Root configuration for the reallocation engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub classification: ClassificationConfig,
    pub matrix: MatrixConfig,
    pub adjustment: AdjustmentConfig,
    pub cooldown: CooldownConfig,
    pub schedule: ScheduleConfig,
    pub control_points: ControlPointConfig,
    pub alerts: AlertConfig,
}

/// Tier thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Efficiency is high while current/target CPA stays at or below this (0.8).
    pub efficiency_high_max: f64,
    /// Efficiency is medium up to and including this ratio (1.2).
    pub efficiency_medium_max: f64,
    /// Potential is high at or above this multiple of the average conversion (1.2).
    pub potential_high_min: f64,
    /// Potential is medium at or above this multiple of the average conversion (0.8).
    pub potential_medium_min: f64,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            efficiency_high_max: 0.8,
            efficiency_medium_max: 1.2,
            potential_high_min: 1.2,
            potential_medium_min: 0.8,
        }
    }
}

/// Replacement decision matrix. Empty means the built-in table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    pub cells: Vec<MatrixCell>,
}

/// Bounds and time decay for per-channel adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentConfig {
    /// Largest allowed increase as a fraction of the assigned budget (0.30).
    pub max_increase: f64,
    /// Largest allowed reduction as a fraction of the assigned budget (0.40).
    pub max_reduction: f64,
    /// Shrink adjustments as the campaign approaches its end.
    pub use_time_decay: bool,
}

impl Default for AdjustmentConfig {
    fn default() -> Self {
        Self { max_increase: 0.30, max_reduction: 0.40, use_time_decay: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    /// Minimum days between two applied adjustments to one channel (3).
    pub min_interval_days: u32,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self { min_interval_days: 3 }
    }
}

/// Urgency cut-points (in percent of budget change) and rollout offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub high_change_pct: f64,
    pub medium_change_pct: f64,
    pub high_offset_days: u32,
    pub medium_offset_days: u32,
    pub low_offset_days: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            high_change_pct: 20.0,
            medium_change_pct: 10.0,
            high_offset_days: 1,
            medium_offset_days: 3,
            low_offset_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlPointConfig {
    pub frequency: Frequency,
    pub weekdays: Vec<Weekday>,
}

impl Default for ControlPointConfig {
    fn default() -> Self {
        Self { frequency: Frequency::Weekly, weekdays: vec![Weekday::Mon] }
    }
}

/// Alert thresholds, independent from the decision matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// CPA ratio at or above which a channel is critical (1.3).
    pub critical_ratio: f64,
    /// CPA ratio at or above which a channel is high (1.15).
    pub high_ratio: f64,
    /// Lower bound of the optimal band (0.85).
    pub optimal_min_ratio: f64,
    /// Below this ratio a channel is an opportunity (0.7).
    pub opportunity_ratio: f64,
    /// Fraction of the assigned budget spent that counts as exhausted (0.9).
    pub budget_exhausted_ratio: f64,
    /// Fraction of campaign time elapsed before exhaustion is expected (0.7).
    pub time_exhausted_ratio: f64,
    /// Floor applied by [`crate::alerts::AlertEngine::filter_by_minimum_urgency`].
    pub minimum_urgency: UrgencyLevel,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            critical_ratio: 1.3,
            high_ratio: 1.15,
            optimal_min_ratio: 0.85,
            opportunity_ratio: 0.7,
            budget_exhausted_ratio: 0.9,
            time_exhausted_ratio: 0.7,
            minimum_urgency: UrgencyLevel::Medium,
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document and validates it.
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Saves configuration to a TOML file, creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> EngineResult<()> {
        let content = self.to_toml_string()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn to_toml_string(&self) -> EngineResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks threshold ordering and bounds.
    ///
    /// The matrix cells are checked when the matrix is built from them.
    pub fn validate(&self) -> EngineResult<()> {
        let c = &self.classification;
        if !(c.efficiency_high_max > 0.0 && c.efficiency_high_max < c.efficiency_medium_max) {
            return Err(config_err(format!(
                "efficiency thresholds must satisfy 0 < high_max < medium_max (got {} / {})",
                c.efficiency_high_max, c.efficiency_medium_max
            )));
        }
        if !(c.potential_medium_min > 0.0 && c.potential_medium_min < c.potential_high_min) {
            return Err(config_err(format!(
                "potential thresholds must satisfy 0 < medium_min < high_min (got {} / {})",
                c.potential_medium_min, c.potential_high_min
            )));
        }

        let a = &self.adjustment;
        for (name, value) in [("max_increase", a.max_increase), ("max_reduction", a.max_reduction)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(config_err(format!("{name} must be within [0, 1] (got {value})")));
            }
        }

        let s = &self.schedule;
        if !(s.medium_change_pct >= 0.0 && s.medium_change_pct < s.high_change_pct) {
            return Err(config_err(format!(
                "urgency cut-points must satisfy 0 <= medium < high (got {} / {})",
                s.medium_change_pct, s.high_change_pct
            )));
        }
        if !(s.high_offset_days <= s.medium_offset_days && s.medium_offset_days <= s.low_offset_days) {
            return Err(config_err(format!(
                "urgency offsets must satisfy high <= medium <= low (got {} / {} / {})",
                s.high_offset_days, s.medium_offset_days, s.low_offset_days
            )));
        }

        if self.control_points.weekdays.is_empty() {
            return Err(config_err("control point weekday set must not be empty".to_string()));
        }

        let al = &self.alerts;
        let ordered = al.opportunity_ratio > 0.0
            && al.opportunity_ratio < al.optimal_min_ratio
            && al.optimal_min_ratio < al.high_ratio
            && al.high_ratio < al.critical_ratio;
        if !ordered {
            return Err(config_err(
                "alert ratios must satisfy 0 < opportunity < optimal_min < high < critical".to_string(),
            ));
        }
        if !(al.budget_exhausted_ratio > 0.0 && al.time_exhausted_ratio > 0.0 && al.time_exhausted_ratio <= 1.0) {
            return Err(config_err("pacing ratios must be positive and time_exhausted_ratio <= 1".to_string()));
        }
        Ok(())
    }
}

fn config_err(message: String) -> EngineError {
    EngineError::Configuration(message)
}
