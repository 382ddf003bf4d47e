//! Time-decayed, clamped adjustment factors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::AdjustmentConfig;
use crate::error::{EngineResult, ValidationError};

/// Factor trail produced by [`TimeDecayAdjuster::adjust_detailed`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayedFactor {
    /// Fraction of the campaign already elapsed, in [0, 1].
    pub elapsed_fraction: f64,
    pub time_decayed_factor: f64,
    pub clamped_factor: f64,
}

/// Scales base factors by remaining campaign time and clamps them.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeDecayAdjuster {
    max_increase: f64,
    max_reduction: f64,
    use_time_decay: bool,
}

impl Default for TimeDecayAdjuster {
    fn default() -> Self {
        Self::new(&AdjustmentConfig::default())
    }
}

impl TimeDecayAdjuster {
    #[must_use]
    pub fn new(config: &AdjustmentConfig) -> Self {
        Self {
            max_increase: config.max_increase,
            max_reduction: config.max_reduction,
            use_time_decay: config.use_time_decay,
        }
    }

    #[must_use]
    pub fn max_increase(&self) -> f64 {
        self.max_increase
    }

    #[must_use]
    pub fn max_reduction(&self) -> f64 {
        self.max_reduction
    }

    /// Clamps to [-max_reduction, +max_increase].
    #[must_use]
    pub fn clamp(&self, factor: f64) -> f64 {
        factor.clamp(-self.max_reduction, self.max_increase)
    }

    /// Elapsed share of the campaign at `now`, clamped to [0, 1].
    pub fn elapsed_fraction(start: NaiveDate, end: NaiveDate, now: NaiveDate) -> EngineResult<f64> {
        let total = (end - start).num_days();
        if total <= 0 {
            return Err(ValidationError::InvalidDateRange {
                context: "campaign".to_string(),
                start,
                end,
            }
            .into());
        }
        let elapsed = (now - start).num_days();
        Ok((elapsed as f64 / total as f64).clamp(0.0, 1.0))
    }

    /// Returns the clamped factor.
    pub fn adjust(&self, raw_factor: f64, campaign_start: NaiveDate, campaign_end: NaiveDate, now: NaiveDate) -> EngineResult<f64> {
        Ok(self.adjust_detailed(raw_factor, campaign_start, campaign_end, now)?.clamped_factor)
    }

    /// Returns every intermediate value of the adjustment.
    pub fn adjust_detailed(
        &self,
        raw_factor: f64,
        campaign_start: NaiveDate,
        campaign_end: NaiveDate,
        now: NaiveDate,
    ) -> EngineResult<DecayedFactor> {
        let elapsed_fraction = Self::elapsed_fraction(campaign_start, campaign_end, now)?;
        let time_decayed_factor =
            if self.use_time_decay { raw_factor * (1.0 - elapsed_fraction) } else { raw_factor };
        Ok(DecayedFactor {
            elapsed_fraction,
            time_decayed_factor,
            clamped_factor: self.clamp(time_decayed_factor),
        })
    }

    /// Clamp-only path for records without a campaign window.
    #[must_use]
    pub fn adjust_without_window(&self, raw_factor: f64) -> DecayedFactor {
        DecayedFactor {
            elapsed_fraction: 0.0,
            time_decayed_factor: raw_factor,
            clamped_factor: self.clamp(raw_factor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_half_elapsed_halves_factor() {
        let adjuster = TimeDecayAdjuster::default();
        let out = adjuster.adjust_detailed(0.2, date(2024, 1, 1), date(2024, 1, 11), date(2024, 1, 6)).unwrap();
        assert!((out.elapsed_fraction - 0.5).abs() < 1e-12);
        assert!((out.time_decayed_factor - 0.1).abs() < 1e-12);
        assert!((out.clamped_factor - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_before_start_keeps_full_factor() {
        let adjuster = TimeDecayAdjuster::default();
        let factor = adjuster.adjust(-0.4, date(2024, 2, 1), date(2024, 3, 1), date(2024, 1, 1)).unwrap();
        assert!((factor + 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_after_end_decays_to_zero() {
        let adjuster = TimeDecayAdjuster::default();
        let factor = adjuster.adjust(0.3, date(2024, 1, 1), date(2024, 1, 31), date(2024, 3, 1)).unwrap();
        assert_eq!(factor, 0.0);
    }

    #[test]
    fn test_disabled_decay_passes_through_and_clamps() {
        let adjuster = TimeDecayAdjuster::new(&AdjustmentConfig {
            max_increase: 0.25,
            max_reduction: 0.40,
            use_time_decay: false,
        });
        let factor = adjuster.adjust(0.3, date(2024, 1, 1), date(2024, 1, 31), date(2024, 1, 20)).unwrap();
        assert!((factor - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_end_not_after_start_is_validation_error() {
        let adjuster = TimeDecayAdjuster::default();
        let err = adjuster.adjust(0.3, date(2024, 1, 5), date(2024, 1, 5), date(2024, 1, 5)).unwrap_err();
        assert!(matches!(err.as_validation(), Some(ValidationError::InvalidDateRange { .. })));
    }

    #[test]
    fn test_clamp_bounds() {
        let adjuster = TimeDecayAdjuster::default();
        for raw in [-1.0, -0.5, -0.4, 0.0, 0.3, 0.31, 1.0] {
            let out = adjuster.adjust_without_window(raw);
            assert!(out.clamped_factor >= -0.40 && out.clamped_factor <= 0.30, "raw={raw}");
        }
    }
}
