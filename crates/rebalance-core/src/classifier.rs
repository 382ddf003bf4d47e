//! Channel classification into (efficiency, potential) tiers.
//!
//! Each tier family is an ordered list of `(predicate, tier)` pairs evaluated
//! once; the first match wins. When nothing matches, the tier falls back to
//! `Medium` and the result carries a [`ClassificationWarning`].

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ClassificationConfig;
use crate::error::EngineResult;
use crate::record::ChannelPerformanceRecord;
use crate::tier::{EfficiencyTier, PotentialTier};

/// Comparison applied to a single value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    /// `x <= bound`
    AtMost(f64),
    /// `x > bound`
    Above(f64),
    /// `x >= bound`
    AtLeast(f64),
    /// `x < bound`
    Below(f64),
    /// `lower < x <= upper`
    OpenClosed(f64, f64),
    /// `lower <= x < upper`
    ClosedOpen(f64, f64),
}

impl Predicate {
    #[must_use]
    pub fn matches(self, x: f64) -> bool {
        match self {
            Self::AtMost(bound) => x <= bound,
            Self::Above(bound) => x > bound,
            Self::AtLeast(bound) => x >= bound,
            Self::Below(bound) => x < bound,
            Self::OpenClosed(lower, upper) => lower < x && x <= upper,
            Self::ClosedOpen(lower, upper) => lower <= x && x < upper,
        }
    }
}

/// Flags raised when classification had to fall back to a default tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationWarning {
    /// The CPA ratio was not a finite number.
    RatioUndefined,
    /// The cross-channel average conversion rate was zero or not finite.
    AverageUndefined,
    /// No efficiency predicate matched the ratio.
    NoEfficiencyMatch,
    /// No potential predicate matched the conversion rate.
    NoPotentialMatch,
}

/// Tiers assigned to one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub efficiency: EfficiencyTier,
    pub potential: PotentialTier,
    /// current_cpa / target_cpa
    pub ratio: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ClassificationWarning>,
}

/// Assigns tiers from configured thresholds.
#[derive(Debug, Clone)]
pub struct PerformanceClassifier {
    efficiency_rules: [(Predicate, EfficiencyTier); 3],
    potential_high_min: f64,
    potential_medium_min: f64,
}

impl Default for PerformanceClassifier {
    fn default() -> Self {
        Self::new(&ClassificationConfig::default())
    }
}

impl PerformanceClassifier {
    #[must_use]
    pub fn new(config: &ClassificationConfig) -> Self {
        let high = config.efficiency_high_max;
        let medium = config.efficiency_medium_max;
        Self {
            efficiency_rules: [
                (Predicate::AtMost(high), EfficiencyTier::High),
                (Predicate::OpenClosed(high, medium), EfficiencyTier::Medium),
                (Predicate::Above(medium), EfficiencyTier::Low),
            ],
            potential_high_min: config.potential_high_min,
            potential_medium_min: config.potential_medium_min,
        }
    }

    /// Potential rules are relative to the batch average, so they are built per call.
    fn potential_rules(&self, average: f64) -> [(Predicate, PotentialTier); 3] {
        let high = average * self.potential_high_min;
        let medium = average * self.potential_medium_min;
        [
            (Predicate::AtLeast(high), PotentialTier::High),
            (Predicate::ClosedOpen(medium, high), PotentialTier::Medium),
            (Predicate::Below(medium), PotentialTier::Low),
        ]
    }

    /// Efficiency tier for a CPA ratio, or `None` when nothing matches.
    #[must_use]
    pub fn efficiency_tier(&self, ratio: f64) -> Option<EfficiencyTier> {
        first_match(&self.efficiency_rules, ratio)
    }

    /// Potential tier for a conversion rate, or `None` when nothing matches.
    #[must_use]
    pub fn potential_tier(&self, conversion_rate: f64, average: f64) -> Option<PotentialTier> {
        first_match(&self.potential_rules(average), conversion_rate)
    }

    /// Classifies one record against the cross-channel average conversion rate.
    pub fn classify(
        &self,
        record: &ChannelPerformanceRecord,
        cross_channel_average_conversion: f64,
    ) -> EngineResult<Classification> {
        record.validate()?;

        let mut warnings = Vec::new();
        let ratio = record.cpa_ratio();

        let efficiency = if ratio.is_finite() {
            self.efficiency_tier(ratio).unwrap_or_else(|| {
                warnings.push(ClassificationWarning::NoEfficiencyMatch);
                EfficiencyTier::Medium
            })
        } else {
            warnings.push(ClassificationWarning::RatioUndefined);
            EfficiencyTier::Medium
        };

        let average = cross_channel_average_conversion;
        let potential = if average.is_finite() && average > 0.0 {
            self.potential_tier(record.conversion_rate, average).unwrap_or_else(|| {
                warnings.push(ClassificationWarning::NoPotentialMatch);
                PotentialTier::Medium
            })
        } else {
            warnings.push(ClassificationWarning::AverageUndefined);
            PotentialTier::Medium
        };

        if warnings.is_empty() {
            debug!(
                channel = %record.key(),
                ratio,
                efficiency = %efficiency,
                potential = %potential,
                "Classified channel"
            );
        } else {
            warn!(
                channel = %record.key(),
                ratio,
                ?warnings,
                "Classification fell back to medium tier"
            );
        }

        Ok(Classification { efficiency, potential, ratio, warnings })
    }
}

fn first_match<T: Copy>(rules: &[(Predicate, T)], x: f64) -> Option<T> {
    rules.iter().find(|(predicate, _)| predicate.matches(x)).map(|(_, tier)| *tier)
}

/// Mean conversion rate across a batch; 0 for an empty batch.
#[must_use]
pub fn average_conversion(records: &[ChannelPerformanceRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|r| r.conversion_rate).sum::<f64>() / records.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ChannelKey;

    fn record(current_cpa: f64, target_cpa: f64, conversion_rate: f64) -> ChannelPerformanceRecord {
        ChannelPerformanceRecord::new(ChannelKey::new("c1", "b1", "search"), 1000.0, current_cpa, target_cpa, conversion_rate)
    }

    #[test]
    fn test_efficiency_boundaries() {
        let classifier = PerformanceClassifier::default();
        assert_eq!(classifier.efficiency_tier(0.8), Some(EfficiencyTier::High));
        assert_eq!(classifier.efficiency_tier(0.8001), Some(EfficiencyTier::Medium));
        assert_eq!(classifier.efficiency_tier(1.2), Some(EfficiencyTier::Medium));
        assert_eq!(classifier.efficiency_tier(1.2001), Some(EfficiencyTier::Low));
    }

    #[test]
    fn test_potential_boundaries() {
        let classifier = PerformanceClassifier::default();
        assert_eq!(classifier.potential_tier(0.13, 0.10), Some(PotentialTier::High));
        assert_eq!(classifier.potential_tier(0.10, 0.10), Some(PotentialTier::Medium));
        assert_eq!(classifier.potential_tier(0.081, 0.10), Some(PotentialTier::Medium));
        assert_eq!(classifier.potential_tier(0.079, 0.10), Some(PotentialTier::Low));
    }

    #[test]
    fn test_classify_high_high() {
        let classifier = PerformanceClassifier::default();
        let result = classifier.classify(&record(150.0, 200.0, 0.15), 0.10).unwrap();
        assert_eq!(result.efficiency, EfficiencyTier::High);
        assert_eq!(result.potential, PotentialTier::High);
        assert!((result.ratio - 0.75).abs() < 1e-12);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_classify_low_efficiency() {
        let classifier = PerformanceClassifier::default();
        let result = classifier.classify(&record(300.0, 200.0, 0.05), 0.10).unwrap();
        assert_eq!(result.efficiency, EfficiencyTier::Low);
        assert_eq!(result.potential, PotentialTier::Low);
    }

    #[test]
    fn test_zero_average_falls_back_to_medium_with_warning() {
        let classifier = PerformanceClassifier::default();
        let result = classifier.classify(&record(150.0, 200.0, 0.0), 0.0).unwrap();
        assert_eq!(result.potential, PotentialTier::Medium);
        assert_eq!(result.warnings, vec![ClassificationWarning::AverageUndefined]);
    }

    #[test]
    fn test_gap_in_thresholds_falls_back_to_medium() {
        let classifier = PerformanceClassifier {
            efficiency_rules: [
                (Predicate::AtMost(0.5), EfficiencyTier::High),
                (Predicate::OpenClosed(0.5, 0.6), EfficiencyTier::Medium),
                (Predicate::Above(2.0), EfficiencyTier::Low),
            ],
            ..PerformanceClassifier::default()
        };
        let result = classifier.classify(&record(200.0, 200.0, 0.1), 0.1).unwrap();
        assert_eq!(result.efficiency, EfficiencyTier::Medium);
        assert_eq!(result.warnings, vec![ClassificationWarning::NoEfficiencyMatch]);
    }

    #[test]
    fn test_classify_rejects_non_positive_target() {
        let classifier = PerformanceClassifier::default();
        assert!(classifier.classify(&record(150.0, 0.0, 0.1), 0.1).is_err());
    }

    #[test]
    fn test_average_conversion() {
        let records = vec![record(1.0, 1.0, 0.1), record(1.0, 1.0, 0.3)];
        assert!((average_conversion(&records) - 0.2).abs() < 1e-12);
        assert_eq!(average_conversion(&[]), 0.0);
    }
}
