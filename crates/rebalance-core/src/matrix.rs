//! Decision matrix: (efficiency tier × potential tier) → base adjustment.

use serde::{Deserialize, Serialize};

use crate::classifier::{Classification, PerformanceClassifier};
use crate::config::MatrixConfig;
use crate::error::{EngineError, EngineResult};
use crate::record::ChannelPerformanceRecord;
use crate::tier::{Action, EfficiencyTier, PotentialTier};

/// One immutable matrix entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionRule {
    action: Action,
    factor: f64,
    description: String,
}

impl DecisionRule {
    /// Creates a rule, rejecting factors outside [-1, 1].
    pub fn new(action: Action, factor: f64, description: impl Into<String>) -> EngineResult<Self> {
        if !factor.is_finite() || !(-1.0..=1.0).contains(&factor) {
            return Err(EngineError::Configuration(format!(
                "decision factor must be within [-1, 1] (got {factor})"
            )));
        }
        Ok(Self { action, factor, description: description.into() })
    }

    fn fixed(action: Action, factor: f64, description: String) -> Self {
        Self { action, factor, description }
    }

    #[must_use]
    pub fn action(&self) -> Action {
        self.action
    }

    #[must_use]
    pub fn factor(&self) -> f64 {
        self.factor
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Serializable form of one matrix cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixCell {
    pub efficiency: EfficiencyTier,
    pub potential: PotentialTier,
    pub factor: f64,
    /// Derived from the factor sign when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Fixed-size 3×3 rule table. Every tier pair always has an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionMatrix {
    rules: [[DecisionRule; 3]; 3],
}

impl Default for DecisionMatrix {
    fn default() -> Self {
        use Action::{Decrease, Increase, Maintain};
        let rule = |action, factor, description: &str| DecisionRule::fixed(action, factor, description.to_string());
        Self {
            rules: [
                [
                    rule(Increase, 0.30, "Increase budget significantly"),
                    rule(Increase, 0.20, "Increase budget moderately"),
                    rule(Maintain, 0.0, "Maintain budget and monitor"),
                ],
                [
                    rule(Increase, 0.15, "Increase budget slightly"),
                    rule(Maintain, 0.0, "Maintain current budget"),
                    rule(Decrease, -0.10, "Reduce budget slightly"),
                ],
                [
                    rule(Maintain, 0.0, "Maintain budget and review strategy"),
                    rule(Decrease, -0.20, "Reduce budget moderately"),
                    rule(Decrease, -0.40, "Reduce budget significantly"),
                ],
            ],
        }
    }
}

/// Result of classification followed by matrix lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAdjustment {
    pub classification: Classification,
    pub rule: DecisionRule,
}

impl RawAdjustment {
    #[must_use]
    pub fn factor(&self) -> f64 {
        self.rule.factor()
    }
}

impl DecisionMatrix {
    /// Builds the matrix from a configuration section; empty means the default table.
    pub fn from_config(config: &MatrixConfig) -> EngineResult<Self> {
        if config.cells.is_empty() {
            return Ok(Self::default());
        }
        Self::from_cells(&config.cells)
    }

    /// Builds a matrix from exactly nine cells, one per tier pair.
    pub fn from_cells(cells: &[MatrixCell]) -> EngineResult<Self> {
        let mut rules = Self::default().rules;
        let mut seen = [[false; 3]; 3];

        for cell in cells {
            let (e, p) = (cell.efficiency.index(), cell.potential.index());
            if seen[e][p] {
                return Err(EngineError::Configuration(format!(
                    "duplicate matrix entry for efficiency={} potential={}",
                    cell.efficiency, cell.potential
                )));
            }
            let action = cell.action.unwrap_or_else(|| Action::from_factor(cell.factor));
            let description = cell.description.clone().unwrap_or_else(|| action.to_string());
            rules[e][p] = DecisionRule::new(action, cell.factor, description)?;
            seen[e][p] = true;
        }

        for efficiency in EfficiencyTier::ALL {
            for potential in PotentialTier::ALL {
                if !seen[efficiency.index()][potential.index()] {
                    return Err(EngineError::Configuration(format!(
                        "missing matrix entry for efficiency={efficiency} potential={potential}"
                    )));
                }
            }
        }
        Ok(Self { rules })
    }

    /// Returns the rule for a tier pair.
    #[must_use]
    pub fn lookup(&self, efficiency: EfficiencyTier, potential: PotentialTier) -> &DecisionRule {
        &self.rules[efficiency.index()][potential.index()]
    }

    /// Classifies a record and looks up its base rule. No side effects.
    pub fn compute_raw_adjustment(
        &self,
        classifier: &PerformanceClassifier,
        record: &ChannelPerformanceRecord,
        cross_channel_average_conversion: f64,
    ) -> EngineResult<RawAdjustment> {
        let classification = classifier.classify(record, cross_channel_average_conversion)?;
        let rule = self.lookup(classification.efficiency, classification.potential).clone();
        Ok(RawAdjustment { classification, rule })
    }

    /// All nine cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> Vec<MatrixCell> {
        EfficiencyTier::ALL
            .into_iter()
            .flat_map(|efficiency| {
                PotentialTier::ALL.into_iter().map(move |potential| (efficiency, potential))
            })
            .map(|(efficiency, potential)| {
                let rule = self.lookup(efficiency, potential);
                MatrixCell {
                    efficiency,
                    potential,
                    factor: rule.factor,
                    action: Some(rule.action),
                    description: Some(rule.description.clone()),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ChannelKey;

    #[test]
    fn test_default_factors() {
        let matrix = DecisionMatrix::default();
        let expected = [[0.30, 0.20, 0.0], [0.15, 0.0, -0.10], [0.0, -0.20, -0.40]];
        for efficiency in EfficiencyTier::ALL {
            for potential in PotentialTier::ALL {
                let rule = matrix.lookup(efficiency, potential);
                assert_eq!(rule.factor(), expected[efficiency.index()][potential.index()]);
            }
        }
    }

    #[test]
    fn test_default_matrix_is_monotonic_in_efficiency() {
        let matrix = DecisionMatrix::default();
        for potential in PotentialTier::ALL {
            let high = matrix.lookup(EfficiencyTier::High, potential).factor();
            let medium = matrix.lookup(EfficiencyTier::Medium, potential).factor();
            let low = matrix.lookup(EfficiencyTier::Low, potential).factor();
            assert!(high >= medium && medium >= low, "potential={potential}");
        }
    }

    #[test]
    fn test_cells_round_trip_through_from_cells() {
        let matrix = DecisionMatrix::default();
        let rebuilt = DecisionMatrix::from_cells(&matrix.cells()).unwrap();
        assert_eq!(rebuilt, matrix);
    }

    #[test]
    fn test_missing_cell_is_configuration_error() {
        let mut cells = DecisionMatrix::default().cells();
        cells.pop();
        let err = DecisionMatrix::from_cells(&cells).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(ref msg) if msg.contains("missing")));
    }

    #[test]
    fn test_duplicate_cell_is_configuration_error() {
        let mut cells = DecisionMatrix::default().cells();
        cells[8] = cells[0].clone();
        let err = DecisionMatrix::from_cells(&cells).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_factor_out_of_range_is_configuration_error() {
        let mut cells = DecisionMatrix::default().cells();
        cells[0].factor = 1.5;
        assert!(matches!(DecisionMatrix::from_cells(&cells), Err(EngineError::Configuration(_))));
    }

    #[test]
    fn test_action_derived_from_factor_when_omitted() {
        let mut cells = DecisionMatrix::default().cells();
        cells[4].action = None;
        cells[4].factor = 0.05;
        let matrix = DecisionMatrix::from_cells(&cells).unwrap();
        assert_eq!(matrix.lookup(EfficiencyTier::Medium, PotentialTier::Medium).action(), Action::Increase);
    }

    #[test]
    fn test_compute_raw_adjustment_is_pure() {
        let matrix = DecisionMatrix::default();
        let classifier = PerformanceClassifier::default();
        let record = ChannelPerformanceRecord::new(ChannelKey::new("c", "b", "x"), 1000.0, 150.0, 200.0, 0.15);
        let first = matrix.compute_raw_adjustment(&classifier, &record, 0.10).unwrap();
        let second = matrix.compute_raw_adjustment(&classifier, &record, 0.10).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.factor(), 0.30);
        assert_eq!(first.rule.action(), Action::Increase);
    }
}
