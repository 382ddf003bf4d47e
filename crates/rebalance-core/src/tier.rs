//! Performance tiers and budget actions.
//!
//! Tier naming follows cost efficiency, not the raw ratio: a `High` efficiency
//! tier means a *low* CPA relative to target and is paired with increases.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cost-efficiency tier derived from current_cpa / target_cpa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EfficiencyTier {
    /// Most cost-efficient (CPA well under target).
    High,
    Medium,
    /// Least cost-efficient (CPA well over target).
    Low,
}

/// Conversion potential tier relative to the cross-channel average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PotentialTier {
    High,
    Medium,
    Low,
}

macro_rules! tier_common {
    ($ty:ident) => {
        impl $ty {
            pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

            /// Position in the decision matrix.
            #[must_use]
            pub const fn index(self) -> usize {
                match self {
                    Self::High => 0,
                    Self::Medium => 1,
                    Self::Low => 2,
                }
            }

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    Self::High => "high",
                    Self::Medium => "medium",
                    Self::Low => "low",
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

tier_common!(EfficiencyTier);
tier_common!(PotentialTier);

/// What a decision rule recommends doing with a channel budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Increase,
    Decrease,
    Maintain,
}

impl Action {
    /// Action implied by the sign of an adjustment factor.
    #[must_use]
    pub fn from_factor(factor: f64) -> Self {
        if factor > 0.0 {
            Self::Increase
        } else if factor < 0.0 {
            Self::Decrease
        } else {
            Self::Maintain
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
            Self::Maintain => "maintain",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexes_are_distinct() {
        let idx: Vec<usize> = EfficiencyTier::ALL.iter().map(|t| t.index()).collect();
        assert_eq!(idx, vec![0, 1, 2]);
        assert_eq!(PotentialTier::Low.index(), 2);
    }

    #[test]
    fn test_action_from_factor() {
        assert_eq!(Action::from_factor(0.3), Action::Increase);
        assert_eq!(Action::from_factor(-0.1), Action::Decrease);
        assert_eq!(Action::from_factor(0.0), Action::Maintain);
    }

    #[test]
    fn test_tier_serde_lowercase() {
        let json = serde_json::to_string(&EfficiencyTier::High).unwrap();
        assert_eq!(json, "\"high\"");
        let tier: PotentialTier = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(tier, PotentialTier::Low);
    }
}
