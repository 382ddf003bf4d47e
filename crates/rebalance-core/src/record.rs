//! Channel performance records and their validation.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineResult, ValidationError};

/// Identifies one performance row: (campaign, brand, channel).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelKey {
    pub campaign_id: String,
    pub brand: String,
    pub channel: String,
}

impl ChannelKey {
    #[must_use]
    pub fn new(campaign_id: impl Into<String>, brand: impl Into<String>, channel: impl Into<String>) -> Self {
        Self { campaign_id: campaign_id.into(), brand: brand.into(), channel: channel.into() }
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.campaign_id, self.brand, self.channel)
    }
}

/// Raw input row as read from a performance table.
///
/// Every field is optional so that a missing mandatory column surfaces as a
/// [`ValidationError::MissingField`] naming it rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceRow {
    pub campaign_id: Option<String>,
    pub brand: Option<String>,
    pub channel: Option<String>,
    pub budget_assigned: Option<f64>,
    pub budget_spent: Option<f64>,
    pub current_cpa: Option<f64>,
    pub target_cpa: Option<f64>,
    pub conversion_rate: Option<f64>,
    pub campaign_start: Option<NaiveDate>,
    pub campaign_end: Option<NaiveDate>,
}

/// Validated performance data for one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelPerformanceRecord {
    pub campaign_id: String,
    pub brand: String,
    pub channel: String,
    pub budget_assigned: f64,
    #[serde(default)]
    pub budget_spent: Option<f64>,
    pub current_cpa: f64,
    pub target_cpa: f64,
    pub conversion_rate: f64,
    #[serde(default)]
    pub campaign_start: Option<NaiveDate>,
    #[serde(default)]
    pub campaign_end: Option<NaiveDate>,
}

impl ChannelPerformanceRecord {
    /// Builds a record with the mandatory fields; dates and spend left unset.
    #[must_use]
    pub fn new(
        key: ChannelKey,
        budget_assigned: f64,
        current_cpa: f64,
        target_cpa: f64,
        conversion_rate: f64,
    ) -> Self {
        Self {
            campaign_id: key.campaign_id,
            brand: key.brand,
            channel: key.channel,
            budget_assigned,
            budget_spent: None,
            current_cpa,
            target_cpa,
            conversion_rate,
            campaign_start: None,
            campaign_end: None,
        }
    }

    /// Sets the campaign window.
    #[must_use]
    pub fn with_campaign(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.campaign_start = Some(start);
        self.campaign_end = Some(end);
        self
    }

    /// Sets the amount already spent.
    #[must_use]
    pub fn with_spent(mut self, spent: f64) -> Self {
        self.budget_spent = Some(spent);
        self
    }

    #[must_use]
    pub fn key(&self) -> ChannelKey {
        ChannelKey::new(&self.campaign_id, &self.brand, &self.channel)
    }

    /// current_cpa / target_cpa.
    #[must_use]
    pub fn cpa_ratio(&self) -> f64 {
        self.current_cpa / self.target_cpa
    }

    /// Converts a raw row, naming the first missing or invalid field.
    pub fn try_from_row(row: &PerformanceRow, index: usize) -> EngineResult<Self> {
        let missing = |field: &'static str| ValidationError::MissingField { field, row: index };

        let record = Self {
            campaign_id: row.campaign_id.clone().unwrap_or_default(),
            brand: row.brand.clone().unwrap_or_default(),
            channel: row.channel.clone().unwrap_or_default(),
            budget_assigned: row.budget_assigned.ok_or_else(|| missing("budget_assigned"))?,
            budget_spent: row.budget_spent,
            current_cpa: row.current_cpa.ok_or_else(|| missing("current_cpa"))?,
            target_cpa: row.target_cpa.ok_or_else(|| missing("target_cpa"))?,
            conversion_rate: row.conversion_rate.ok_or_else(|| missing("conversion_rate"))?,
            campaign_start: row.campaign_start,
            campaign_end: row.campaign_end,
        };
        record.validate()?;
        Ok(record)
    }

    /// Checks value domains.
    pub fn validate(&self) -> EngineResult<()> {
        let positive = |field: &'static str, value: f64| -> Result<(), ValidationError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ValidationError::NonPositive { field, value, key: self.key() })
            }
        };
        positive("target_cpa", self.target_cpa)?;
        positive("current_cpa", self.current_cpa)?;

        non_negative("budget_assigned", self.budget_assigned, &self.key())?;
        if let Some(spent) = self.budget_spent {
            non_negative("budget_spent", spent, &self.key())?;
        }
        non_negative("conversion_rate", self.conversion_rate, &self.key())?;
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64, key: &ChannelKey) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field,
            reason: format!("must be a finite value >= 0 for {key} (got {value})"),
        })
    }
}

/// Validates a whole table. The first invalid row fails the batch.
pub fn validate_batch(rows: &[PerformanceRow]) -> EngineResult<Vec<ChannelPerformanceRecord>> {
    let records = rows
        .iter()
        .enumerate()
        .map(|(index, row)| ChannelPerformanceRecord::try_from_row(row, index))
        .collect::<EngineResult<Vec<_>>>()?;
    ensure_unique_keys(&records)?;
    Ok(records)
}

/// Rejects batches that contain the same channel key twice.
pub fn ensure_unique_keys(records: &[ChannelPerformanceRecord]) -> EngineResult<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        let key = record.key();
        if !seen.insert(key.clone()) {
            return Err(ValidationError::DuplicateKey(key).into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_row() -> PerformanceRow {
        PerformanceRow {
            campaign_id: Some("2024-A".to_string()),
            brand: Some("North".to_string()),
            channel: Some("search".to_string()),
            budget_assigned: Some(1000.0),
            budget_spent: Some(250.0),
            current_cpa: Some(150.0),
            target_cpa: Some(200.0),
            conversion_rate: Some(0.15),
            campaign_start: None,
            campaign_end: None,
        }
    }

    #[test]
    fn test_try_from_row_accepts_complete_row() {
        let record = ChannelPerformanceRecord::try_from_row(&full_row(), 0).unwrap();
        assert_eq!(record.key(), ChannelKey::new("2024-A", "North", "search"));
        assert!((record.cpa_ratio() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_try_from_row_names_missing_field() {
        let row = PerformanceRow { conversion_rate: None, ..full_row() };
        let err = ChannelPerformanceRecord::try_from_row(&row, 4).unwrap_err();
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::MissingField { field: "conversion_rate", row: 4 })
        );
    }

    #[test]
    fn test_non_positive_target_cpa_rejected() {
        let row = PerformanceRow { target_cpa: Some(0.0), ..full_row() };
        let err = ChannelPerformanceRecord::try_from_row(&row, 0).unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::NonPositive { field: "target_cpa", .. })
        ));
    }

    #[test]
    fn test_negative_budget_rejected() {
        let row = PerformanceRow { budget_assigned: Some(-1.0), ..full_row() };
        assert!(ChannelPerformanceRecord::try_from_row(&row, 0).is_err());
    }

    #[test]
    fn test_validate_batch_fails_whole_batch() {
        let bad = PerformanceRow { current_cpa: None, ..full_row() };
        let good = PerformanceRow { channel: Some("social".to_string()), ..full_row() };
        let err = validate_batch(&[good, bad]).unwrap_err();
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::MissingField { field: "current_cpa", row: 1 })
        );
    }

    #[test]
    fn test_validate_batch_rejects_duplicate_keys() {
        let err = validate_batch(&[full_row(), full_row()]).unwrap_err();
        assert!(matches!(err.as_validation(), Some(ValidationError::DuplicateKey(_))));
    }
}
