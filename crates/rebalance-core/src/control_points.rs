//! Periodic review checkpoints per campaign.
//!
//! Independent of the decision pipeline; consumes only a campaign calendar.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, EngineResult, ValidationError};

/// How often a matching weekday becomes a control point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every matching weekday.
    #[default]
    Weekly,
    /// Matching weekdays in even weeks counted from the campaign start.
    Biweekly,
    /// Matching weekdays in the first seven days of each month.
    Monthly,
}

impl Frequency {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(EngineError::Configuration(format!(
                "unknown control point frequency '{other}' (expected weekly, biweekly or monthly)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Initial,
    Mid,
    Final,
}

impl Phase {
    /// Phase for a progress percentage: below 33 initial, below 66 mid.
    #[must_use]
    pub fn from_progress(progress_pct: f64) -> Self {
        if progress_pct < 33.0 {
            Self::Initial
        } else if progress_pct < 66.0 {
            Self::Mid
        } else {
            Self::Final
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initial => "initial",
            Self::Mid => "mid",
            Self::Final => "final",
        })
    }
}

/// One row of a campaign calendar.
///
/// Required values are optional here so that `generate` can name the missing one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignCalendarEntry {
    pub campaign_id: Option<String>,
    pub campaign_start: Option<NaiveDate>,
    pub campaign_end: Option<NaiveDate>,
    pub brand: Option<String>,
    pub channel: Option<String>,
    pub budget_assigned: Option<f64>,
    pub target_cpa: Option<f64>,
}

impl CampaignCalendarEntry {
    #[must_use]
    pub fn new(campaign_id: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            campaign_id: Some(campaign_id.into()),
            campaign_start: Some(start),
            campaign_end: Some(end),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub campaign_id: String,
    pub control_date: NaiveDate,
    pub progress_pct: f64,
    pub days_remaining: i64,
    pub phase: Phase,
    /// False in the final stretch (progress >= 90%).
    pub adjustable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_assigned: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_cpa: Option<f64>,
}

/// Generates control points from a campaign calendar.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlPointScheduler;

impl ControlPointScheduler {
    /// One control point per campaign per matching day in [start, end].
    ///
    /// `weekdays` defaults to Monday. Output is sorted by (control_date, campaign_id).
    pub fn generate(
        &self,
        calendar: &[CampaignCalendarEntry],
        frequency: Frequency,
        weekdays: Option<&[Weekday]>,
    ) -> EngineResult<Vec<ControlPoint>> {
        let weekdays = weekdays.unwrap_or(&[Weekday::Mon]);
        if weekdays.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "weekdays",
                reason: "at least one weekday is required".to_string(),
            }
            .into());
        }

        let mut points = Vec::new();
        for (index, entry) in calendar.iter().enumerate() {
            let missing = |field: &'static str| ValidationError::MissingField { field, row: index };
            let campaign_id = entry.campaign_id.as_deref().ok_or_else(|| missing("campaign_id"))?;
            let start = entry.campaign_start.ok_or_else(|| missing("campaign_start"))?;
            let end = entry.campaign_end.ok_or_else(|| missing("campaign_end"))?;
            if end < start {
                return Err(ValidationError::InvalidDateRange {
                    context: format!("campaign {campaign_id}"),
                    start,
                    end,
                }
                .into());
            }

            let duration = (end - start).num_days();
            for date in start.iter_days().take_while(|d| *d <= end) {
                if !is_control_day(date, start, frequency, weekdays) {
                    continue;
                }
                let elapsed = (date - start).num_days();
                let progress_pct = if duration > 0 { elapsed as f64 / duration as f64 * 100.0 } else { 100.0 };
                points.push(ControlPoint {
                    campaign_id: campaign_id.to_string(),
                    control_date: date,
                    progress_pct,
                    days_remaining: (end - date).num_days(),
                    phase: Phase::from_progress(progress_pct),
                    adjustable: progress_pct < 90.0,
                    brand: entry.brand.clone(),
                    channel: entry.channel.clone(),
                    budget_assigned: entry.budget_assigned,
                    target_cpa: entry.target_cpa,
                });
            }
        }

        points.sort_by(|a, b| a.control_date.cmp(&b.control_date).then_with(|| a.campaign_id.cmp(&b.campaign_id)));
        info!(campaigns = calendar.len(), points = points.len(), %frequency, "Generated control points");
        Ok(points)
    }
}

fn is_control_day(date: NaiveDate, start: NaiveDate, frequency: Frequency, weekdays: &[Weekday]) -> bool {
    if !weekdays.contains(&date.weekday()) {
        return false;
    }
    match frequency {
        Frequency::Weekly => true,
        Frequency::Biweekly => ((date - start).num_days() / 7) % 2 == 0,
        Frequency::Monthly => date.day() <= 7,
    }
}
