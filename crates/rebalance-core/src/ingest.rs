//! Reading performance tables and campaign calendars.
//!
//! Readers parse only; the engine never touches the filesystem.

use std::io::Read;

use tracing::debug;

use crate::control_points::CampaignCalendarEntry;
use crate::error::{EngineResult, ValidationError};
use crate::record::{validate_batch, ChannelPerformanceRecord, PerformanceRow};

const CALENDAR_COLUMNS: [&str; 3] = ["campaign_id", "campaign_start", "campaign_end"];

/// Reads and validates a CSV performance table with snake_case headers.
pub fn read_performance_csv<R: Read>(reader: R) -> EngineResult<Vec<ChannelPerformanceRecord>> {
    let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let rows = csv.deserialize::<PerformanceRow>().collect::<Result<Vec<_>, _>>()?;
    debug!(rows = rows.len(), "Read performance CSV");
    validate_batch(&rows)
}

/// Reads and validates a JSON array of performance rows.
pub fn read_performance_json<R: Read>(reader: R) -> EngineResult<Vec<ChannelPerformanceRecord>> {
    let rows: Vec<PerformanceRow> = serde_json::from_reader(reader)?;
    debug!(rows = rows.len(), "Read performance JSON");
    validate_batch(&rows)
}

/// Reads a campaign calendar.
///
/// A missing column fails here even when the calendar has no rows. Empty date
/// cells are reported by the control point scheduler.
pub fn read_calendar_csv<R: Read>(reader: R) -> EngineResult<Vec<CampaignCalendarEntry>> {
    let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = csv.headers()?;
    if let Some(field) = CALENDAR_COLUMNS.into_iter().find(|column| !headers.iter().any(|h| h == *column)) {
        return Err(ValidationError::MissingField { field, row: 0 }.into());
    }
    let entries = csv.deserialize::<CampaignCalendarEntry>().collect::<Result<Vec<_>, _>>()?;
    debug!(entries = entries.len(), "Read campaign calendar");
    Ok(entries)
}
