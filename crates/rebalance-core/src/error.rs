//! Error types for the reallocation engine.

use chrono::NaiveDate;
use thiserror::Error;

use crate::record::ChannelKey;

/// Result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Input that cannot be evaluated. Raised for the whole batch, never per row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A mandatory field is absent.
    #[error("missing required field '{field}' in row {row}")]
    MissingField {
        /// Field name as it appears in the input table.
        field: &'static str,
        /// Zero-based row index.
        row: usize,
    },

    /// A field that must be strictly positive is not.
    #[error("field '{field}' must be > 0 for {key} (got {value})")]
    NonPositive {
        /// Field name.
        field: &'static str,
        /// Rejected value.
        value: f64,
        /// Channel the row belongs to.
        key: ChannelKey,
    },

    /// A field holds a value outside its domain.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Field name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A date range whose end does not come after its start.
    #[error("invalid date range for {context}: end {end} is not after start {start}")]
    InvalidDateRange {
        /// Campaign or channel the range belongs to.
        context: String,
        /// Range start.
        start: NaiveDate,
        /// Range end.
        end: NaiveDate,
    },

    /// The same (campaign, brand, channel) appears twice in one batch.
    #[error("duplicate channel key {0}")]
    DuplicateKey(ChannelKey),
}

/// Engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid input table.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Malformed thresholds or decision matrix.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl EngineError {
    /// Returns the validation error if this is one.
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_names_the_field() {
        let err = ValidationError::MissingField { field: "target_cpa", row: 2 };
        assert_eq!(err.to_string(), "missing required field 'target_cpa' in row 2");
    }

    #[test]
    fn test_engine_error_from_validation() {
        let err: EngineError = ValidationError::DuplicateKey(ChannelKey::new("c1", "b", "search")).into();
        assert!(matches!(err.as_validation(), Some(ValidationError::DuplicateKey(_))));
        assert!(err.to_string().contains("c1/b/search"));
    }

    #[test]
    fn test_engine_error_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: EngineError = io_err.into();
        match err {
            EngineError::Io(_) => {}
            _ => panic!("Expected Io error variant"),
        }
    }
}
