//! Database value parsing utilities
//!
//! Provides error-safe parsing of stored values.

use chrono::{DateTime, Utc};
use rusqlite::Error as SqlError;
use uuid::Uuid;

/// Parse a UUID from a database string column
pub fn parse_uuid(s: &str) -> Result<Uuid, SqlError> {
    Uuid::parse_str(s).map_err(|e| {
        SqlError::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse a DateTime from an RFC3339 string
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, SqlError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            SqlError::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Parse an optional DateTime from an RFC3339 string
pub fn parse_datetime_opt(s: Option<String>) -> Result<Option<DateTime<Utc>>, SqlError> {
    s.map(|s| parse_datetime(&s)).transpose()
}

/// Format a timestamp for storage.
///
/// Fixed-width UTC with millisecond precision so stored values compare
/// correctly as text.
pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Extension trait for converting rusqlite Results to Option
pub trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, SqlError>;
}

impl<T> OptionalExt<T> for Result<T, SqlError> {
    fn optional(self) -> Result<Option<T>, SqlError> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(SqlError::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
