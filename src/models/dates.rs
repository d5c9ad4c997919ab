//! Text encodings for instants and calendar dates
//!
//! Instants are stored as UTC RFC 3339 with fixed millisecond precision, so
//! string order in SQLite matches chronological order. Calendar days are ISO
//! `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Row;

use crate::db::{DbError, DbResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_instant(s: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::InvalidData(format!("bad timestamp '{}': {}", s, e)))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> DbResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| DbError::InvalidData(format!("bad date '{}' (expected YYYY-MM-DD): {}", s, e)))
}

fn conversion_failure(row: &Row, column: &str, err: DbError) -> rusqlite::Error {
    let idx = row.as_ref().column_index(column).unwrap_or(0);
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

/// Read an instant column from a row
pub(crate) fn row_instant(row: &Row, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    parse_instant(&raw).map_err(|e| conversion_failure(row, column, e))
}

/// Read a nullable date column from a row
pub(crate) fn row_date_opt(row: &Row, column: &str) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(column)?;
    raw.map(|s| parse_date(&s).map_err(|e| conversion_failure(row, column, e)))
        .transpose()
}

/// Read a date column from a row
pub(crate) fn row_date(row: &Row, column: &str) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(column)?;
    parse_date(&raw).map_err(|e| conversion_failure(row, column, e))
}
