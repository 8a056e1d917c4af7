//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! These are testable in isolation without database access.

use chrono::{DateTime, Utc};
use oratio_core::prayer::{PrayerRecord, PrayerStatus};
use rusqlite::Row;
use uuid::Uuid;

/// Convert a SQLite row to a PrayerRecord.
///
/// Expected columns: id, text, created_at, updated_at,
/// clicked_as_prayed_over_count, has_been_changed, status,
/// is_ai_generated, ai_generation_references
///
/// A malformed id, timestamp or status is fatal for the record.
pub fn row_to_prayer(row: &Row) -> rusqlite::Result<PrayerRecord> {
    let id: String = row.get(0)?;
    let text: String = row.get(1)?;
    let created_at: String = row.get(2)?;
    let updated_at: String = row.get(3)?;
    let clicked_as_prayed_over_count: u32 = row.get(4)?;
    let has_been_changed: bool = row.get(5)?;
    let status: String = row.get(6)?;
    let is_ai_generated: bool = row.get(7)?;
    let ai_generation_references: Option<String> = row.get(8)?;

    Ok(PrayerRecord {
        id: parse_uuid(&id)?,
        text,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
        clicked_as_prayed_over_count,
        has_been_changed,
        status: parse_status(&status)?,
        is_ai_generated,
        ai_generation_references,
    })
}

/// Format a datetime for storage (RFC 3339, keeps sub-second precision).
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn parse_uuid(s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn parse_status(s: &str) -> rusqlite::Result<PrayerStatus> {
    s.parse().map_err(|e: oratio_core::prayer::StatusParseError| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}
