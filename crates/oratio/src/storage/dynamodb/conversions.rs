//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps and
//! domain types. These are testable in isolation without DynamoDB access.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use oratio_core::prayer::{PrayerRecord, PrayerStatus};
use oratio_core::storage::RepositoryError;

/// Convert a PrayerRecord to a DynamoDB item.
pub fn prayer_to_item(prayer: &PrayerRecord) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();

    item.insert("id".to_string(), AttributeValue::S(prayer.id.to_string()));
    item.insert("text".to_string(), AttributeValue::S(prayer.text.clone()));
    item.insert(
        "created_at".to_string(),
        AttributeValue::S(prayer.created_at.to_rfc3339()),
    );
    item.insert(
        "updated_at".to_string(),
        AttributeValue::S(prayer.updated_at.to_rfc3339()),
    );
    item.insert(
        "clicked_as_prayed_over_count".to_string(),
        AttributeValue::N(prayer.clicked_as_prayed_over_count.to_string()),
    );
    item.insert(
        "has_been_changed".to_string(),
        AttributeValue::Bool(prayer.has_been_changed),
    );
    item.insert(
        "status".to_string(),
        AttributeValue::S(prayer.status.as_str().to_string()),
    );
    item.insert(
        "is_ai_generated".to_string(),
        AttributeValue::Bool(prayer.is_ai_generated),
    );
    if let Some(refs) = &prayer.ai_generation_references {
        item.insert(
            "ai_generation_references".to_string(),
            AttributeValue::S(refs.clone()),
        );
    }

    item
}

/// Convert a DynamoDB item to a PrayerRecord.
///
/// A malformed field is fatal for the record.
pub fn item_to_prayer(item: &HashMap<String, AttributeValue>) -> Result<PrayerRecord, RepositoryError> {
    Ok(PrayerRecord {
        id: get_uuid(item, "id")?,
        text: get_string(item, "text")?,
        created_at: get_datetime(item, "created_at")?,
        updated_at: get_datetime(item, "updated_at")?,
        clicked_as_prayed_over_count: get_u32(item, "clicked_as_prayed_over_count")?,
        has_been_changed: get_bool(item, "has_been_changed")?,
        status: parse_status(&get_string(item, "status")?)?,
        is_ai_generated: get_bool(item, "is_ai_generated")?,
        ai_generation_references: get_optional_string(item, "ai_generation_references"),
    })
}

/// Build the composite key for a daily counter item.
pub fn counter_key(owner_key: &str, date: chrono::NaiveDate) -> HashMap<String, AttributeValue> {
    let mut key = HashMap::new();
    key.insert(
        "owner_key".to_string(),
        AttributeValue::S(owner_key.to_string()),
    );
    key.insert("date".to_string(), AttributeValue::S(date.to_string()));
    key
}

/// Parse PrayerStatus from its stored string form.
pub fn parse_status(s: &str) -> Result<PrayerStatus, RepositoryError> {
    s.parse()
        .map_err(|_| RepositoryError::InvalidData(format!("Unknown status: {}", s)))
}

// ============================================================================
// Helper functions
// ============================================================================

/// Get a required string attribute.
fn get_string(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<String, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {}", key)))
}

/// Get an optional string attribute.
fn get_optional_string(item: &HashMap<String, AttributeValue>, key: &str) -> Option<String> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
}

/// Get a required UUID attribute.
fn get_uuid(item: &HashMap<String, AttributeValue>, key: &str) -> Result<Uuid, RepositoryError> {
    let s = get_string(item, key)?;
    Uuid::parse_str(&s)
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid UUID {}: {}", key, e)))
}

/// Get a required datetime attribute (RFC 3339 format).
fn get_datetime(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<DateTime<Utc>, RepositoryError> {
    let s = get_string(item, key)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid datetime {}: {}", key, e)))
}

/// Get a required numeric attribute as u32.
pub fn get_u32(item: &HashMap<String, AttributeValue>, key: &str) -> Result<u32, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_n().ok())
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {}", key)))?
        .parse::<u32>()
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid number {}: {}", key, e)))
}

/// Get a required boolean attribute.
fn get_bool(item: &HashMap<String, AttributeValue>, key: &str) -> Result<bool, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {}", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use oratio_core::prayer::NewPrayer;

    fn sample_prayer() -> PrayerRecord {
        PrayerRecord {
            id: Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap(),
            text: "Pray for strength".to_string(),
            created_at: DateTime::parse_from_rfc3339("2026-08-24T10:30:00.123456Z")
                .unwrap()
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339("2026-08-24T10:30:00.123456Z")
                .unwrap()
                .with_timezone(&Utc),
            clicked_as_prayed_over_count: 3,
            has_been_changed: true,
            status: PrayerStatus::Praying,
            is_ai_generated: true,
            ai_generation_references: Some("Psalm 23".to_string()),
        }
    }

    #[test]
    fn test_prayer_round_trip_preserves_every_field() {
        let prayer = sample_prayer();
        let item = prayer_to_item(&prayer);
        let parsed = item_to_prayer(&item).unwrap();

        assert_eq!(parsed, prayer);
        // Sub-second precision survives the string encoding.
        assert_eq!(parsed.created_at, prayer.created_at);
    }

    #[test]
    fn test_absent_references_round_trips_as_none() {
        let prayer = PrayerRecord::new(NewPrayer::new("x"));
        let item = prayer_to_item(&prayer);

        assert!(!item.contains_key("ai_generation_references"));
        let parsed = item_to_prayer(&item).unwrap();
        assert_eq!(parsed.ai_generation_references, None);
    }

    #[test]
    fn test_missing_required_field_is_fatal() {
        let prayer = sample_prayer();
        let mut item = prayer_to_item(&prayer);
        item.remove("created_at");

        assert!(matches!(
            item_to_prayer(&item),
            Err(RepositoryError::InvalidData(_))
        ));
    }

    #[test]
    fn test_malformed_timestamp_is_fatal() {
        let prayer = sample_prayer();
        let mut item = prayer_to_item(&prayer);
        item.insert(
            "updated_at".to_string(),
            AttributeValue::S("yesterday".to_string()),
        );

        assert!(item_to_prayer(&item).is_err());
    }

    #[test]
    fn test_unknown_status_is_fatal() {
        let prayer = sample_prayer();
        let mut item = prayer_to_item(&prayer);
        item.insert("status".to_string(), AttributeValue::S("done".to_string()));

        assert!(item_to_prayer(&item).is_err());
    }

    #[test]
    fn test_counter_key_layout() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        let key = counter_key("1.2.3.4", date);

        assert_eq!(key.get("owner_key").unwrap().as_s().unwrap(), "1.2.3.4");
        assert_eq!(key.get("date").unwrap().as_s().unwrap(), "2026-08-24");
    }
}
