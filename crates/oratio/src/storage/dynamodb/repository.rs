//! DynamoDB repository implementation.
//!
//! Implements the repository traits from `oratio_core::storage` using
//! DynamoDB. Listing is a full table scan followed by a client-side sort;
//! under eventual consistency the scan may miss a record created moments
//! earlier.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use oratio_core::prayer::{NewPrayer, PrayerRecord, PrayerStatus};
use oratio_core::quota::CounterKind;
use oratio_core::storage::{DailyCounterStore, PrayerRepository, Result};

use crate::config::DynamoDbConfig;

use super::client::create_client;
use super::conversions::{counter_key, get_u32, item_to_prayer, prayer_to_item};
use super::error::{
    map_delete_item_error, map_get_item_error, map_put_item_error, map_scan_error,
    map_update_item_error, update_condition_failed,
};

/// DynamoDB-based repository implementation.
///
/// Serves both the prayer repository and the daily counter store. The
/// client is owned explicitly; [`reconnect`](Self::reconnect) rebuilds it
/// after a configuration change.
pub struct DynamoDbRepository {
    client: Client,
    prayers_table: String,
    generation_quota_table: String,
    signup_throttle_table: String,
}

impl DynamoDbRepository {
    /// Creates a new repository with the given client and table names.
    pub fn new(client: Client, config: &DynamoDbConfig) -> Self {
        Self {
            client,
            prayers_table: config.prayers_table.clone(),
            generation_quota_table: config.generation_quota_table.clone(),
            signup_throttle_table: config.signup_throttle_table.clone(),
        }
    }

    /// Creates a new repository, building the client from the configuration.
    pub async fn connect(config: &DynamoDbConfig) -> Self {
        let client = create_client(config).await;
        Self::new(client, config)
    }

    /// Discards the current client and rebuilds it from the configuration.
    pub async fn reconnect(&mut self, config: &DynamoDbConfig) {
        self.client = create_client(config).await;
        self.prayers_table = config.prayers_table.clone();
        self.generation_quota_table = config.generation_quota_table.clone();
        self.signup_throttle_table = config.signup_throttle_table.clone();
    }

    fn counter_table(&self, kind: CounterKind) -> &str {
        match kind {
            CounterKind::GenerationQuota => &self.generation_quota_table,
            CounterKind::SignupThrottle => &self.signup_throttle_table,
        }
    }
}

/// Sort records newest-first, ties broken by id descending.
fn sort_newest_first(records: &mut [PrayerRecord]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[async_trait]
impl PrayerRepository for DynamoDbRepository {
    async fn list_prayers(&self) -> Result<Vec<PrayerRecord>> {
        let mut items = Vec::new();
        let mut exclusive_start_key = None;

        loop {
            let result = self
                .client
                .scan()
                .table_name(&self.prayers_table)
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await
                .map_err(map_scan_error)?;

            items.extend(result.items.unwrap_or_default());

            match result.last_evaluated_key {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
                _ => break,
            }
        }

        // A malformed item fails the whole listing rather than being skipped.
        let mut records = items
            .iter()
            .map(item_to_prayer)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn get_prayer(&self, id: Uuid) -> Result<Option<PrayerRecord>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.prayers_table)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| map_get_item_error(e, "Prayer", id.to_string()))?;

        match result.item {
            Some(item) => Ok(Some(item_to_prayer(&item)?)),
            None => Ok(None),
        }
    }

    async fn create_prayer(&self, params: NewPrayer) -> Result<PrayerRecord> {
        let record = PrayerRecord::new(params);
        let item = prayer_to_item(&record);

        self.client
            .put_item()
            .table_name(&self.prayers_table)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await
            .map_err(|e| map_put_item_error(e, "Prayer", record.id.to_string()))?;

        tracing::debug!(id = %record.id, "Prayer created");
        Ok(record)
    }

    async fn delete_prayer(&self, id: Uuid) -> Result<()> {
        // No condition expression: deleting an absent id is a no-op.
        self.client
            .delete_item()
            .table_name(&self.prayers_table)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| map_delete_item_error(e, "Prayer", id.to_string()))?;

        Ok(())
    }

    async fn increment_prayed_over(&self, id: Uuid) -> Result<()> {
        let result = self
            .client
            .update_item()
            .table_name(&self.prayers_table)
            .key("id", AttributeValue::S(id.to_string()))
            .update_expression(
                "SET clicked_as_prayed_over_count = \
                 if_not_exists(clicked_as_prayed_over_count, :zero) + :one, \
                 updated_at = :now",
            )
            .condition_expression("attribute_exists(id)")
            .expression_attribute_values(":zero", AttributeValue::N("0".to_string()))
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .expression_attribute_values(":now", AttributeValue::S(Utc::now().to_rfc3339()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            // Absent id is a no-op, not an error.
            Err(e) if update_condition_failed(&e) => Ok(()),
            Err(e) => Err(map_update_item_error(e, "Prayer", id.to_string())),
        }
    }

    async fn update_status(&self, id: Uuid, status: PrayerStatus) -> Result<()> {
        let result = self
            .client
            .update_item()
            .table_name(&self.prayers_table)
            .key("id", AttributeValue::S(id.to_string()))
            .update_expression("SET #s = :status, updated_at = :now")
            .condition_expression("attribute_exists(id)")
            .expression_attribute_names("#s", "status")
            .expression_attribute_values(":status", AttributeValue::S(status.as_str().to_string()))
            .expression_attribute_values(":now", AttributeValue::S(Utc::now().to_rfc3339()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if update_condition_failed(&e) => Ok(()),
            Err(e) => Err(map_update_item_error(e, "Prayer", id.to_string())),
        }
    }

    async fn update_text(&self, id: Uuid, text: &str) -> Result<()> {
        // The latching flag needs the current text, so this is a read
        // followed by a write. Counter increments are the only operations
        // with a hard lost-update guarantee; text edits are not.
        let existing = match self.get_prayer(id).await? {
            Some(record) => record,
            None => return Ok(()),
        };
        let has_been_changed = existing.has_been_changed || existing.text != text;

        let result = self
            .client
            .update_item()
            .table_name(&self.prayers_table)
            .key("id", AttributeValue::S(id.to_string()))
            .update_expression("SET #t = :text, has_been_changed = :changed, updated_at = :now")
            .condition_expression("attribute_exists(id)")
            .expression_attribute_names("#t", "text")
            .expression_attribute_values(":text", AttributeValue::S(text.to_string()))
            .expression_attribute_values(":changed", AttributeValue::Bool(has_been_changed))
            .expression_attribute_values(":now", AttributeValue::S(Utc::now().to_rfc3339()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            // Deleted between the read and the write: still a no-op.
            Err(e) if update_condition_failed(&e) => Ok(()),
            Err(e) => Err(map_update_item_error(e, "Prayer", id.to_string())),
        }
    }
}

#[async_trait]
impl DailyCounterStore for DynamoDbRepository {
    async fn get_count(&self, kind: CounterKind, owner_key: &str, date: NaiveDate) -> Result<u32> {
        let result = self
            .client
            .get_item()
            .table_name(self.counter_table(kind))
            .set_key(Some(counter_key(owner_key, date)))
            .send()
            .await
            .map_err(|e| {
                map_get_item_error(e, kind.entity_type(), format!("{owner_key}#{date}"))
            })?;

        match result.item {
            Some(item) => get_u32(&item, "count"),
            None => Ok(0),
        }
    }

    async fn increment(&self, kind: CounterKind, owner_key: &str, date: NaiveDate) -> Result<()> {
        // Server-side atomic upsert: creates the row at 1 on first call.
        self.client
            .update_item()
            .table_name(self.counter_table(kind))
            .set_key(Some(counter_key(owner_key, date)))
            .update_expression("SET #c = if_not_exists(#c, :zero) + :one")
            .expression_attribute_names("#c", "count")
            .expression_attribute_values(":zero", AttributeValue::N("0".to_string()))
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .send()
            .await
            .map_err(|e| {
                map_update_item_error(e, kind.entity_type(), format!("{owner_key}#{date}"))
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};

    fn record_at(ts: &str, id: &str) -> PrayerRecord {
        let at = DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc);
        PrayerRecord {
            id: Uuid::parse_str(id).unwrap(),
            text: "x".to_string(),
            created_at: at,
            updated_at: at,
            clicked_as_prayed_over_count: 0,
            has_been_changed: false,
            status: PrayerStatus::New,
            is_ai_generated: false,
            ai_generation_references: None,
        }
    }

    #[test]
    fn test_sort_newest_first() {
        let mut records = vec![
            record_at(
                "2026-08-24T10:00:00Z",
                "550e8400-e29b-41d4-a716-446655440001",
            ),
            record_at(
                "2026-08-24T12:00:00Z",
                "550e8400-e29b-41d4-a716-446655440002",
            ),
            record_at(
                "2026-08-24T11:00:00Z",
                "550e8400-e29b-41d4-a716-446655440003",
            ),
        ];

        sort_newest_first(&mut records);

        assert!(records[0].created_at > records[1].created_at);
        assert!(records[1].created_at > records[2].created_at);
        assert_eq!(
            records[0].created_at - records[2].created_at,
            Duration::hours(2)
        );
    }

    #[test]
    fn test_sort_breaks_created_at_ties_by_id_descending() {
        let mut records = vec![
            record_at(
                "2026-08-24T10:00:00Z",
                "550e8400-e29b-41d4-a716-446655440001",
            ),
            record_at(
                "2026-08-24T10:00:00Z",
                "550e8400-e29b-41d4-a716-446655440009",
            ),
        ];

        sort_newest_first(&mut records);

        assert!(records[0].id > records[1].id);
    }
}
