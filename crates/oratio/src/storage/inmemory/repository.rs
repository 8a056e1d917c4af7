//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use oratio_core::prayer::{NewPrayer, PrayerRecord, PrayerStatus};
use oratio_core::quota::CounterKind;
use oratio_core::storage::{DailyCounterStore, PrayerRepository, RepositoryError, Result};

type CounterId = (CounterKind, String, NaiveDate);

/// In-memory storage backend for testing.
///
/// Uses HashMaps wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Data is not persisted and will be lost when the repository is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    prayers: Arc<RwLock<HashMap<Uuid, PrayerRecord>>>,
    counters: Arc<RwLock<HashMap<CounterId, u32>>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            prayers: Arc::new(RwLock::new(HashMap::new())),
            counters: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl PrayerRepository for InMemoryRepository {
    async fn list_prayers(&self) -> Result<Vec<PrayerRecord>> {
        let prayers = self.prayers.read().await;
        let mut records: Vec<PrayerRecord> = prayers.values().cloned().collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }

    async fn get_prayer(&self, id: Uuid) -> Result<Option<PrayerRecord>> {
        let prayers = self.prayers.read().await;
        Ok(prayers.get(&id).cloned())
    }

    async fn create_prayer(&self, params: NewPrayer) -> Result<PrayerRecord> {
        let record = PrayerRecord::new(params);
        let mut prayers = self.prayers.write().await;
        if prayers.contains_key(&record.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Prayer",
                id: record.id.to_string(),
            });
        }
        prayers.insert(record.id, record.clone());
        Ok(record)
    }

    async fn delete_prayer(&self, id: Uuid) -> Result<()> {
        let mut prayers = self.prayers.write().await;
        prayers.remove(&id);
        Ok(())
    }

    async fn increment_prayed_over(&self, id: Uuid) -> Result<()> {
        let mut prayers = self.prayers.write().await;
        if let Some(record) = prayers.get_mut(&id) {
            record.clicked_as_prayed_over_count += 1;
            record.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: PrayerStatus) -> Result<()> {
        let mut prayers = self.prayers.write().await;
        if let Some(record) = prayers.get_mut(&id) {
            record.status = status;
            record.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_text(&self, id: Uuid, text: &str) -> Result<()> {
        let mut prayers = self.prayers.write().await;
        if let Some(record) = prayers.get_mut(&id) {
            if record.text != text {
                record.has_been_changed = true;
            }
            record.text = text.to_string();
            record.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl DailyCounterStore for InMemoryRepository {
    async fn get_count(&self, kind: CounterKind, owner_key: &str, date: NaiveDate) -> Result<u32> {
        let counters = self.counters.read().await;
        Ok(counters
            .get(&(kind, owner_key.to_string(), date))
            .copied()
            .unwrap_or(0))
    }

    async fn increment(&self, kind: CounterKind, owner_key: &str, date: NaiveDate) -> Result<()> {
        let mut counters = self.counters.write().await;
        *counters
            .entry((kind, owner_key.to_string(), date))
            .or_insert(0) += 1;
        Ok(())
    }
}
