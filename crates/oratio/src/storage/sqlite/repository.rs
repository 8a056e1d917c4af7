//! SQLite repository implementation.
//!
//! Implements the repository traits from `oratio_core::storage` using
//! SQLite. Each statement runs inside its own implicit transaction;
//! increments use server-side arithmetic so the engine's row locking
//! serializes concurrent writers.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use oratio_core::prayer::{NewPrayer, PrayerRecord, PrayerStatus};
use oratio_core::quota::CounterKind;
use oratio_core::storage::{DailyCounterStore, PrayerRepository, RepositoryError, Result};

use super::conversions::{format_datetime, row_to_prayer};
use super::error::map_tokio_rusqlite_error;
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

fn counter_queries(kind: CounterKind) -> (&'static str, &'static str) {
    match kind {
        CounterKind::GenerationQuota => (
            schema::SELECT_GENERATION_QUOTA,
            schema::INCREMENT_GENERATION_QUOTA,
        ),
        CounterKind::SignupThrottle => (
            schema::SELECT_SIGNUP_THROTTLE,
            schema::INCREMENT_SIGNUP_THROTTLE,
        ),
    }
}

/// SQLite-based repository implementation.
///
/// Serves both the prayer repository and the daily counter store.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Initialize the database schema.
    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }
}

#[async_trait]
impl PrayerRepository for SqliteRepository {
    async fn list_prayers(&self) -> Result<Vec<PrayerRecord>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_ALL_PRAYERS)
                    .map_err(wrap_err)?;
                let rows = stmt.query_map([], row_to_prayer).map_err(wrap_err)?;

                let mut prayers = Vec::new();
                for row_result in rows {
                    prayers.push(row_result.map_err(wrap_err)?);
                }
                Ok(prayers)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Prayer", "all"))
    }

    async fn get_prayer(&self, id: Uuid) -> Result<Option<PrayerRecord>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_PRAYER_BY_ID)
                    .map_err(wrap_err)?;
                match stmt.query_row([&id_str], row_to_prayer) {
                    Ok(prayer) => Ok(Some(prayer)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Prayer", id.to_string()))
    }

    async fn create_prayer(&self, params: NewPrayer) -> Result<PrayerRecord> {
        let record = PrayerRecord::new(params);

        let id = record.id.to_string();
        let text = record.text.clone();
        let created_at = format_datetime(&record.created_at);
        let updated_at = format_datetime(&record.updated_at);
        let count = record.clicked_as_prayed_over_count;
        let has_been_changed = record.has_been_changed;
        let status = record.status.as_str();
        let is_ai_generated = record.is_ai_generated;
        let references = record.ai_generation_references.clone();
        let record_id = record.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_PRAYER,
                    rusqlite::params![
                        id,
                        text,
                        created_at,
                        updated_at,
                        count,
                        has_been_changed,
                        status,
                        is_ai_generated,
                        references
                    ],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Prayer", record_id))?;

        tracing::debug!(id = %record.id, "Prayer created");
        Ok(record)
    }

    async fn delete_prayer(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();

        // Zero affected rows is fine: delete is idempotent.
        self.conn
            .call(move |conn| {
                conn.execute(schema::DELETE_PRAYER, [&id_str])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Prayer", id.to_string()))
    }

    async fn increment_prayed_over(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        let now = format_datetime(&Utc::now());

        // No-op when the id is absent (zero affected rows).
        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INCREMENT_PRAYED_OVER,
                    rusqlite::params![id_str, now],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Prayer", id.to_string()))
    }

    async fn update_status(&self, id: Uuid, status: PrayerStatus) -> Result<()> {
        let id_str = id.to_string();
        let now = format_datetime(&Utc::now());

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::UPDATE_STATUS,
                    rusqlite::params![id_str, status.as_str(), now],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Prayer", id.to_string()))
    }

    async fn update_text(&self, id: Uuid, text: &str) -> Result<()> {
        let id_str = id.to_string();
        let text = text.to_string();
        let now = format_datetime(&Utc::now());

        self.conn
            .call(move |conn| {
                conn.execute(schema::UPDATE_TEXT, rusqlite::params![id_str, text, now])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Prayer", id.to_string()))
    }
}

#[async_trait]
impl DailyCounterStore for SqliteRepository {
    async fn get_count(&self, kind: CounterKind, owner_key: &str, date: NaiveDate) -> Result<u32> {
        let (select_sql, _) = counter_queries(kind);
        let owner = owner_key.to_string();
        let date_str = date.to_string();
        let key = format!("{owner_key}#{date}");

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(select_sql).map_err(wrap_err)?;
                match stmt.query_row([&owner, &date_str], |row| row.get::<_, u32>(0)) {
                    Ok(count) => Ok(count),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, kind.entity_type(), key))
    }

    async fn increment(&self, kind: CounterKind, owner_key: &str, date: NaiveDate) -> Result<()> {
        let (_, increment_sql) = counter_queries(kind);
        let owner = owner_key.to_string();
        let date_str = date.to_string();
        let key = format!("{owner_key}#{date}");

        self.conn
            .call(move |conn| {
                conn.execute(increment_sql, rusqlite::params![owner, date_str])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, kind.entity_type(), key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    async fn repo() -> SqliteRepository {
        SqliteRepository::new_in_memory()
            .await
            .expect("in-memory database")
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips() {
        let repo = repo().await;

        let created = repo
            .create_prayer(NewPrayer::new("Pray for strength"))
            .await
            .unwrap();
        let fetched = repo.get_prayer(created.id).await.unwrap().unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.text, "Pray for strength");
        assert_eq!(fetched.status, PrayerStatus::New);
        assert!(!fetched.has_been_changed);
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[tokio::test]
    async fn test_round_trip_preserves_subsecond_timestamps() {
        let repo = repo().await;

        let created = repo.create_prayer(NewPrayer::new("x")).await.unwrap();
        let fetched = repo.get_prayer(created.id).await.unwrap().unwrap();

        assert_eq!(fetched.created_at, created.created_at);
        assert_eq!(fetched.updated_at, created.updated_at);
    }

    #[tokio::test]
    async fn test_get_absent_is_none() {
        let repo = repo().await;
        assert!(repo.get_prayer(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = repo().await;

        let created = repo.create_prayer(NewPrayer::new("x")).await.unwrap();
        repo.delete_prayer(created.id).await.unwrap();
        assert!(repo.get_prayer(created.id).await.unwrap().is_none());

        // Second delete of the same id does not error.
        repo.delete_prayer(created.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_mutations_on_absent_id_are_noops() {
        let repo = repo().await;
        let id = Uuid::new_v4();

        repo.increment_prayed_over(id).await.unwrap();
        repo.update_status(id, PrayerStatus::Praying).await.unwrap();
        repo.update_text(id, "new text").await.unwrap();
        assert!(repo.get_prayer(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let repo = repo().await;

        let first = repo.create_prayer(NewPrayer::new("first")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = repo.create_prayer(NewPrayer::new("second")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let third = repo.create_prayer(NewPrayer::new("third")).await.unwrap();

        let listed = repo.list_prayers().await.unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn test_status_flow_scenario() {
        let repo = repo().await;

        let created = repo
            .create_prayer(NewPrayer::new("Pray for strength"))
            .await
            .unwrap();
        assert_eq!(created.status, PrayerStatus::New);

        repo.update_status(created.id, PrayerStatus::Praying)
            .await
            .unwrap();
        repo.increment_prayed_over(created.id).await.unwrap();
        repo.increment_prayed_over(created.id).await.unwrap();

        let fetched = repo.get_prayer(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, PrayerStatus::Praying);
        assert_eq!(fetched.clicked_as_prayed_over_count, 2);
        assert!(fetched.updated_at >= fetched.created_at);
    }

    #[tokio::test]
    async fn test_concurrent_increments_lose_nothing() {
        let repo = Arc::new(repo().await);
        let created = repo.create_prayer(NewPrayer::new("x")).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let repo = repo.clone();
            let id = created.id;
            handles.push(tokio::spawn(
                async move { repo.increment_prayed_over(id).await },
            ));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let fetched = repo.get_prayer(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.clicked_as_prayed_over_count, 20);
    }

    #[tokio::test]
    async fn test_update_text_latches_changed_flag() {
        let repo = repo().await;
        let created = repo.create_prayer(NewPrayer::new("original")).await.unwrap();

        // Writing back the same text leaves the flag unset.
        repo.update_text(created.id, "original").await.unwrap();
        let same = repo.get_prayer(created.id).await.unwrap().unwrap();
        assert!(!same.has_been_changed);

        repo.update_text(created.id, "edited").await.unwrap();
        let edited = repo.get_prayer(created.id).await.unwrap().unwrap();
        assert!(edited.has_been_changed);
        assert_eq!(edited.text, "edited");

        // Restoring the original text never resets the flag.
        repo.update_text(created.id, "original").await.unwrap();
        let restored = repo.get_prayer(created.id).await.unwrap().unwrap();
        assert!(restored.has_been_changed);
    }

    #[tokio::test]
    async fn test_counters_start_at_zero_and_accumulate() {
        let repo = repo().await;
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();

        assert_eq!(
            repo.get_count(CounterKind::GenerationQuota, "user-1", date)
                .await
                .unwrap(),
            0
        );

        for _ in 0..3 {
            repo.increment(CounterKind::GenerationQuota, "user-1", date)
                .await
                .unwrap();
        }
        assert_eq!(
            repo.get_count(CounterKind::GenerationQuota, "user-1", date)
                .await
                .unwrap(),
            3
        );

        // A different date for the same owner starts fresh.
        let next_day = date.succ_opt().unwrap();
        assert_eq!(
            repo.get_count(CounterKind::GenerationQuota, "user-1", next_day)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_counter_kinds_are_isolated() {
        let repo = repo().await;
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();

        repo.increment(CounterKind::SignupThrottle, "1.2.3.4", date)
            .await
            .unwrap();

        assert_eq!(
            repo.get_count(CounterKind::SignupThrottle, "1.2.3.4", date)
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            repo.get_count(CounterKind::GenerationQuota, "1.2.3.4", date)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_concurrent_counter_increments_lose_nothing() {
        let repo = Arc::new(repo().await);
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.increment(CounterKind::GenerationQuota, "user-1", date)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(
            repo.get_count(CounterKind::GenerationQuota, "user-1", date)
                .await
                .unwrap(),
            20
        );
    }
}
