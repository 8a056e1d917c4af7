use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::prayer::{NewPrayer, PrayerRecord, PrayerStatus};
use crate::quota::CounterKind;

use super::Result;

/// Repository for prayer entry operations.
///
/// Every backend provides identical semantics: absent ids are a no-op for
/// `delete_prayer`, `increment_prayed_over`, `update_status` and
/// `update_text`, never an error. Increments are executed as a single
/// storage-level atomic update so concurrent callers never lose a count.
#[async_trait]
pub trait PrayerRepository: Send + Sync {
    /// Lists all prayers, newest first (`created_at` descending, ties
    /// broken by `id` descending).
    async fn list_prayers(&self) -> Result<Vec<PrayerRecord>>;

    /// Gets a prayer by its ID. Absent is `Ok(None)`, not an error.
    async fn get_prayer(&self, id: Uuid) -> Result<Option<PrayerRecord>>;

    /// Creates a new prayer and returns the stored record.
    async fn create_prayer(&self, params: NewPrayer) -> Result<PrayerRecord>;

    /// Deletes a prayer by its ID. Idempotent.
    async fn delete_prayer(&self, id: Uuid) -> Result<()>;

    /// Atomically adds 1 to the prayed-over counter and bumps `updated_at`.
    async fn increment_prayed_over(&self, id: Uuid) -> Result<()>;

    /// Sets the status and bumps `updated_at`.
    ///
    /// Enum membership is the caller's concern: parse untrusted input with
    /// `PrayerStatus::from_str` before calling this.
    async fn update_status(&self, id: Uuid, status: PrayerStatus) -> Result<()>;

    /// Replaces the text and bumps `updated_at`. When the new text differs
    /// from the stored text, `has_been_changed` is set permanently.
    async fn update_text(&self, id: Uuid, text: &str) -> Result<()>;
}

/// Store for per-(owner, date) daily counters.
///
/// Counters are created lazily on first increment and never deleted by
/// this subsystem. A new date starts fresh at zero by virtue of the
/// compound key; there is no reset step.
#[async_trait]
pub trait DailyCounterStore: Send + Sync {
    /// Returns the current count, `0` when no counter exists.
    async fn get_count(&self, kind: CounterKind, owner_key: &str, date: NaiveDate) -> Result<u32>;

    /// Atomic create-or-increment of the (owner, date) counter.
    ///
    /// Must not lose updates under concurrent callers for the same key.
    async fn increment(&self, kind: CounterKind, owner_key: &str, date: NaiveDate) -> Result<()>;
}
