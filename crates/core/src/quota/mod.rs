//! Daily counter gate shared by the generation quota and signup throttle.
//!
//! One algorithm, two instantiations: AI generations are capped per user
//! per UTC day, signups per IP address per UTC day. The gate exposes a
//! separate check and record step; two concurrent callers can both pass
//! the check before either records, so a ceiling can be exceeded by a
//! small margin. Callers that need a hard ceiling must not rely on this
//! gate alone.

use chrono::NaiveDate;

use crate::storage::{DailyCounterStore, Result};

/// Daily AI generations allowed per user.
pub const GENERATION_DAILY_CEILING: u32 = 10;

/// New accounts allowed per IP address per day.
pub const SIGNUP_DAILY_CEILING: u32 = 1;

/// Which persisted counter collection a gate operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKind {
    /// AI-generation quota, keyed by user identifier.
    GenerationQuota,
    /// Signup throttle, keyed by IP address.
    SignupThrottle,
}

impl CounterKind {
    /// Entity name used in error reporting.
    pub fn entity_type(&self) -> &'static str {
        match self {
            CounterKind::GenerationQuota => "DailyGenerationQuota",
            CounterKind::SignupThrottle => "SignupThrottle",
        }
    }
}

/// A ceiling-enforcing view over one counter collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaGate {
    kind: CounterKind,
    ceiling: u32,
}

impl QuotaGate {
    /// Creates a gate over the given counter collection.
    pub fn new(kind: CounterKind, ceiling: u32) -> Self {
        Self { kind, ceiling }
    }

    /// The generation quota gate with its default ceiling.
    pub fn generation() -> Self {
        Self::new(CounterKind::GenerationQuota, GENERATION_DAILY_CEILING)
    }

    /// The signup throttle gate with its default ceiling.
    pub fn signup() -> Self {
        Self::new(CounterKind::SignupThrottle, SIGNUP_DAILY_CEILING)
    }

    /// The counter collection this gate reads and writes.
    pub fn kind(&self) -> CounterKind {
        self.kind
    }

    /// The configured ceiling.
    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Returns true when the owner is still below the ceiling for `date`.
    ///
    /// Call before the gated action; call [`QuotaGate::record`] only after
    /// the action succeeds.
    pub async fn is_allowed(
        &self,
        store: &dyn DailyCounterStore,
        owner_key: &str,
        date: NaiveDate,
    ) -> Result<bool> {
        let count = store.get_count(self.kind, owner_key, date).await?;
        Ok(count < self.ceiling)
    }

    /// Records one consumed unit for the owner and date.
    pub async fn record(
        &self,
        store: &dyn DailyCounterStore,
        owner_key: &str,
        date: NaiveDate,
    ) -> Result<()> {
        store.increment(self.kind, owner_key, date).await
    }
}
