//! Application services composing the repositories with the quota gates.
//!
//! The suggestion flow is check-then-act: the gate is consulted before the
//! vendor call, and the quota unit is recorded only after the vendor call
//! succeeds. Two concurrent requests from the same user can both pass the
//! check, so the ceiling is a soft limit.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use async_trait::async_trait;
use oratio_core::generation::{GeneratedPrayer, GenerationError, LengthHint, PrayerGenerator};
use oratio_core::prayer::{NewPrayer, PrayerRecord};
use oratio_core::quota::QuotaGate;
use oratio_core::storage::{DailyCounterStore, PrayerRepository, RepositoryError};

/// Errors from the suggestion flow.
#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("Daily generation quota exceeded")]
    QuotaExceeded,
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Generates prayer suggestions under the per-user daily quota.
pub struct SuggestionService {
    prayers: Arc<dyn PrayerRepository>,
    counters: Arc<dyn DailyCounterStore>,
    generator: Arc<dyn PrayerGenerator>,
    gate: QuotaGate,
}

impl SuggestionService {
    pub fn new(
        prayers: Arc<dyn PrayerRepository>,
        counters: Arc<dyn DailyCounterStore>,
        generator: Arc<dyn PrayerGenerator>,
    ) -> Self {
        Self::with_gate(prayers, counters, generator, QuotaGate::generation())
    }

    /// Builds a service with a custom gate, for non-default ceilings.
    pub fn with_gate(
        prayers: Arc<dyn PrayerRepository>,
        counters: Arc<dyn DailyCounterStore>,
        generator: Arc<dyn PrayerGenerator>,
        gate: QuotaGate,
    ) -> Self {
        Self {
            prayers,
            counters,
            generator,
            gate,
        }
    }

    /// Generates a prayer for the user and persists it.
    ///
    /// The quota unit is consumed only after generation succeeds, so a
    /// failing vendor call does not burn quota.
    pub async fn suggest(
        &self,
        user_key: &str,
        prompt: &str,
        length: LengthHint,
    ) -> Result<PrayerRecord, SuggestError> {
        let today = Utc::now().date_naive();

        if !self
            .gate
            .is_allowed(self.counters.as_ref(), user_key, today)
            .await?
        {
            tracing::info!(user = %user_key, "Generation quota exhausted");
            return Err(SuggestError::QuotaExceeded);
        }

        let generated = self.generator.generate(prompt, length).await?;

        self.gate
            .record(self.counters.as_ref(), user_key, today)
            .await?;

        let record = self
            .prayers
            .create_prayer(NewPrayer::generated(generated.text, generated.references))
            .await?;

        tracing::debug!(id = %record.id, user = %user_key, "Suggestion persisted");
        Ok(record)
    }
}

/// Generator stand-in used when no vendor client is configured.
///
/// Every call reports [`GenerationError::NotConfigured`], so the
/// suggestion flow runs its quota check but persists nothing and burns
/// no quota.
pub struct UnconfiguredGenerator;

#[async_trait]
impl PrayerGenerator for UnconfiguredGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _length: LengthHint,
    ) -> Result<GeneratedPrayer, GenerationError> {
        Err(GenerationError::NotConfigured)
    }
}

/// Limits account creation per source IP per UTC day.
pub struct SignupPolicy {
    counters: Arc<dyn DailyCounterStore>,
    gate: QuotaGate,
}

impl SignupPolicy {
    pub fn new(counters: Arc<dyn DailyCounterStore>) -> Self {
        Self::with_gate(counters, QuotaGate::signup())
    }

    /// Builds a policy with a custom gate, for non-default ceilings.
    pub fn with_gate(counters: Arc<dyn DailyCounterStore>, gate: QuotaGate) -> Self {
        Self { counters, gate }
    }

    /// Whether the IP is still below today's signup ceiling.
    pub async fn is_open_for_signup(&self, ip: &str) -> Result<bool, RepositoryError> {
        let today = Utc::now().date_naive();
        self.gate.is_allowed(self.counters.as_ref(), ip, today).await
    }

    /// Records one completed signup for the IP.
    pub async fn record_signup(&self, ip: &str) -> Result<(), RepositoryError> {
        let today = Utc::now().date_naive();
        self.gate.record(self.counters.as_ref(), ip, today).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryRepository;
    use async_trait::async_trait;
    use oratio_core::generation::GeneratedPrayer;
    use oratio_core::prayer::PrayerStatus;
    use oratio_core::quota::{CounterKind, GENERATION_DAILY_CEILING};

    struct StubGenerator {
        fail: bool,
    }

    #[async_trait]
    impl PrayerGenerator for StubGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _length: LengthHint,
        ) -> Result<GeneratedPrayer, GenerationError> {
            if self.fail {
                return Err(GenerationError::Vendor("boom".to_string()));
            }
            Ok(GeneratedPrayer {
                text: format!("A prayer about {prompt}"),
                references: "Psalm 23".to_string(),
            })
        }
    }

    fn service(repo: &Arc<InMemoryRepository>, fail: bool) -> SuggestionService {
        SuggestionService::new(
            repo.clone(),
            repo.clone(),
            Arc::new(StubGenerator { fail }),
        )
    }

    #[tokio::test]
    async fn test_suggest_persists_generated_prayer() {
        let repo = Arc::new(InMemoryRepository::new());
        let service = service(&repo, false);

        let record = service
            .suggest("user-1", "courage", LengthHint::Medium)
            .await
            .unwrap();

        assert!(record.is_ai_generated);
        assert_eq!(record.status, PrayerStatus::New);
        assert_eq!(record.ai_generation_references.as_deref(), Some("Psalm 23"));
        assert!(repo.get_prayer(record.id).await.unwrap().is_some());

        let today = Utc::now().date_naive();
        assert_eq!(
            repo.get_count(CounterKind::GenerationQuota, "user-1", today)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_suggest_rejects_at_ceiling() {
        let repo = Arc::new(InMemoryRepository::new());
        let service = service(&repo, false);

        for _ in 0..GENERATION_DAILY_CEILING {
            service
                .suggest("user-1", "courage", LengthHint::Short)
                .await
                .unwrap();
        }

        let result = service.suggest("user-1", "courage", LengthHint::Short).await;
        assert!(matches!(result, Err(SuggestError::QuotaExceeded)));

        // Another user is unaffected.
        service
            .suggest("user-2", "courage", LengthHint::Short)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_failed_generation_burns_no_quota() {
        let repo = Arc::new(InMemoryRepository::new());
        let service = service(&repo, true);

        let result = service.suggest("user-1", "courage", LengthHint::Long).await;
        assert!(matches!(result, Err(SuggestError::Generation(_))));

        let today = Utc::now().date_naive();
        assert_eq!(
            repo.get_count(CounterKind::GenerationQuota, "user-1", today)
                .await
                .unwrap(),
            0
        );
        assert!(repo.list_prayers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_generator_surfaces_not_configured() {
        let repo = Arc::new(InMemoryRepository::new());
        let service = SuggestionService::new(
            repo.clone(),
            repo.clone(),
            Arc::new(UnconfiguredGenerator),
        );

        let result = service.suggest("user-1", "courage", LengthHint::Medium).await;
        assert!(matches!(
            result,
            Err(SuggestError::Generation(GenerationError::NotConfigured))
        ));

        let today = Utc::now().date_naive();
        assert_eq!(
            repo.get_count(CounterKind::GenerationQuota, "user-1", today)
                .await
                .unwrap(),
            0
        );
        assert!(repo.list_prayers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_signup_policy_enforces_one_per_ip_per_day() {
        let repo = Arc::new(InMemoryRepository::new());
        let policy = SignupPolicy::new(repo.clone());

        assert!(policy.is_open_for_signup("1.2.3.4").await.unwrap());
        policy.record_signup("1.2.3.4").await.unwrap();

        assert!(!policy.is_open_for_signup("1.2.3.4").await.unwrap());
        assert!(policy.is_open_for_signup("5.6.7.8").await.unwrap());
    }
}
