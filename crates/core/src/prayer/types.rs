use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle status of a prayer entry.
///
/// Persisted as the lowercase snake_case strings. The repository layer
/// never validates status values itself: callers parse incoming strings
/// with [`PrayerStatus::from_str`] before handing them to a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrayerStatus {
    New,
    Praying,
    Accomplished,
    ChangedOrNoLongerNeeded,
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown prayer status: {0}")]
pub struct StatusParseError(pub String);

impl PrayerStatus {
    /// Returns the persisted string form of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerStatus::New => "new",
            PrayerStatus::Praying => "praying",
            PrayerStatus::Accomplished => "accomplished",
            PrayerStatus::ChangedOrNoLongerNeeded => "changed_or_no_longer_needed",
        }
    }
}

impl FromStr for PrayerStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(PrayerStatus::New),
            "praying" => Ok(PrayerStatus::Praying),
            "accomplished" => Ok(PrayerStatus::Accomplished),
            "changed_or_no_longer_needed" => Ok(PrayerStatus::ChangedOrNoLongerNeeded),
            other => Err(StatusParseError(other.to_string())),
        }
    }
}

impl fmt::Display for PrayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for creating a new prayer entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrayer {
    pub text: String,
    pub status: PrayerStatus,
    pub is_ai_generated: bool,
    pub ai_generation_references: Option<String>,
}

impl NewPrayer {
    /// Creates parameters for a user-authored prayer with status `new`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: PrayerStatus::New,
            is_ai_generated: false,
            ai_generation_references: None,
        }
    }

    /// Creates parameters for an AI-generated prayer with its provenance.
    pub fn generated(text: impl Into<String>, references: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: PrayerStatus::New,
            is_ai_generated: true,
            ai_generation_references: Some(references.into()),
        }
    }

    /// Sets the initial status.
    pub fn with_status(mut self, status: PrayerStatus) -> Self {
        self.status = status;
        self
    }
}

/// Canonical in-memory shape of a prayer entry, independent of any backend.
///
/// Invariants every backend preserves: `updated_at >= created_at`, the
/// prayed-over count never decreases, and `has_been_changed` never resets
/// to false once set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerRecord {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub clicked_as_prayed_over_count: u32,
    pub has_been_changed: bool,
    pub status: PrayerStatus,
    pub is_ai_generated: bool,
    pub ai_generation_references: Option<String>,
}

impl PrayerRecord {
    /// Creates a fresh record from creation parameters.
    ///
    /// Assigns a new id and sets `created_at == updated_at == now`.
    pub fn new(params: NewPrayer) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            text: params.text,
            created_at: now,
            updated_at: now,
            clicked_as_prayed_over_count: 0,
            has_been_changed: false,
            status: params.status,
            is_ai_generated: params.is_ai_generated,
            ai_generation_references: params.ai_generation_references,
        }
    }

    /// Days elapsed since creation. Derived, never stored.
    pub fn age_in_days(&self) -> i64 {
        (Utc::now() - self.created_at).num_days()
    }
}
