//! AI-generation boundary.
//!
//! The vendor call itself lives outside this crate: callers hand a prompt
//! and a length hint to a [`PrayerGenerator`] and get back generated text
//! with its provenance, or a failure. This core neither retries nor
//! caches that call.

mod response;

pub use response::parse_vendor_response;

use async_trait::async_trait;
use thiserror::Error;

/// Requested length of a generated prayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthHint {
    Short,
    #[default]
    Medium,
    Long,
}

impl LengthHint {
    /// Word range to request from the vendor.
    pub fn word_range(&self) -> &'static str {
        match self {
            LengthHint::Short => "0-100 words",
            LengthHint::Medium => "100-200 words",
            LengthHint::Long => "200-500 words",
        }
    }

    /// Parses a hint, falling back to `Medium` for unknown values.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "short" => LengthHint::Short,
            "long" => LengthHint::Long,
            _ => LengthHint::Medium,
        }
    }
}

/// Errors that can occur at the generation boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Generator not configured")]
    NotConfigured,
    #[error("Vendor error: {0}")]
    Vendor(String),
    #[error("Vendor response contained no text")]
    EmptyResponse,
}

/// A generated prayer with its provenance description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPrayer {
    pub text: String,
    pub references: String,
}

/// External prayer-generation collaborator.
///
/// Implementations are opaque, potentially slow and potentially failing.
#[async_trait]
pub trait PrayerGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        length: LengthHint,
    ) -> Result<GeneratedPrayer, GenerationError>;
}
