//! DynamoDB storage backend.
//!
//! Eventually consistent: a freshly created record may be missing from an
//! immediately following `list_prayers` scan. Counter increments use the
//! `if_not_exists(count, 0) + 1` update expression so concurrent callers
//! never lose an update.

mod client;
mod conversions;
mod error;
mod repository;

pub use client::create_client;
pub use repository::DynamoDbRepository;
