//! Storage backend implementations.
//!
//! This module provides concrete implementations of the repository traits
//! defined in `oratio_core::storage`. The backend is selected once at
//! startup from [`crate::config::Config`] and threaded through as an
//! explicit dependency; nothing reads the environment at call time.

use std::sync::Arc;

use oratio_core::storage::{DailyCounterStore, PrayerRepository, Result};

use crate::config::{Config, StorageBackend};

pub mod dynamodb;
pub mod inmemory;
pub mod sqlite;

pub use dynamodb::DynamoDbRepository;
pub use inmemory::InMemoryRepository;
pub use sqlite::SqliteRepository;

/// Handles to the active storage backend.
///
/// Both handles point at the same underlying store; they are split so
/// callers depend only on the trait they use.
#[derive(Clone)]
pub struct Storage {
    pub prayers: Arc<dyn PrayerRepository>,
    pub counters: Arc<dyn DailyCounterStore>,
}

/// Connects to the backend named by the configuration.
pub async fn connect(config: &Config) -> Result<Storage> {
    match config.backend {
        StorageBackend::Sqlite => {
            tracing::info!(path = %config.sqlite_path, "Using SQLite storage");
            let repo = Arc::new(SqliteRepository::new(&config.sqlite_path).await?);
            Ok(Storage {
                prayers: repo.clone(),
                counters: repo,
            })
        }
        StorageBackend::DynamoDb => {
            tracing::info!(
                table = %config.dynamodb.prayers_table,
                region = %config.dynamodb.region,
                "Using DynamoDB storage"
            );
            let repo = Arc::new(DynamoDbRepository::connect(&config.dynamodb).await);
            Ok(Storage {
                prayers: repo.clone(),
                counters: repo,
            })
        }
        StorageBackend::InMemory => {
            tracing::info!("Using in-memory storage");
            let repo = Arc::new(InMemoryRepository::new());
            Ok(Storage {
                prayers: repo.clone(),
                counters: repo,
            })
        }
    }
}
