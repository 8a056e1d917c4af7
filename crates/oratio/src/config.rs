//! Application configuration loaded from environment variables.
//!
//! The storage backend flag is resolved here exactly once, at startup.
//! Every other component receives the resolved value as an explicit
//! argument and never inspects the environment itself.

use std::{env, str::FromStr};

use oratio_core::quota::{GENERATION_DAILY_CEILING, SIGNUP_DAILY_CEILING};

/// Which storage backend the process runs against.
///
/// Switching the flag is a pure routing change: it does not migrate or
/// copy data between backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// SQLite file database (default).
    #[default]
    Sqlite,
    /// AWS DynamoDB tables.
    DynamoDb,
    /// Non-persistent in-memory store, for tests and local experiments.
    InMemory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "dynamodb" => Ok(StorageBackend::DynamoDb),
            "inmemory" => Ok(StorageBackend::InMemory),
            other => Err(format!(
                "Unknown storage backend '{other}' (expected sqlite, dynamodb or inmemory)"
            )),
        }
    }
}

/// Connection parameters for the DynamoDB backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamoDbConfig {
    /// Table holding prayer records.
    pub prayers_table: String,
    /// Table holding per-user daily generation counters.
    pub generation_quota_table: String,
    /// Table holding per-IP daily signup counters.
    pub signup_throttle_table: String,
    /// AWS region.
    pub region: String,
    /// Custom endpoint URL (for local DynamoDB).
    pub endpoint_url: Option<String>,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Active storage backend (default: sqlite).
    pub backend: StorageBackend,
    /// Path to SQLite database file (default: "oratio.db").
    pub sqlite_path: String,
    /// DynamoDB connection parameters.
    pub dynamodb: DynamoDbConfig,
    /// Daily AI generations allowed per user (default: 10).
    pub generation_daily_ceiling: u32,
    /// Daily signups allowed per IP address (default: 1).
    pub signup_daily_ceiling: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `STORAGE_BACKEND` - `sqlite`, `dynamodb` or `inmemory` (default: sqlite)
    /// - `SQLITE_PATH` - SQLite database path (default: "oratio.db")
    /// - `DDB_TABLE_NAME` - prayers table (default: "oratio-prayers")
    /// - `DDB_QUOTA_TABLE_NAME` - generation quota table (default: "oratio-generation-quota")
    /// - `DDB_THROTTLE_TABLE_NAME` - signup throttle table (default: "oratio-signup-throttle")
    /// - `AWS_REGION` - AWS region (default: "us-east-1")
    /// - `AWS_ENDPOINT_URL` - custom endpoint for local DynamoDB (default: unset)
    /// - `GENERATION_DAILY_CEILING` - generations per user per day (default: 10)
    /// - `SIGNUP_DAILY_CEILING` - signups per IP per day (default: 1)
    pub fn from_env() -> Self {
        Self {
            backend: env::var("STORAGE_BACKEND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "oratio.db".to_string()),
            dynamodb: DynamoDbConfig {
                prayers_table: env::var("DDB_TABLE_NAME")
                    .unwrap_or_else(|_| "oratio-prayers".to_string()),
                generation_quota_table: env::var("DDB_QUOTA_TABLE_NAME")
                    .unwrap_or_else(|_| "oratio-generation-quota".to_string()),
                signup_throttle_table: env::var("DDB_THROTTLE_TABLE_NAME")
                    .unwrap_or_else(|_| "oratio-signup-throttle".to_string()),
                region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                endpoint_url: env::var("AWS_ENDPOINT_URL").ok(),
            },
            generation_daily_ceiling: env::var("GENERATION_DAILY_CEILING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(GENERATION_DAILY_CEILING),
            signup_daily_ceiling: env::var("SIGNUP_DAILY_CEILING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(SIGNUP_DAILY_CEILING),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parsing() {
        assert_eq!(
            "sqlite".parse::<StorageBackend>().unwrap(),
            StorageBackend::Sqlite
        );
        assert_eq!(
            "DynamoDB".parse::<StorageBackend>().unwrap(),
            StorageBackend::DynamoDb
        );
        assert_eq!(
            "inmemory".parse::<StorageBackend>().unwrap(),
            StorageBackend::InMemory
        );
        assert!("postgres".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_default_values() {
        // Clear environment variables to test defaults
        env::remove_var("STORAGE_BACKEND");
        env::remove_var("SQLITE_PATH");
        env::remove_var("DDB_TABLE_NAME");
        env::remove_var("DDB_QUOTA_TABLE_NAME");
        env::remove_var("DDB_THROTTLE_TABLE_NAME");
        env::remove_var("AWS_REGION");
        env::remove_var("AWS_ENDPOINT_URL");
        env::remove_var("GENERATION_DAILY_CEILING");
        env::remove_var("SIGNUP_DAILY_CEILING");

        let config = Config::from_env();

        assert_eq!(config.backend, StorageBackend::Sqlite);
        assert_eq!(config.sqlite_path, "oratio.db");
        assert_eq!(config.dynamodb.prayers_table, "oratio-prayers");
        assert_eq!(config.dynamodb.region, "us-east-1");
        assert_eq!(config.dynamodb.endpoint_url, None);
        assert_eq!(config.generation_daily_ceiling, 10);
        assert_eq!(config.signup_daily_ceiling, 1);
    }
}
