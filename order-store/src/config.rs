//! Store configuration
//!
//! Connection pool sizing and transaction retry bounds for the order store.

use std::time::Duration;

use crate::retry::RetryPolicy;

/// Order store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Postgres-wire connection string (Postgres or CockroachDB)
    pub database_url: String,

    /// Maximum connections held by the pool
    pub max_connections: u32,

    /// How long to wait for a pooled connection before failing
    pub acquire_timeout: Duration,

    /// Total attempts for a conflicting transaction
    pub tx_max_attempts: u32,

    /// Backoff before the first transaction retry
    pub tx_initial_backoff: Duration,

    /// Upper bound for a single transaction retry backoff
    pub tx_max_backoff: Duration,
}

impl StoreConfig {
    /// Creates a new configuration with defaults
    pub fn new(database_url: String) -> Self {
        let retry = RetryPolicy::default();
        Self {
            database_url,
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
            tx_max_attempts: retry.max_attempts,
            tx_initial_backoff: retry.initial_backoff,
            tx_max_backoff: retry.max_backoff,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - DATABASE_URL (required)
    /// - DB_MAX_CONNECTIONS (optional, default: 10)
    /// - DB_ACQUIRE_TIMEOUT (optional, seconds, default: 5)
    /// - TX_MAX_ATTEMPTS (optional, default: 5)
    /// - TX_INITIAL_BACKOFF_MS (optional, default: 50)
    /// - TX_MAX_BACKOFF_MS (optional, default: 2000)
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable not set"))?;

        let defaults = Self::new(database_url);

        let max_connections = env_parse("DB_MAX_CONNECTIONS").unwrap_or(defaults.max_connections);

        let acquire_timeout = env_parse("DB_ACQUIRE_TIMEOUT")
            .map(Duration::from_secs)
            .unwrap_or(defaults.acquire_timeout);

        let tx_max_attempts = env_parse("TX_MAX_ATTEMPTS").unwrap_or(defaults.tx_max_attempts);

        let tx_initial_backoff = env_parse("TX_INITIAL_BACKOFF_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.tx_initial_backoff);

        let tx_max_backoff = env_parse("TX_MAX_BACKOFF_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.tx_max_backoff);

        Ok(Self {
            max_connections,
            acquire_timeout,
            tx_max_attempts,
            tx_initial_backoff,
            tx_max_backoff,
            ..defaults
        })
    }

    /// Retry policy for `execute_tx`
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.tx_max_attempts,
            initial_backoff: self.tx_initial_backoff,
            max_backoff: self.tx_max_backoff,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.is_empty() {
            anyhow::bail!("database_url cannot be empty");
        }

        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            anyhow::bail!("database_url must start with postgres:// or postgresql://");
        }

        if self.max_connections == 0 {
            anyhow::bail!("max_connections must be greater than 0");
        }

        if self.tx_max_attempts == 0 {
            anyhow::bail!("tx_max_attempts must be greater than 0");
        }

        if self.tx_initial_backoff > self.tx_max_backoff {
            anyhow::bail!("tx_initial_backoff must not exceed tx_max_backoff");
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse::<T>().ok())
}
