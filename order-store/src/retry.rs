//! Transaction retry
//!
//! Distributed SQL stores abort transactions with serialization conflicts
//! (SQLSTATE 40001) that the client must resolve by re-running the whole
//! transaction. `execute_tx` wraps a unit of work in begin/commit and re-runs
//! it with exponential backoff until it commits, fails with a non-retryable
//! error, or runs out of attempts.

use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;
use sqlx::{PgConnection, PgPool};

use crate::context::OpContext;
use crate::error::{RepositoryError, Result};

/// Bounds for transaction retries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,

    /// Backoff before the second attempt
    pub initial_backoff: Duration,

    /// Upper bound for any single backoff
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Backoff to wait after `attempt` (1-based) failed
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_secs(2),
        }
    }
}

/// Re-runs `op` while it fails with a retryable error
///
/// `op` receives the 1-based attempt number. Non-retryable errors are returned
/// as is; a retryable error on the last attempt becomes `RetriesExhausted`.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, ctx: &OpContext, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match ctx.run(op(attempt)).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() => {
                if attempt >= max_attempts {
                    return Err(RepositoryError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    });
                }

                let backoff = policy.backoff(attempt);
                tracing::warn!(
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "Retrying transaction"
                );
                ctx.sleep(backoff).await?;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Runs `body` inside a transaction, retrying the whole transaction on conflict
///
/// Each attempt begins a fresh transaction. A failed attempt is rolled back when
/// its transaction is dropped, so rows from an aborted attempt never persist.
pub async fn execute_tx<T, F>(
    pool: &PgPool,
    policy: &RetryPolicy,
    ctx: &OpContext,
    body: F,
) -> Result<T>
where
    T: Send,
    F: for<'c> Fn(&'c mut PgConnection) -> BoxFuture<'c, std::result::Result<T, sqlx::Error>>
        + Sync,
{
    let body = &body;

    retry(policy, ctx, move |attempt| async move {
        let mut tx = pool.begin().await?;
        let value = body(&mut *tx).await?;
        tx.commit().await?;

        if attempt > 1 {
            tracing::debug!(attempt, "Transaction committed after retry");
        }
        Ok::<T, RepositoryError>(value)
    })
    .await
}
