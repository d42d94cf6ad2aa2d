//! Order Store
//!
//! Persistence layer for the order read model on a Postgres-wire distributed
//! SQL store (CockroachDB or Postgres).
//!
//! This crate contains:
//! - Repository: the `OrderRepository` trait and its sqlx implementation
//! - Retry: the retrying-transaction helper used for multi-row writes
//! - Context: deadline and cancellation carried into every operation
//! - Error: the repository error taxonomy
//! - Config and db: pool construction and schema bootstrap

pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod repository;
pub mod retry;

pub use config::StoreConfig;
pub use context::OpContext;
pub use error::{ErrorKind, RepositoryError, Result};
pub use repository::{OrderRepository, PgOrderRepository};
pub use retry::{RetryPolicy, execute_tx};
