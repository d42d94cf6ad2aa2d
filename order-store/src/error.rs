//! Error types for the order store

use thiserror::Error;

/// Result type alias for repository operations
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Errors surfaced by the order repository
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No order row matched the requested id
    #[error("order not found: {0}")]
    NotFound(String),

    /// Duplicate key, broken foreign key or other integrity violation
    #[error("constraint violation: {0}")]
    ConstraintViolation(#[source] sqlx::Error),

    /// Serialization conflict; the whole transaction must be retried
    #[error("transaction conflict: {0}")]
    Conflict(#[source] sqlx::Error),

    /// Connection lost or the pool could not hand out a connection
    #[error("store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    /// A retryable failure persisted past the retry budget
    #[error("transaction failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<RepositoryError>,
    },

    /// The caller's cancellation token fired
    #[error("operation cancelled")]
    Cancelled,

    /// The caller's deadline passed
    #[error("operation deadline exceeded")]
    DeadlineExceeded,

    /// Anything else reported by the driver
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

/// Coarse error category callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    ConstraintViolation,
    NotFound,
    Cancelled,
    Other,
}

impl RepositoryError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::ConstraintViolation(_) => ErrorKind::ConstraintViolation,
            Self::Conflict(_) | Self::Unavailable(_) | Self::RetriesExhausted { .. } => {
                ErrorKind::Transient
            }
            Self::Cancelled | Self::DeadlineExceeded => ErrorKind::Cancelled,
            Self::Database(_) => ErrorKind::Other,
        }
    }

    /// Whether a transaction that failed with this error should be re-run
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this error came from cancellation or an expired deadline
    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => RepositoryError::Unavailable(err),
            sqlx::Error::Database(db) => {
                let class = db.code().map(|code| classify_sqlstate(&code));
                match class {
                    Some(SqlStateClass::Conflict) => RepositoryError::Conflict(err),
                    Some(SqlStateClass::Constraint) => RepositoryError::ConstraintViolation(err),
                    Some(SqlStateClass::Unavailable) => RepositoryError::Unavailable(err),
                    Some(SqlStateClass::Cancelled) => RepositoryError::Cancelled,
                    Some(SqlStateClass::Other) | None => RepositoryError::Database(err),
                }
            }
            _ => RepositoryError::Database(err),
        }
    }
}

// =============================================================================
// SQLSTATE Classification
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SqlStateClass {
    Conflict,
    Constraint,
    Unavailable,
    Cancelled,
    Other,
}

fn classify_sqlstate(code: &str) -> SqlStateClass {
    match code {
        // serialization_failure (CockroachDB "restart transaction"), deadlock_detected
        "40001" | "40P01" => SqlStateClass::Conflict,
        // query_canceled
        "57014" => SqlStateClass::Cancelled,
        // admin_shutdown, crash_shutdown, cannot_connect_now
        "57P01" | "57P02" | "57P03" => SqlStateClass::Unavailable,
        _ if code.starts_with("23") => SqlStateClass::Constraint,
        _ if code.starts_with("08") => SqlStateClass::Unavailable,
        _ => SqlStateClass::Other,
    }
}
