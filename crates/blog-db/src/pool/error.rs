//! Store error classification
//!
//! Only connectivity failures are worth retrying against another replica. Data and
//! constraint errors would fail the same way again, so they propagate untouched.

use blog_core::DomainError;
use sqlx::error::ErrorKind;

/// Errors raised by the resilience layer and the operations it runs
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The link to the replica is unusable
    #[error("connectivity failure: {0}")]
    Connectivity(String),

    /// The link broke during COMMIT, so the transaction may already have landed.
    /// Never retried: re-running the body could apply its effect a second time.
    #[error("commit outcome unknown: {0}")]
    CommitUnknown(String),

    /// Every candidate refused a new link
    #[error("no reachable replica among {candidates} candidates")]
    NoReachableReplica { candidates: usize },

    /// The operation kept failing after failing over
    #[error("store unreachable after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("query failed: {0}")]
    Query(String),

    /// Business rule failure raised inside a transaction body
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl StoreError {
    /// Whether a fresh link could make this operation succeed
    #[inline]
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }

    /// Classify an error raised by `COMMIT`
    pub fn from_commit(err: sqlx::Error) -> Self {
        if is_connectivity_error(&err) {
            return Self::CommitUnknown(err.to_string());
        }
        Self::from(err)
    }
}

/// Whether an sqlx error means the link itself is broken
pub fn is_connectivity_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| {
            // 08xxx connection exception, 57P01-03 server shutting down / not ready
            code.starts_with("08") || matches!(&*code, "57P01" | "57P02" | "57P03")
        }),
        _ => false,
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_connectivity_error(&err) {
            return Self::Connectivity(err.to_string());
        }

        if let Some(db_err) = err.as_database_error() {
            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => return Self::Constraint(db_err.message().to_string()),
                _ => {}
            }
        }

        Self::Query(err.to_string())
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Connectivity(_)
            | StoreError::CommitUnknown(_)
            | StoreError::NoReachableReplica { .. }
            | StoreError::RetriesExhausted { .. } => Self::StoreUnavailable(err.to_string()),
            StoreError::Constraint(msg) => Self::ConstraintViolation(msg),
            StoreError::Query(msg) => Self::DatabaseError(msg),
            StoreError::Domain(domain) => domain,
        }
    }
}
