//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Aggregate or catalog row not found
    #[error("{0} not found")]
    NotFound(String),
    /// Acting user does not own the aggregate
    #[error("Not authorized")]
    Unauthorized,
    /// Validation error with message
    #[error("Validation error: {0}")]
    Validation(String),
    /// Object storage failure
    #[error("Storage error: {0}")]
    Storage(String),
    /// Persisted state contradicts what reconciliation expects
    #[error("Consistency violation: {0}")]
    Consistency(String),
    /// Database/persistence error
    #[error("Database error: {0}")]
    Database(String),
    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(what: &str, id: &str) -> Self {
        DomainError::NotFound(format!("{} {}", what, id))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }
}

/// Failures raised by an object storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

impl From<StorageError> for DomainError {
    fn from(e: StorageError) -> Self {
        DomainError::Storage(e.to_string())
    }
}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}
