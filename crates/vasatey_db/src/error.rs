//! Error types for the database client

use thiserror::Error;
use vasatey_common::StorageError;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// Error with database transaction
    #[error("Database transaction error: {0}")]
    TransactionError(String),

    /// A stored row could not be mapped back to a model
    #[error("Corrupt row: {0}")]
    DecodeError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<DbError> for StorageError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConfigError(_) | DbError::UrlError(_) | DbError::PoolError(_) => {
                StorageError::Unavailable(err.to_string())
            }
            DbError::NotFound(id) => StorageError::NotFound(id),
            other => StorageError::Operation(other.to_string()),
        }
    }
}
