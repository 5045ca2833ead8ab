// --- File: crates/vasatey_common/src/services.rs ---
//! Service abstractions for the push gateway and the persistence layer.
//!
//! The dispatch and retention engines only see these traits. Concrete adapters
//! live in `vasatey-firebase` and `vasatey-db`; tests substitute fakes or mocks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    AlertRef, DeliveryError, NotificationRecord, NotificationStatus, PushMessage, StatusUpdate,
};

/// Errors reported by the storage ports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The store is not configured or cannot be reached
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("record not found: {0}")]
    NotFound(String),

    /// The store rejected or failed the operation
    #[error("storage operation failed: {0}")]
    Operation(String),
}

/// A push gateway that delivers one message to one device.
#[async_trait]
pub trait DeliveryClient: Send + Sync {
    /// Submit a single message; returns the gateway's message id on acceptance.
    ///
    /// Every failure comes back classified; the caller decides whether to retry.
    async fn send(&self, message: &PushMessage) -> Result<String, DeliveryError>;

    /// Whether the client is backed by real credentials.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Persistence for dispatch traces.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Store a new record and return its assigned id.
    async fn insert(&self, record: NotificationRecord) -> Result<String, StorageError>;

    /// Move a record to `status`, writing the fields of `update` with it.
    async fn update_status(
        &self,
        id: &str,
        status: NotificationStatus,
        update: StatusUpdate,
    ) -> Result<(), StorageError>;
}

/// Persistence for alert records under the retention policy.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Every record whose timestamp is strictly before `cutoff`.
    async fn query_older_than(&self, cutoff: DateTime<Utc>) -> Result<Vec<AlertRef>, StorageError>;

    /// Delete the given records as one unit of work: either all go or none do.
    ///
    /// Deleting a record that no longer exists is not an error.
    async fn delete_batch(&self, refs: &[AlertRef]) -> Result<(), StorageError>;
}
