//! The retention cleanup engine.
//!
//! [`CleanupJob`] deletes every alert older than a cutoff in batches no larger
//! than the store's per-commit limit. Batches run one after another; a failed
//! batch is recorded and the job moves on.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info};
use vasatey_common::models::AlertRef;
use vasatey_common::{AlertStore, StorageError};
use vasatey_config::{CleanupConfig, MAX_CLEANUP_BATCH_SIZE};

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchError {
    /// Ordinal of the batch, starting at 0
    pub batch_index: usize,
    pub record_count: usize,
    pub error: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupStats {
    pub total_deleted: usize,
    pub scanned_count: usize,
    /// `None` for a delete-all run
    pub days_old: Option<u32>,
    pub cutoff_timestamp: DateTime<Utc>,
    pub duration_ms: u64,
    pub batch_errors: Vec<BatchError>,
}

impl CleanupStats {
    pub fn is_complete(&self) -> bool {
        self.batch_errors.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("Failed to query alerts older than {cutoff}: {source}")]
    Query {
        cutoff: DateTime<Utc>,
        #[source]
        source: StorageError,
    },
}

pub struct CleanupJob {
    store: Arc<dyn AlertStore>,
    batch_size: usize,
}

impl CleanupJob {
    /// `batch_size` is clamped to `1..=MAX_CLEANUP_BATCH_SIZE`.
    pub fn new(store: Arc<dyn AlertStore>, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.clamp(1, MAX_CLEANUP_BATCH_SIZE),
        }
    }

    pub fn from_config(store: Arc<dyn AlertStore>, config: &CleanupConfig) -> Self {
        Self::new(store, config.batch_size)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Delete every alert older than `days_old` days.
    pub async fn run(&self, days_old: u32) -> Result<CleanupStats, CleanupError> {
        self.run_at(days_old, Utc::now()).await
    }

    /// Like [`CleanupJob::run`] with an explicit clock.
    pub async fn run_at(
        &self,
        days_old: u32,
        now: DateTime<Utc>,
    ) -> Result<CleanupStats, CleanupError> {
        let cutoff = now
            .checked_sub_signed(Duration::days(i64::from(days_old)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.run_with_cutoff(Some(days_old), cutoff).await
    }

    /// Delete every alert regardless of age.
    pub async fn run_all(&self) -> Result<CleanupStats, CleanupError> {
        self.run_with_cutoff(None, DateTime::<Utc>::MAX_UTC).await
    }

    pub async fn run_with_cutoff(
        &self,
        days_old: Option<u32>,
        cutoff: DateTime<Utc>,
    ) -> Result<CleanupStats, CleanupError> {
        let started = Instant::now();
        info!(%cutoff, ?days_old, "Starting alert cleanup");

        let eligible = self
            .store
            .query_older_than(cutoff)
            .await
            .map_err(|source| {
                error!(%cutoff, error = %source, "Alert cleanup query failed");
                CleanupError::Query { cutoff, source }
            })?;

        let scanned_count = eligible.len();
        let mut total_deleted = 0;
        let mut batch_errors = Vec::new();

        if eligible.is_empty() {
            info!("No alerts older than the cutoff");
        }

        for (batch_index, batch) in partition(&eligible, self.batch_size).enumerate() {
            match self.store.delete_batch(batch).await {
                Ok(()) => {
                    total_deleted += batch.len();
                    debug!(batch_index, deleted = batch.len(), "Committed cleanup batch");
                }
                Err(e) => {
                    error!(batch_index, records = batch.len(), error = %e, "Cleanup batch failed");
                    batch_errors.push(BatchError {
                        batch_index,
                        record_count: batch.len(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let stats = CleanupStats {
            total_deleted,
            scanned_count,
            days_old,
            cutoff_timestamp: cutoff,
            duration_ms: started.elapsed().as_millis() as u64,
            batch_errors,
        };

        info!(
            total_deleted = stats.total_deleted,
            scanned = stats.scanned_count,
            failed_batches = stats.batch_errors.len(),
            duration_ms = stats.duration_ms,
            "Alert cleanup finished"
        );
        Ok(stats)
    }
}

/// Split `refs` into consecutive batches of at most `batch_size`.
pub fn partition(refs: &[AlertRef], batch_size: usize) -> impl Iterator<Item = &[AlertRef]> {
    refs.chunks(batch_size.max(1))
}
