//! In-memory stores.
//!
//! Used when no database is configured, and by tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;
use vasatey_common::models::{
    AlertRecord, AlertRef, NotificationRecord, NotificationStatus, StatusUpdate,
};
use vasatey_common::{AlertStore, NotificationStore, StorageError};

#[derive(Debug, Default)]
pub struct InMemoryNotificationStore {
    records: RwLock<HashMap<String, NotificationRecord>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: &str) -> Option<NotificationRecord> {
        self.records.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn insert(&self, mut record: NotificationRecord) -> Result<String, StorageError> {
        let id = record
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        record.id = Some(id.clone());
        self.records.write().await.insert(id.clone(), record);
        Ok(id)
    }

    async fn update_status(
        &self,
        id: &str,
        status: NotificationStatus,
        update: StatusUpdate,
    ) -> Result<(), StorageError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        record.status = status;
        record.sent_at = update.sent_at;
        record.message_id = update.message_id;
        record.error_message = update.error_message;
        record.attempts = update.attempts;
        Ok(())
    }
}

/// Alerts keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryAlertStore {
    records: RwLock<BTreeMap<String, AlertRecord>>,
}

impl InMemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: AlertRecord) {
        self.records.write().await.insert(record.id.clone(), record);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.records.read().await.contains_key(id)
    }
}

#[async_trait]
impl AlertStore for InMemoryAlertStore {
    async fn query_older_than(&self, cutoff: DateTime<Utc>) -> Result<Vec<AlertRef>, StorageError> {
        let records = self.records.read().await;
        let mut eligible: Vec<&AlertRecord> = records
            .values()
            .filter(|record| record.timestamp < cutoff)
            .collect();
        eligible.sort_by_key(|record| record.timestamp);
        Ok(eligible.into_iter().map(AlertRecord::to_ref).collect())
    }

    async fn delete_batch(&self, refs: &[AlertRef]) -> Result<(), StorageError> {
        let mut records = self.records.write().await;
        for alert in refs {
            records.remove(&alert.id);
        }
        Ok(())
    }
}
