//! SQL implementation of the notification store

use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::Row;
use std::collections::BTreeMap;
use tracing::{debug, error, info};
use uuid::Uuid;
use vasatey_common::models::{NotificationRecord, NotificationStatus, StatusUpdate};
use vasatey_common::{NotificationStore, StorageError};

use super::{from_millis, optional_millis, optional_text, to_millis};
use crate::error::DbError;
use crate::DbClient;

/// Notification records in the `notifications` table
#[derive(Debug, Clone)]
pub struct SqlNotificationRepository {
    db_client: DbClient,
}

impl SqlNotificationRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Create the `notifications` table if it doesn't exist.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing notification schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS notifications (
                id TEXT PRIMARY KEY,
                recipient_email TEXT NOT NULL,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                token TEXT NOT NULL,
                status TEXT NOT NULL,
                metadata TEXT NOT NULL,
                created_at_ms BIGINT NOT NULL,
                sent_at_ms BIGINT,
                message_id TEXT,
                error_message TEXT,
                attempts INTEGER NOT NULL DEFAULT 0
            )
        "#;
        self.db_client.execute(query).await?;

        info!("Notification schema initialized successfully");
        Ok(())
    }

    pub async fn insert_record(&self, record: &NotificationRecord) -> Result<String, DbError> {
        let id = record
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let metadata = serde_json::to_string(&record.metadata)
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        let query = r#"
            INSERT INTO notifications
                (id, recipient_email, title, body, token, status, metadata,
                 created_at_ms, sent_at_ms, message_id, error_message, attempts)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#;

        sqlx::query(query)
            .bind(&id)
            .bind(&record.recipient_email)
            .bind(&record.title)
            .bind(&record.body)
            .bind(&record.token)
            .bind(record.status.as_str())
            .bind(metadata)
            .bind(to_millis(record.created_at))
            .bind(record.sent_at.map(to_millis))
            .bind(record.message_id.clone())
            .bind(record.error_message.clone())
            .bind(i64::from(record.attempts))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert notification: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        debug!("Stored notification {}", id);
        Ok(id)
    }

    pub async fn set_status(
        &self,
        id: &str,
        status: NotificationStatus,
        update: &StatusUpdate,
    ) -> Result<(), DbError> {
        let query = r#"
            UPDATE notifications
            SET status = $1, sent_at_ms = $2, message_id = $3, error_message = $4, attempts = $5
            WHERE id = $6
        "#;

        let result = sqlx::query(query)
            .bind(status.as_str())
            .bind(update.sent_at.map(to_millis))
            .bind(update.message_id.clone())
            .bind(update.error_message.clone())
            .bind(i64::from(update.attempts))
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to update notification {}: {}", id, e);
                DbError::QueryError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<NotificationRecord>, DbError> {
        let query = r#"
            SELECT id, recipient_email, title, body, token, status, metadata, created_at_ms,
                   COALESCE(sent_at_ms, -1) AS sent_at_ms,
                   COALESCE(message_id, '') AS message_id,
                   COALESCE(error_message, '') AS error_message,
                   attempts
            FROM notifications
            WHERE id = $1
        "#;

        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        row.map(|row| Self::map_row(&row)).transpose()
    }

    fn map_row(row: &AnyRow) -> Result<NotificationRecord, DbError> {
        let status: String = row.try_get("status")?;
        let metadata: String = row.try_get("metadata")?;
        let attempts: i64 = row.try_get("attempts")?;
        let sent_at: i64 = row.try_get("sent_at_ms")?;

        Ok(NotificationRecord {
            id: Some(row.try_get("id")?),
            recipient_email: row.try_get("recipient_email")?,
            title: row.try_get("title")?,
            body: row.try_get("body")?,
            token: row.try_get("token")?,
            status: status
                .parse::<NotificationStatus>()
                .map_err(DbError::DecodeError)?,
            metadata: serde_json::from_str::<BTreeMap<String, String>>(&metadata)
                .map_err(|e| DbError::DecodeError(e.to_string()))?,
            created_at: from_millis(row.try_get("created_at_ms")?)?,
            sent_at: optional_millis(sent_at)?,
            message_id: optional_text(row.try_get("message_id")?),
            error_message: optional_text(row.try_get("error_message")?),
            attempts: u32::try_from(attempts).map_err(|e| DbError::DecodeError(e.to_string()))?,
        })
    }
}

#[async_trait]
impl NotificationStore for SqlNotificationRepository {
    async fn insert(&self, record: NotificationRecord) -> Result<String, StorageError> {
        Ok(self.insert_record(&record).await?)
    }

    async fn update_status(
        &self,
        id: &str,
        status: NotificationStatus,
        update: StatusUpdate,
    ) -> Result<(), StorageError> {
        Ok(self.set_status(id, status, &update).await?)
    }
}
