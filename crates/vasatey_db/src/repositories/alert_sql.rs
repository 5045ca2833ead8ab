//! SQL implementation of the alert store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::{debug, error, info};
use vasatey_common::models::{AlertRecord, AlertRef};
use vasatey_common::{AlertStore, StorageError};

use super::{from_millis, optional_text, to_millis};
use crate::error::DbError;
use crate::DbClient;

/// Alert records in the `alerts` table
#[derive(Debug, Clone)]
pub struct SqlAlertRepository {
    db_client: DbClient,
}

impl SqlAlertRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Create the `alerts` table and its timestamp index if they don't exist.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing alert schema");

        self.db_client
            .execute(
                r#"
                CREATE TABLE IF NOT EXISTS alerts (
                    id TEXT PRIMARY KEY,
                    timestamp_ms BIGINT NOT NULL,
                    recipient_email TEXT,
                    title TEXT,
                    body TEXT
                )
                "#,
            )
            .await?;
        self.db_client
            .execute("CREATE INDEX IF NOT EXISTS idx_alerts_timestamp ON alerts (timestamp_ms)")
            .await?;

        info!("Alert schema initialized successfully");
        Ok(())
    }

    pub async fn insert_alert(&self, alert: &AlertRecord) -> Result<(), DbError> {
        let query = r#"
            INSERT INTO alerts (id, timestamp_ms, recipient_email, title, body)
            VALUES ($1, $2, $3, $4, $5)
        "#;

        sqlx::query(query)
            .bind(&alert.id)
            .bind(to_millis(alert.timestamp))
            .bind(alert.recipient_email.clone())
            .bind(alert.title.clone())
            .bind(alert.body.clone())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert alert {}: {}", alert.id, e);
                DbError::QueryError(e.to_string())
            })?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<AlertRecord>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT id, timestamp_ms,
                   COALESCE(recipient_email, '') AS recipient_email,
                   COALESCE(title, '') AS title,
                   COALESCE(body, '') AS body
            FROM alerts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        match row {
            Some(row) => Ok(Some(AlertRecord {
                id: row.try_get("id")?,
                timestamp: from_millis(row.try_get("timestamp_ms")?)?,
                recipient_email: optional_text(row.try_get("recipient_email")?),
                title: optional_text(row.try_get("title")?),
                body: optional_text(row.try_get("body")?),
            })),
            None => Ok(None),
        }
    }

    pub async fn count(&self) -> Result<i64, DbError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM alerts")
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;
        Ok(row.try_get("total")?)
    }

    pub async fn ids_older_than(&self, cutoff: DateTime<Utc>) -> Result<Vec<AlertRef>, DbError> {
        let rows = sqlx::query(
            "SELECT id FROM alerts WHERE timestamp_ms < $1 ORDER BY timestamp_ms",
        )
        .bind(to_millis(cutoff))
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to query alerts older than {}: {}", cutoff, e);
            DbError::QueryError(e.to_string())
        })?;

        rows.iter()
            .map(|row| -> Result<AlertRef, DbError> {
                Ok(AlertRef::new(row.try_get::<String, _>("id")?))
            })
            .collect()
    }

    /// Delete `refs` in one transaction.
    pub async fn delete_ids(&self, refs: &[AlertRef]) -> Result<u64, DbError> {
        if refs.is_empty() {
            return Ok(0);
        }

        let placeholders = (1..=refs.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!("DELETE FROM alerts WHERE id IN ({placeholders})");

        let mut tx = self.db_client.begin().await?;
        let mut statement = sqlx::query(&query);
        for alert in refs {
            statement = statement.bind(alert.id.as_str());
        }
        let result = statement.execute(&mut *tx).await.map_err(|e| {
            error!("Failed to delete alert batch: {}", e);
            DbError::QueryError(e.to_string())
        })?;
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        debug!(
            "Deleted {} of {} alerts in batch",
            result.rows_affected(),
            refs.len()
        );
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl AlertStore for SqlAlertRepository {
    async fn query_older_than(&self, cutoff: DateTime<Utc>) -> Result<Vec<AlertRef>, StorageError> {
        Ok(self.ids_older_than(cutoff).await?)
    }

    async fn delete_batch(&self, refs: &[AlertRef]) -> Result<(), StorageError> {
        self.delete_ids(refs).await?;
        Ok(())
    }
}
