use chrono::{Duration, TimeZone, Utc};
use std::collections::BTreeMap;
use vasatey_common::models::{
    AlertRecord, AlertRef, NotificationRecord, NotificationStatus, StatusUpdate,
};
use vasatey_common::{AlertStore, NotificationStore, StorageError};
use vasatey_db::{DbClient, SqlAlertRepository, SqlNotificationRepository};

async fn memory_client() -> DbClient {
    DbClient::from_url("sqlite::memory:").await.unwrap()
}

fn sample_record() -> NotificationRecord {
    NotificationRecord {
        id: None,
        recipient_email: "jane@example.com".to_string(),
        title: "Emergency".to_string(),
        body: "Jane needs help".to_string(),
        token: "device-token-1234567890".to_string(),
        status: NotificationStatus::Sending,
        metadata: BTreeMap::from([("fullName".to_string(), "Jane Doe".to_string())]),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        sent_at: None,
        message_id: None,
        error_message: None,
        attempts: 0,
    }
}

#[tokio::test]
async fn test_notification_insert_and_mark_sent() {
    let repo = SqlNotificationRepository::new(memory_client().await);
    repo.init_schema().await.unwrap();

    let id = repo.insert(sample_record()).await.unwrap();
    let stored = repo.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.status, NotificationStatus::Sending);
    assert_eq!(stored.metadata.get("fullName").map(String::as_str), Some("Jane Doe"));
    assert_eq!(stored.created_at, sample_record().created_at);

    let sent_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 2).unwrap();
    repo.update_status(
        &id,
        NotificationStatus::Sent,
        StatusUpdate {
            sent_at: Some(sent_at),
            message_id: Some("projects/demo/messages/1".to_string()),
            error_message: None,
            attempts: 2,
        },
    )
    .await
    .unwrap();

    let stored = repo.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.status, NotificationStatus::Sent);
    assert_eq!(stored.sent_at, Some(sent_at));
    assert_eq!(stored.message_id.as_deref(), Some("projects/demo/messages/1"));
    assert_eq!(stored.attempts, 2);
}

#[tokio::test]
async fn test_notification_update_unknown_id() {
    let repo = SqlNotificationRepository::new(memory_client().await);
    repo.init_schema().await.unwrap();

    let result = repo
        .update_status("missing", NotificationStatus::Failed, StatusUpdate::default())
        .await;
    assert!(matches!(result, Err(StorageError::NotFound(_))));
}

#[tokio::test]
async fn test_alert_query_uses_strict_cutoff() {
    let repo = SqlAlertRepository::new(memory_client().await);
    repo.init_schema().await.unwrap();

    let cutoff = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
    repo.insert_alert(&AlertRecord::new("old", cutoff - Duration::days(3)))
        .await
        .unwrap();
    repo.insert_alert(&AlertRecord::new("edge", cutoff - Duration::milliseconds(1)))
        .await
        .unwrap();
    repo.insert_alert(&AlertRecord::new("at-cutoff", cutoff))
        .await
        .unwrap();
    repo.insert_alert(&AlertRecord::new("new", cutoff + Duration::days(1)))
        .await
        .unwrap();

    let eligible = repo.query_older_than(cutoff).await.unwrap();
    assert_eq!(eligible, vec![AlertRef::new("old"), AlertRef::new("edge")]);
}

#[tokio::test]
async fn test_alert_delete_batch() {
    let repo = SqlAlertRepository::new(memory_client().await);
    repo.init_schema().await.unwrap();

    let now = Utc::now();
    for i in 0..5 {
        repo.insert_alert(&AlertRecord::new(format!("a{i}"), now - Duration::days(40)))
            .await
            .unwrap();
    }

    repo.delete_batch(&[AlertRef::new("a0"), AlertRef::new("a1"), AlertRef::new("gone")])
        .await
        .unwrap();

    assert_eq!(repo.count().await.unwrap(), 3);
    assert!(repo.find_by_id("a0").await.unwrap().is_none());
    assert!(repo.find_by_id("a2").await.unwrap().is_some());

    // empty batches are a no-op
    repo.delete_batch(&[]).await.unwrap();
    assert_eq!(repo.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_delete_all_cutoff_selects_everything() {
    let repo = SqlAlertRepository::new(memory_client().await);
    repo.init_schema().await.unwrap();

    repo.insert_alert(&AlertRecord::new("future", Utc::now() + Duration::days(365)))
        .await
        .unwrap();
    repo.insert_alert(&AlertRecord::new("past", Utc::now() - Duration::days(365)))
        .await
        .unwrap();

    let eligible = repo
        .query_older_than(chrono::DateTime::<Utc>::MAX_UTC)
        .await
        .unwrap();
    assert_eq!(eligible.len(), 2);
}

#[tokio::test]
async fn test_missing_table_is_a_storage_error() {
    let repo = SqlAlertRepository::new(memory_client().await);
    let result = repo.query_older_than(Utc::now()).await;
    assert!(matches!(result, Err(StorageError::Operation(_))));
}

#[tokio::test]
async fn test_failed_notification_reads_back_without_send_fields() {
    let repo = SqlNotificationRepository::new(memory_client().await);
    repo.init_schema().await.unwrap();

    let id = repo.insert(sample_record()).await.unwrap();
    let stored = repo.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.sent_at, None);
    assert_eq!(stored.message_id, None);
    assert_eq!(stored.error_message, None);

    repo.update_status(
        &id,
        NotificationStatus::Failed,
        StatusUpdate {
            error_message: Some("expired-token: Requested entity was not found.".to_string()),
            attempts: 1,
            ..StatusUpdate::default()
        },
    )
    .await
    .unwrap();

    let stored = repo.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.status, NotificationStatus::Failed);
    assert_eq!(stored.sent_at, None);
    assert_eq!(stored.message_id, None);
    assert_eq!(
        stored.error_message.as_deref(),
        Some("expired-token: Requested entity was not found.")
    );
    assert_eq!(stored.attempts, 1);
}

#[tokio::test]
async fn test_alert_optional_fields_read_back() {
    let repo = SqlAlertRepository::new(memory_client().await);
    repo.init_schema().await.unwrap();

    let timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
    repo.insert_alert(&AlertRecord::new("bare", timestamp))
        .await
        .unwrap();
    let mut full = AlertRecord::new("full", timestamp);
    full.recipient_email = Some("jane@example.com".to_string());
    full.title = Some("Emergency".to_string());
    repo.insert_alert(&full).await.unwrap();

    let bare = repo.find_by_id("bare").await.unwrap().unwrap();
    assert_eq!(bare, AlertRecord::new("bare", timestamp));

    let stored = repo.find_by_id("full").await.unwrap().unwrap();
    assert_eq!(stored, full);
}
