use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tower::ServiceExt;
use vasatey_alerts::cleanup::CleanupJob;
use vasatey_alerts::dispatcher::Dispatcher;
use vasatey_alerts::handlers::{AlertsState, ServiceInfo};
use vasatey_alerts::memory::{InMemoryAlertStore, InMemoryNotificationStore};
use vasatey_common::models::{AlertRecord, DeliveryError, DeliveryErrorKind, PushMessage};
use vasatey_common::DeliveryClient;
use vasatey_config::DispatchConfig;

/// Answers every send with the same result and counts the calls.
struct ScriptedClient {
    failure: Option<DeliveryErrorKind>,
    configured: bool,
    calls: AtomicU32,
}

impl ScriptedClient {
    fn succeeding() -> Self {
        Self {
            failure: None,
            configured: true,
            calls: AtomicU32::new(0),
        }
    }

    fn failing(kind: DeliveryErrorKind) -> Self {
        Self {
            failure: Some(kind),
            ..Self::succeeding()
        }
    }
}

#[async_trait]
impl DeliveryClient for ScriptedClient {
    async fn send(&self, _message: &PushMessage) -> Result<String, DeliveryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure {
            Some(kind) => Err(DeliveryError::new(kind, "Requested entity was not found.")),
            None => Ok("projects/demo/messages/42".to_string()),
        }
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}

struct TestApp {
    router: Router,
    client: Arc<ScriptedClient>,
    alerts: Arc<InMemoryAlertStore>,
}

fn app(client: ScriptedClient) -> TestApp {
    let client = Arc::new(client);
    let alerts = Arc::new(InMemoryAlertStore::new());
    let config = DispatchConfig {
        retry_delay_base_ms: 0,
        ..DispatchConfig::default()
    };

    let dispatcher = Dispatcher::from_config(
        &config,
        client.clone(),
        Some(Arc::new(InMemoryNotificationStore::new())),
    );
    let state = Arc::new(AlertsState {
        dispatcher: Arc::new(dispatcher),
        cleanup: Arc::new(CleanupJob::new(alerts.clone(), 450)),
        default_days_old: 30,
        service: ServiceInfo::new("test", false),
    });

    TestApp {
        router: Router::new().nest("/api", vasatey_alerts::routes(state)),
        client,
        alerts,
    }
}

async fn call(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn alert_body() -> Value {
    json!({
        "deviceToken": "device-token-1234567890",
        "title": "Emergency",
        "body": "Jane needs help",
        "recipientEmail": "jane@example.com",
        "isSelfAlert": false
    })
}

#[tokio::test]
async fn test_send_notification_success() {
    let app = app(ScriptedClient::succeeding());

    let (status, body) = call(
        &app.router,
        "POST",
        "/api/notifications/send",
        Some(alert_body()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["messageId"], "projects/demo/messages/42");
    assert_eq!(body["attempts"], 1);
    assert!(body["notificationId"].is_string());
    assert_eq!(app.client.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_legacy_route_and_field_names() {
    let app = app(ScriptedClient::succeeding());

    let (status, body) = call(
        &app.router,
        "POST",
        "/api/sendNotification",
        Some(json!({
            "token": "device-token-1234567890",
            "title": "Emergency",
            "body": "Jane needs help",
            "email": "jane@example.com",
            "lastKnownLatitude": 47.37
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_missing_field_is_bad_request() {
    let app = app(ScriptedClient::succeeding());
    let mut request = alert_body();
    request.as_object_mut().unwrap().remove("title");

    let (status, body) = call(&app.router, "POST", "/api/notifications/send", Some(request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "validation-error");
    assert!(body["message"].as_str().unwrap().contains("title"));
    assert_eq!(app.client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app(ScriptedClient::succeeding());

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/notifications/send")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_token_maps_to_404_after_one_attempt() {
    let app = app(ScriptedClient::failing(DeliveryErrorKind::InvalidToken));

    let (status, body) = call(
        &app.router,
        "POST",
        "/api/notifications/send",
        Some(alert_body()),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "invalid-token");
    assert_eq!(body["error"], "Registration token invalid");
    assert_eq!(app.client.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failure_status_codes() {
    let cases = [
        (DeliveryErrorKind::ExpiredToken, StatusCode::GONE, 1),
        (DeliveryErrorKind::RateLimited, StatusCode::TOO_MANY_REQUESTS, 1),
        (DeliveryErrorKind::Transient, StatusCode::INTERNAL_SERVER_ERROR, 3),
    ];

    for (kind, expected, calls) in cases {
        let app = app(ScriptedClient::failing(kind));
        let (status, body) =
            call(&app.router, "POST", "/api/notifications/send", Some(alert_body())).await;

        assert_eq!(status, expected, "{kind}");
        assert_eq!(body["code"], kind.as_str());
        assert_eq!(app.client.calls.load(Ordering::SeqCst), calls, "{kind}");
    }
}

#[tokio::test]
async fn test_unconfigured_gateway_is_refused() {
    let app = app(ScriptedClient {
        configured: false,
        ..ScriptedClient::succeeding()
    });

    let (status, body) = call(
        &app.router,
        "POST",
        "/api/notifications/send",
        Some(alert_body()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "configuration-error");
    assert_eq!(app.client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_validation_runs_before_the_gateway_check() {
    let app = app(ScriptedClient {
        configured: false,
        ..ScriptedClient::succeeding()
    });

    let (status, body) = call(
        &app.router,
        "POST",
        "/api/notifications/send",
        Some(json!({"token": "abcdefghijklmnop", "title": "Help"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation-error");
    assert_eq!(app.client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cleanup_defaults_to_thirty_days() {
    let app = app(ScriptedClient::succeeding());
    app.alerts
        .insert(AlertRecord::new("old", Utc::now() - Duration::days(31)))
        .await;
    app.alerts
        .insert(AlertRecord::new("recent", Utc::now() - Duration::days(29)))
        .await;

    let (status, body) = call(&app.router, "POST", "/api/cleanup", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["stats"]["totalDeleted"], 1);
    assert_eq!(body["stats"]["daysOld"], 30);
    assert_eq!(body["stats"]["batchErrors"], json!([]));
    assert!(app.alerts.contains("recent").await);
}

#[tokio::test]
async fn test_cleanup_alias_with_days_and_delete_all() {
    let app = app(ScriptedClient::succeeding());
    for (id, days) in [("a", 3), ("b", 10), ("c", 100)] {
        app.alerts
            .insert(AlertRecord::new(id, Utc::now() - Duration::days(days)))
            .await;
    }

    let (status, body) = call(
        &app.router,
        "POST",
        "/api/cleanupAlerts",
        Some(json!({"daysOld": 7})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["totalDeleted"], 2);

    let (status, body) = call(
        &app.router,
        "POST",
        "/api/cleanup",
        Some(json!({"deleteAll": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["totalDeleted"], 1);
    assert_eq!(body["stats"]["daysOld"], Value::Null);
    assert!(app.alerts.is_empty().await);
}

#[tokio::test]
async fn test_cleanup_rejects_negative_days() {
    let app = app(ScriptedClient::succeeding());

    let (status, body) = call(
        &app.router,
        "POST",
        "/api/cleanup",
        Some(json!({"daysOld": -1})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid-json");
}

#[tokio::test]
async fn test_monthly_cleanup() {
    let app = app(ScriptedClient::succeeding());
    app.alerts
        .insert(AlertRecord::new("old", Utc::now() - Duration::days(60)))
        .await;

    let (status, body) = call(&app.router, "GET", "/api/cron/monthly-cleanup", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["result"]["totalDeleted"], 1);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_health() {
    let app = app(ScriptedClient::succeeding());

    let (status, body) = call(&app.router, "GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "vasatey-notify");
    assert_eq!(body["environment"], "test");
    assert_eq!(body["firebaseConfigured"], true);
    assert_eq!(body["databaseConfigured"], false);
}
