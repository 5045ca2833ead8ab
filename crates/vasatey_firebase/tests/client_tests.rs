use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use vasatey_common::models::{
    AndroidConfig, AndroidPriority, ApnsConfig, ApnsPayload, Aps, DeliveryErrorKind, PushMessage,
    PushNotification,
};
use vasatey_common::DeliveryClient;
use vasatey_firebase::{
    ClassificationTable, FirebaseClient, StaticTokenProvider, UnconfiguredClient,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEND_PATH: &str = "/v1/projects/demo-project/messages:send";

fn message() -> PushMessage {
    PushMessage {
        token: "device-token-1234567890".to_string(),
        notification: Some(PushNotification {
            title: "Emergency".to_string(),
            body: "Jane needs help".to_string(),
        }),
        data: BTreeMap::from([("type".to_string(), "emergency_alert".to_string())]),
        android: AndroidConfig {
            priority: AndroidPriority::High,
            notification: None,
        },
        apns: ApnsConfig {
            headers: BTreeMap::from([("apns-priority".to_string(), "10".to_string())]),
            payload: ApnsPayload {
                aps: Aps {
                    sound: Some("default".to_string()),
                    content_available: None,
                },
            },
        },
    }
}

fn client_for(server: &MockServer, classifier: ClassificationTable) -> FirebaseClient {
    FirebaseClient::new(
        reqwest::Client::new(),
        server.uri(),
        "demo-project",
        Arc::new(StaticTokenProvider("test-token".to_string())),
        classifier,
    )
}

fn fcm_error(code: u16, status: &str, error_code: Option<&str>) -> serde_json::Value {
    let details = match error_code {
        Some(error_code) => json!([{
            "@type": "type.googleapis.com/google.firebase.fcm.v1.FcmError",
            "errorCode": error_code
        }]),
        None => json!([]),
    };
    json!({
        "error": {
            "code": code,
            "message": "Requested entity was not found.",
            "status": status,
            "details": details
        }
    })
}

#[tokio::test]
async fn test_send_returns_message_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "message": {
                "token": "device-token-1234567890",
                "notification": { "title": "Emergency" },
                "android": { "priority": "high" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/demo-project/messages/0:12345"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, ClassificationTable::default());
    let message_id = client.send(&message()).await.unwrap();

    assert_eq!(message_id, "projects/demo-project/messages/0:12345");
}

#[tokio::test]
async fn test_unregistered_token_is_expired() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(fcm_error(
                404,
                "NOT_FOUND",
                Some("UNREGISTERED"),
            )),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, ClassificationTable::default());
    let error = client.send(&message()).await.unwrap_err();

    assert_eq!(error.kind, DeliveryErrorKind::ExpiredToken);
    assert_eq!(error.code.as_deref(), Some("UNREGISTERED"));
    assert_eq!(error.detail, "Requested entity was not found.");
}

#[tokio::test]
async fn test_quota_exceeded_is_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(fcm_error(429, "RESOURCE_EXHAUSTED", Some("QUOTA_EXCEEDED"))),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, ClassificationTable::default());
    let error = client.send(&message()).await.unwrap_err();

    assert_eq!(error.kind, DeliveryErrorKind::RateLimited);
}

#[tokio::test]
async fn test_unparseable_server_error_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream connect error"))
        .mount(&server)
        .await;

    let client = client_for(&server, ClassificationTable::default());
    let error = client.send(&message()).await.unwrap_err();

    assert_eq!(error.kind, DeliveryErrorKind::Transient);
    assert!(error.detail.contains("503"));
}

#[tokio::test]
async fn test_overrides_change_classification() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(fcm_error(500, "INTERNAL", Some("INTERNAL"))),
        )
        .mount(&server)
        .await;

    let overrides = HashMap::from([("INTERNAL".to_string(), "unknown".to_string())]);
    let client = client_for(&server, ClassificationTable::with_overrides(&overrides).unwrap());
    let error = client.send(&message()).await.unwrap_err();

    assert_eq!(error.kind, DeliveryErrorKind::Unknown);
}

#[tokio::test]
async fn test_unreachable_gateway_is_transient() {
    // nothing listens on the discard port
    let client = FirebaseClient::new(
        reqwest::Client::new(),
        "http://127.0.0.1:9",
        "demo-project",
        Arc::new(StaticTokenProvider("test-token".to_string())),
        ClassificationTable::default(),
    );

    let error = client.send(&message()).await.unwrap_err();
    assert_eq!(error.kind, DeliveryErrorKind::Transient);
}

#[tokio::test]
async fn test_unconfigured_client_refuses() {
    let client = UnconfiguredClient;
    assert!(!client.is_configured());
    assert!(client.send(&message()).await.is_err());
}
