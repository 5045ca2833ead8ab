//! Push message construction.
//!
//! A [`MessageBuilder`] turns a validated request into the one [`PushMessage`]
//! that every attempt of a dispatch re-sends. The payload schema is fixed:
//! every key is always present, absent optional values are empty strings.

use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use vasatey_common::models::{
    AlertRequest, AndroidConfig, AndroidNotification, AndroidPriority, ApnsConfig, ApnsPayload,
    Aps, PushMessage, PushNotification,
};
use vasatey_config::MessageMode;

use crate::validator::ValidatedRequest;

/// Value of the `type` payload key.
pub const ALERT_MESSAGE_TYPE: &str = "emergency_alert";

pub trait MessageBuilder: Send + Sync {
    fn build(&self, request: &ValidatedRequest, built_at: DateTime<Utc>) -> PushMessage;

    fn mode(&self) -> MessageMode;
}

/// OS-rendered alert with title and body.
#[derive(Debug, Clone)]
pub struct VisibleMessageBuilder {
    channel_id: String,
}

impl VisibleMessageBuilder {
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
        }
    }
}

impl MessageBuilder for VisibleMessageBuilder {
    fn build(&self, request: &ValidatedRequest, built_at: DateTime<Utc>) -> PushMessage {
        let request = request.request();
        PushMessage {
            token: request.device_token.trim().to_string(),
            notification: Some(PushNotification {
                title: request.title.clone(),
                body: request.body.clone(),
            }),
            data: payload(request, built_at),
            android: AndroidConfig {
                priority: AndroidPriority::High,
                notification: Some(AndroidNotification {
                    channel_id: self.channel_id.clone(),
                    sound: "default".to_string(),
                    notification_priority: "PRIORITY_MAX".to_string(),
                }),
            },
            apns: ApnsConfig {
                headers: apns_headers("10", "alert"),
                payload: ApnsPayload {
                    aps: Aps {
                        sound: Some("default".to_string()),
                        content_available: None,
                    },
                },
            },
        }
    }

    fn mode(&self) -> MessageMode {
        MessageMode::Visible
    }
}

/// Data-only message; the app renders the alert itself.
#[derive(Debug, Clone, Default)]
pub struct SilentMessageBuilder;

impl MessageBuilder for SilentMessageBuilder {
    fn build(&self, request: &ValidatedRequest, built_at: DateTime<Utc>) -> PushMessage {
        let request = request.request();
        let mut data = payload(request, built_at);
        data.insert("title".to_string(), request.title.clone());
        data.insert("body".to_string(), request.body.clone());

        PushMessage {
            token: request.device_token.trim().to_string(),
            notification: None,
            data,
            android: AndroidConfig {
                priority: AndroidPriority::High,
                notification: None,
            },
            apns: ApnsConfig {
                headers: apns_headers("5", "background"),
                payload: ApnsPayload {
                    aps: Aps {
                        sound: None,
                        content_available: Some(1),
                    },
                },
            },
        }
    }

    fn mode(&self) -> MessageMode {
        MessageMode::Silent
    }
}

pub fn builder_for(mode: MessageMode, channel_id: &str) -> Arc<dyn MessageBuilder> {
    match mode {
        MessageMode::Visible => Arc::new(VisibleMessageBuilder::new(channel_id)),
        MessageMode::Silent => Arc::new(SilentMessageBuilder),
    }
}

fn payload(request: &AlertRequest, built_at: DateTime<Utc>) -> BTreeMap<String, String> {
    let optional = |value: &Option<String>| value.clone().unwrap_or_default();
    let coordinate = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();

    BTreeMap::from([
        ("type".to_string(), ALERT_MESSAGE_TYPE.to_string()),
        (
            "timestamp".to_string(),
            built_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        ),
        ("email".to_string(), request.recipient_email.clone()),
        ("fullName".to_string(), optional(&request.full_name)),
        ("phoneNumber".to_string(), optional(&request.phone_number)),
        ("latitude".to_string(), coordinate(request.latitude)),
        ("longitude".to_string(), coordinate(request.longitude)),
        ("isSelfAlert".to_string(), request.is_self_alert.to_string()),
    ])
}

fn apns_headers(priority: &str, push_type: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("apns-priority".to_string(), priority.to_string()),
        ("apns-push-type".to_string(), push_type.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Validator;
    use chrono::TimeZone;
    use vasatey_config::DispatchConfig;

    fn validated(request: AlertRequest) -> ValidatedRequest {
        Validator::from_config(&DispatchConfig::default())
            .validate(request)
            .unwrap()
    }

    fn request() -> AlertRequest {
        AlertRequest {
            device_token: "abcdefghijklmnop".to_string(),
            title: "Emergency".to_string(),
            body: "Jane needs help".to_string(),
            recipient_email: "jane@example.com".to_string(),
            full_name: Some("Jane Doe".to_string()),
            latitude: Some(47.5),
            ..AlertRequest::default()
        }
    }

    fn built_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_visible_message_shape() {
        let message =
            VisibleMessageBuilder::new("emergency_alerts").build(&validated(request()), built_at());

        assert_eq!(message.token, "abcdefghijklmnop");
        assert_eq!(
            message.notification,
            Some(PushNotification {
                title: "Emergency".to_string(),
                body: "Jane needs help".to_string(),
            })
        );
        let android = message.android.notification.as_ref().unwrap();
        assert_eq!(android.channel_id, "emergency_alerts");
        assert_eq!(android.sound, "default");
        assert_eq!(message.apns.headers["apns-priority"], "10");
        assert_eq!(message.apns.headers["apns-push-type"], "alert");
        assert!(!message.data.contains_key("title"));
    }

    #[test]
    fn test_payload_schema_is_fixed() {
        let message =
            VisibleMessageBuilder::new("emergency_alerts").build(&validated(request()), built_at());

        let keys: Vec<&str> = message.data.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "email",
                "fullName",
                "isSelfAlert",
                "latitude",
                "longitude",
                "phoneNumber",
                "timestamp",
                "type"
            ]
        );
        assert_eq!(message.data["type"], "emergency_alert");
        assert_eq!(message.data["timestamp"], "2024-05-01T12:00:00.000Z");
        assert_eq!(message.data["fullName"], "Jane Doe");
        assert_eq!(message.data["latitude"], "47.5");
        // absent optionals are empty, never omitted
        assert_eq!(message.data["phoneNumber"], "");
        assert_eq!(message.data["longitude"], "");
        assert_eq!(message.data["isSelfAlert"], "false");
    }

    #[test]
    fn test_silent_message_shape() {
        let message = SilentMessageBuilder.build(&validated(request()), built_at());

        assert!(message.notification.is_none());
        assert!(message.android.notification.is_none());
        assert_eq!(message.android.priority, AndroidPriority::High);
        assert_eq!(message.apns.payload.aps.content_available, Some(1));
        assert_eq!(message.apns.headers["apns-priority"], "5");
        assert_eq!(message.apns.headers["apns-push-type"], "background");
        assert_eq!(message.data["title"], "Emergency");
        assert_eq!(message.data["body"], "Jane needs help");
    }

    #[test]
    fn test_builder_for_mode() {
        assert_eq!(builder_for(MessageMode::Silent, "x").mode(), MessageMode::Silent);
        assert_eq!(
            builder_for(MessageMode::Visible, "x").mode(),
            MessageMode::Visible
        );
    }
}
