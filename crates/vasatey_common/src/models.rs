// --- File: crates/vasatey_common/src/models.rs ---

//! Domain models shared by the dispatch engine, the retention engine and the
//! storage and gateway adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An inbound emergency-alert request.
///
/// The legacy wire names (`token`, `email`, `lastKnownLatitude`,
/// `lastKnownLongitude`) are accepted as aliases. Unknown fields are ignored and
/// never forwarded to the device.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRequest {
    /// FCM registration token of the receiving device
    #[serde(default, alias = "token")]
    pub device_token: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Email of the user the alert is about
    #[serde(default, alias = "email")]
    pub recipient_email: String,
    /// The sender is alerting about themselves
    #[serde(default)]
    pub is_self_alert: bool,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default, alias = "lastKnownLatitude")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "lastKnownLongitude")]
    pub longitude: Option<f64>,
}

/// A push message addressed to exactly one device, in FCM HTTP v1 shape.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub token: String,
    /// OS-rendered block; absent for data-only messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<PushNotification>,
    /// Fixed-schema payload, every value a string
    pub data: BTreeMap<String, String>,
    pub android: AndroidConfig,
    pub apns: ApnsConfig,
}

impl PushMessage {
    /// Whether the OS renders this message itself.
    pub fn is_visible(&self) -> bool {
        self.notification.is_some()
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AndroidConfig {
    pub priority: AndroidPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<AndroidNotification>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AndroidPriority {
    Normal,
    High,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AndroidNotification {
    pub channel_id: String,
    pub sound: String,
    pub notification_priority: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApnsConfig {
    pub headers: BTreeMap<String, String>,
    pub payload: ApnsPayload,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApnsPayload {
    pub aps: Aps,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    #[serde(rename = "content-available", skip_serializing_if = "Option::is_none")]
    pub content_available: Option<u8>,
}

/// Why a delivery attempt failed.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryErrorKind {
    /// The token is malformed or was never registered
    InvalidToken,
    /// The token was valid once and has since been unregistered
    ExpiredToken,
    RateLimited,
    Transient,
    InvalidArgument,
    Unknown,
}

impl DeliveryErrorKind {
    pub const ALL: [DeliveryErrorKind; 6] = [
        DeliveryErrorKind::InvalidToken,
        DeliveryErrorKind::ExpiredToken,
        DeliveryErrorKind::RateLimited,
        DeliveryErrorKind::Transient,
        DeliveryErrorKind::InvalidArgument,
        DeliveryErrorKind::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryErrorKind::InvalidToken => "invalid-token",
            DeliveryErrorKind::ExpiredToken => "expired-token",
            DeliveryErrorKind::RateLimited => "rate-limited",
            DeliveryErrorKind::Transient => "transient",
            DeliveryErrorKind::InvalidArgument => "invalid-argument",
            DeliveryErrorKind::Unknown => "unknown",
        }
    }

    /// The destination will never accept this token again.
    pub fn is_token_failure(&self) -> bool {
        matches!(
            self,
            DeliveryErrorKind::InvalidToken | DeliveryErrorKind::ExpiredToken
        )
    }
}

impl fmt::Display for DeliveryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryErrorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        DeliveryErrorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("unknown delivery error classification: {s}"))
    }
}

/// A classified delivery failure as reported by a [`crate::DeliveryClient`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct DeliveryError {
    pub kind: DeliveryErrorKind,
    /// Backend error code the classification was derived from, if any
    pub code: Option<String>,
    pub detail: String,
}

impl DeliveryError {
    pub fn new(kind: DeliveryErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            detail: detail.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Terminal result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent { message_id: String },
    Failed(DeliveryError),
}

impl DeliveryOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryOutcome::Sent { .. })
    }
}

/// Lifecycle state of a [`NotificationRecord`].
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Sending,
    Sent,
    Failed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Sending => "sending",
            NotificationStatus::Sent => "sent",
            NotificationStatus::Failed => "failed",
        }
    }
}

impl FromStr for NotificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sending" => Ok(NotificationStatus::Sending),
            "sent" => Ok(NotificationStatus::Sent),
            "failed" => Ok(NotificationStatus::Failed),
            other => Err(format!("unknown notification status: {other}")),
        }
    }
}

/// Persistent trace of one dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    /// Assigned by the store on insert
    pub id: Option<String>,
    pub recipient_email: String,
    pub title: String,
    pub body: String,
    pub token: String,
    pub status: NotificationStatus,
    /// Copy of the optional request fields
    pub metadata: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub message_id: Option<String>,
    pub error_message: Option<String>,
    pub attempts: u32,
}

impl NotificationRecord {
    /// A fresh record in the `sending` state.
    pub fn sending(request: &AlertRequest, created_at: DateTime<Utc>) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert("isSelfAlert".to_string(), request.is_self_alert.to_string());
        if let Some(full_name) = &request.full_name {
            metadata.insert("fullName".to_string(), full_name.clone());
        }
        if let Some(phone_number) = &request.phone_number {
            metadata.insert("phoneNumber".to_string(), phone_number.clone());
        }
        if let Some(latitude) = request.latitude {
            metadata.insert("latitude".to_string(), latitude.to_string());
        }
        if let Some(longitude) = request.longitude {
            metadata.insert("longitude".to_string(), longitude.to_string());
        }

        Self {
            id: None,
            recipient_email: request.recipient_email.clone(),
            title: request.title.clone(),
            body: request.body.clone(),
            token: request.device_token.clone(),
            status: NotificationStatus::Sending,
            metadata,
            created_at,
            sent_at: None,
            message_id: None,
            error_message: None,
            attempts: 0,
        }
    }
}

/// Fields written together with a status transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusUpdate {
    pub sent_at: Option<DateTime<Utc>>,
    pub message_id: Option<String>,
    pub error_message: Option<String>,
    pub attempts: u32,
}

/// Handle to an alert record selected for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlertRef {
    pub id: String,
}

impl AlertRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A stored alert, subject to the retention policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    pub id: String,
    /// Creation time; the record is eligible for deletion iff this is before the cutoff
    pub timestamp: DateTime<Utc>,
    pub recipient_email: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
}

impl AlertRecord {
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            timestamp,
            recipient_email: None,
            title: None,
            body: None,
        }
    }

    pub fn to_ref(&self) -> AlertRef {
        AlertRef::new(self.id.clone())
    }
}
