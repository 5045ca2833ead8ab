//! Wire types of the FCM HTTP v1 `messages:send` call.

use serde::{Deserialize, Serialize};
use vasatey_common::models::PushMessage;

/// Request envelope around a single message.
#[derive(Debug, Serialize)]
pub struct SendRequest<'a> {
    pub message: &'a PushMessage,
}

/// Successful send.
#[derive(Debug, Deserialize)]
pub struct SendResponse {
    /// `projects/{project_id}/messages/{message_id}`
    pub name: String,
}

/// Error envelope returned with any non-2xx status.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    /// Canonical status such as `NOT_FOUND` or `UNAVAILABLE`
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "@type", default)]
    pub type_url: Option<String>,
    /// FCM-specific code such as `UNREGISTERED`
    #[serde(rename = "errorCode", default)]
    pub error_code: Option<String>,
}

impl ErrorBody {
    /// First FCM error code found in the details.
    pub fn error_code(&self) -> Option<&str> {
        self.details
            .iter()
            .find_map(|detail| detail.error_code.as_deref())
    }
}
