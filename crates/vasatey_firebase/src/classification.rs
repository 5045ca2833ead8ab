//! Mapping of FCM error codes onto delivery error kinds.
//!
//! FCM reports failures in three layers: an `errorCode` in the error details,
//! a canonical `status` string, and the HTTP status. The most specific one that
//! the table knows wins.

use std::collections::HashMap;
use tracing::debug;
use vasatey_common::models::DeliveryErrorKind;

use crate::client::FirebaseError;

const DEFAULT_CODES: &[(&str, DeliveryErrorKind)] = &[
    // token never valid, or tied to another sender
    ("messaging/registration-token-not-registered", DeliveryErrorKind::InvalidToken),
    ("messaging/invalid-registration-token", DeliveryErrorKind::InvalidToken),
    ("messaging/mismatched-credential", DeliveryErrorKind::InvalidToken),
    ("INVALID_REGISTRATION", DeliveryErrorKind::InvalidToken),
    ("SENDER_ID_MISMATCH", DeliveryErrorKind::InvalidToken),
    // app uninstalled or token rotated
    ("UNREGISTERED", DeliveryErrorKind::ExpiredToken),
    ("QUOTA_EXCEEDED", DeliveryErrorKind::RateLimited),
    ("RESOURCE_EXHAUSTED", DeliveryErrorKind::RateLimited),
    ("messaging/message-rate-exceeded", DeliveryErrorKind::RateLimited),
    ("messaging/device-message-rate-exceeded", DeliveryErrorKind::RateLimited),
    ("messaging/topics-message-rate-exceeded", DeliveryErrorKind::RateLimited),
    ("UNAVAILABLE", DeliveryErrorKind::Transient),
    ("INTERNAL", DeliveryErrorKind::Transient),
    ("messaging/server-unavailable", DeliveryErrorKind::Transient),
    ("messaging/internal-error", DeliveryErrorKind::Transient),
    ("INVALID_ARGUMENT", DeliveryErrorKind::InvalidArgument),
    ("messaging/invalid-argument", DeliveryErrorKind::InvalidArgument),
    ("messaging/invalid-payload", DeliveryErrorKind::InvalidArgument),
];

/// Lookup table from gateway error codes to [`DeliveryErrorKind`].
#[derive(Debug, Clone)]
pub struct ClassificationTable {
    codes: HashMap<String, DeliveryErrorKind>,
}

impl Default for ClassificationTable {
    fn default() -> Self {
        Self {
            codes: DEFAULT_CODES
                .iter()
                .map(|(code, kind)| (code.to_string(), *kind))
                .collect(),
        }
    }
}

impl ClassificationTable {
    /// The default table with `overrides` applied on top.
    ///
    /// Override values are kind names such as `transient` or `invalid-token`.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Result<Self, FirebaseError> {
        let mut table = Self::default();
        for (code, kind) in overrides {
            let kind = kind
                .parse::<DeliveryErrorKind>()
                .map_err(FirebaseError::ConfigError)?;
            debug!("Classifying FCM error code {} as {}", code, kind);
            table.codes.insert(code.clone(), kind);
        }
        Ok(table)
    }

    pub fn lookup(&self, code: &str) -> Option<DeliveryErrorKind> {
        self.codes.get(code).copied()
    }

    /// Classify one failed response.
    pub fn classify(
        &self,
        error_code: Option<&str>,
        status: Option<&str>,
        http_status: u16,
    ) -> DeliveryErrorKind {
        error_code
            .and_then(|code| self.lookup(code))
            .or_else(|| status.and_then(|status| self.lookup(status)))
            .unwrap_or_else(|| Self::classify_http_status(http_status))
    }

    fn classify_http_status(http_status: u16) -> DeliveryErrorKind {
        match http_status {
            429 => DeliveryErrorKind::RateLimited,
            404 => DeliveryErrorKind::ExpiredToken,
            500..=599 => DeliveryErrorKind::Transient,
            _ => DeliveryErrorKind::Unknown,
        }
    }
}
