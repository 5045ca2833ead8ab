// --- File: crates/vasatey_common/src/error.rs ---
use thiserror::Error;

use crate::models::{DeliveryError, DeliveryErrorKind};

/// The base error type for everything the HTTP surface can report.
///
/// Each crate keeps its own error enum and converts into `VasateyError` at the
/// boundary.
#[derive(Error, Debug)]
pub enum VasateyError {
    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The request failed a validation rule
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during a storage operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// The push gateway refused or failed the delivery
    #[error("Delivery failed after {attempts} attempt(s): {source}")]
    DeliveryFailed {
        #[source]
        source: DeliveryError,
        attempts: u32,
    },

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for VasateyError {
    fn status_code(&self) -> u16 {
        match self {
            VasateyError::ParseError(_) => 400,
            VasateyError::ConfigError(_) => 500,
            VasateyError::ValidationError(_) => 400,
            VasateyError::DatabaseError(_) => 500,
            VasateyError::DeliveryFailed { source, .. } => match source.kind {
                DeliveryErrorKind::InvalidToken => 404,
                DeliveryErrorKind::ExpiredToken => 410,
                DeliveryErrorKind::RateLimited => 429,
                DeliveryErrorKind::Transient
                | DeliveryErrorKind::InvalidArgument
                | DeliveryErrorKind::Unknown => 500,
            },
            VasateyError::InternalError(_) => 500,
        }
    }
}

impl VasateyError {
    /// Machine-readable code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            VasateyError::ParseError(_) => "invalid-json",
            VasateyError::ConfigError(_) => "configuration-error",
            VasateyError::ValidationError(_) => "validation-error",
            VasateyError::DatabaseError(_) => "storage-error",
            VasateyError::DeliveryFailed { source, .. } => source.kind.as_str(),
            VasateyError::InternalError(_) => "internal-error",
        }
    }

    /// Short human-readable summary for the response body.
    pub fn title(&self) -> &'static str {
        match self {
            VasateyError::ParseError(_) => "Malformed request body",
            VasateyError::ConfigError(_) => "Service misconfigured",
            VasateyError::ValidationError(_) => "Missing or invalid fields",
            VasateyError::DatabaseError(_) => "Storage failure",
            VasateyError::DeliveryFailed { source, .. } => match source.kind {
                DeliveryErrorKind::InvalidToken => "Registration token invalid",
                DeliveryErrorKind::ExpiredToken => "Registration token expired",
                DeliveryErrorKind::RateLimited => "Rate limited, retry later",
                _ => "Notification delivery failed",
            },
            VasateyError::InternalError(_) => "Internal error",
        }
    }
}

// Common error conversions
impl From<serde_json::Error> for VasateyError {
    fn from(err: serde_json::Error) -> Self {
        VasateyError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for VasateyError {
    fn from(err: std::io::Error) -> Self {
        VasateyError::InternalError(err.to_string())
    }
}

impl From<crate::services::StorageError> for VasateyError {
    fn from(err: crate::services::StorageError) -> Self {
        VasateyError::DatabaseError(err.to_string())
    }
}
