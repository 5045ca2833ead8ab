//! Firebase Cloud Messaging client module
//!
//! [`FirebaseClient`] sends one [`PushMessage`] per call through the FCM HTTP v1
//! API and reports every failure as a classified [`DeliveryError`]. Retrying is
//! left to the caller.

use async_trait::async_trait;
use reqwest::{header, Client};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use vasatey_common::create_client;
use vasatey_common::models::{DeliveryError, DeliveryErrorKind, PushMessage};
use vasatey_common::DeliveryClient;
use vasatey_config::FirebaseConfig;

use crate::auth::{AccessTokenProvider, ServiceAccountTokenProvider};
use crate::classification::ClassificationTable;
use crate::models::{ErrorResponse, SendRequest, SendResponse};

/// Errors that can occur while setting up or talking to FCM
#[derive(Error, Debug)]
pub enum FirebaseError {
    /// Error during authentication with Firebase
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error during HTTP request to Firebase API
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Missing or invalid configuration
    #[error("Missing configuration: {0}")]
    ConfigError(String),

    /// Error returned by the Firebase API
    #[error("Firebase API error: {0}")]
    ApiError(String),
}

/// Client for the FCM HTTP v1 API
pub struct FirebaseClient {
    client: Client,
    endpoint: String,
    project_id: String,
    tokens: Arc<dyn AccessTokenProvider>,
    classifier: ClassificationTable,
}

impl FirebaseClient {
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        project_id: impl Into<String>,
        tokens: Arc<dyn AccessTokenProvider>,
        classifier: ClassificationTable,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            tokens,
            classifier,
        }
    }

    /// Build a client from configuration.
    ///
    /// The project id falls back to the one embedded in the service account
    /// key when the configuration does not name one.
    pub async fn from_config(config: &FirebaseConfig) -> Result<Self, FirebaseError> {
        let provider = ServiceAccountTokenProvider::from_config(config).await?;

        let project_id = config
            .project_id
            .clone()
            .or_else(|| provider.project_id().map(str::to_string))
            .ok_or_else(|| {
                FirebaseError::ConfigError("Missing project_id in FirebaseConfig".to_string())
            })?;

        let classifier = ClassificationTable::with_overrides(&config.error_code_overrides)?;
        let client = create_client(config.timeout_secs, false)?;

        Ok(Self::new(
            client,
            config.endpoint.clone(),
            project_id,
            Arc::new(provider),
            classifier,
        ))
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.endpoint, self.project_id
        )
    }

    /// Turn a transport failure into a delivery error.
    fn classify_transport(error: &reqwest::Error) -> DeliveryError {
        let kind = if error.is_timeout() || error.is_connect() {
            DeliveryErrorKind::Transient
        } else {
            DeliveryErrorKind::Unknown
        };
        DeliveryError::new(kind, error.to_string())
    }

    /// Turn a non-2xx response body into a delivery error.
    fn classify_response(&self, http_status: u16, body: &str) -> DeliveryError {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(response) => {
                let error = response.error;
                let code = error.error_code().or(error.status.as_deref());
                let kind =
                    self.classifier
                        .classify(error.error_code(), error.status.as_deref(), http_status);
                let detail = if error.message.is_empty() {
                    format!("FCM returned HTTP {http_status}")
                } else {
                    error.message.clone()
                };

                let delivery_error = DeliveryError::new(kind, detail);
                match code {
                    Some(code) => delivery_error.with_code(code),
                    None => delivery_error,
                }
            }
            Err(_) => DeliveryError::new(
                self.classifier.classify(None, None, http_status),
                format!("FCM returned HTTP {http_status}: {body}"),
            ),
        }
    }
}

#[async_trait]
impl DeliveryClient for FirebaseClient {
    async fn send(&self, message: &PushMessage) -> Result<String, DeliveryError> {
        let token = self.tokens.access_token().await.map_err(|e| {
            warn!("Could not obtain FCM access token: {}", e);
            DeliveryError::new(DeliveryErrorKind::Unknown, e.to_string())
        })?;

        let response = self
            .client
            .post(self.send_url())
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .json(&SendRequest { message })
            .send()
            .await
            .map_err(|e| Self::classify_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = self.classify_response(status.as_u16(), &body);
            debug!(
                "FCM rejected message: status={} kind={} code={:?}",
                status, error.kind, error.code
            );
            return Err(error);
        }

        let sent: SendResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::new(DeliveryErrorKind::Unknown, e.to_string()))?;
        Ok(sent.name)
    }
}

/// Stand-in used when no Firebase credentials are configured.
///
/// Every send fails; [`DeliveryClient::is_configured`] reports `false` so the
/// HTTP layer can refuse dispatches up front.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredClient;

#[async_trait]
impl DeliveryClient for UnconfiguredClient {
    async fn send(&self, _message: &PushMessage) -> Result<String, DeliveryError> {
        Err(DeliveryError::new(
            DeliveryErrorKind::Unknown,
            "Firebase is not configured",
        ))
    }

    fn is_configured(&self) -> bool {
        false
    }
}
