//! Authentication for Firebase Cloud Messaging
//!
//! FCM accepts OAuth2 bearer tokens minted from a service account with the
//! `firebase.messaging` scope. [`ServiceAccountTokenProvider`] mints them and
//! keeps the current token until shortly before it expires.

use async_trait::async_trait;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;
use vasatey_config::FirebaseConfig;
use yup_oauth2::{
    parse_service_account_key, read_service_account_key, ServiceAccountAuthenticator,
    ServiceAccountKey,
};

use crate::client::FirebaseError;

/// OAuth2 scope required by the FCM HTTP v1 API.
pub const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// Google issues tokens valid for one hour; refresh well before that.
const TOKEN_TTL: Duration = Duration::from_secs(50 * 60);

/// Source of bearer tokens for the FCM API.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, FirebaseError>;
}

/// Mints access tokens from a Google service account key.
pub struct ServiceAccountTokenProvider {
    key: ServiceAccountKey,
    cached: Mutex<Option<(String, Instant)>>,
}

impl ServiceAccountTokenProvider {
    pub fn new(key: ServiceAccountKey) -> Self {
        Self {
            key,
            cached: Mutex::new(None),
        }
    }

    /// Load the key named by the configuration.
    ///
    /// Inline JSON wins over `key_path` when both are set.
    pub async fn from_config(config: &FirebaseConfig) -> Result<Self, FirebaseError> {
        Ok(Self::new(load_service_account_key(config).await?))
    }

    /// Project id embedded in the service account key, if any.
    pub fn project_id(&self) -> Option<&str> {
        self.key.project_id.as_deref()
    }

    async fn mint(&self) -> Result<String, FirebaseError> {
        let auth = ServiceAccountAuthenticator::builder(self.key.clone())
            .build()
            .await
            .map_err(|e| FirebaseError::AuthError(e.to_string()))?;

        let token = auth
            .token(&[FCM_SCOPE])
            .await
            .map_err(|e| FirebaseError::AuthError(e.to_string()))?;

        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| FirebaseError::AuthError("No token available".to_string()))
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> Result<String, FirebaseError> {
        let mut cached = self.cached.lock().await;
        if let Some((token, minted_at)) = cached.as_ref() {
            if minted_at.elapsed() < TOKEN_TTL {
                return Ok(token.clone());
            }
        }

        debug!("Minting new FCM access token");
        let token = self.mint().await?;
        *cached = Some((token.clone(), Instant::now()));
        Ok(token)
    }
}

/// Hands out a fixed token. Meant for local gateways and tests.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider(pub String);

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, FirebaseError> {
        Ok(self.0.clone())
    }
}

/// Read the service account key from inline JSON or from `key_path`.
pub async fn load_service_account_key(
    config: &FirebaseConfig,
) -> Result<ServiceAccountKey, FirebaseError> {
    if let Some(json) = config.service_account_json.as_deref() {
        return parse_service_account_key(json)
            .map_err(|e| FirebaseError::ConfigError(format!("Invalid service account JSON: {e}")));
    }

    let key_path = config.key_path.as_deref().ok_or_else(|| {
        FirebaseError::ConfigError("Missing key_path or service_account_json".to_string())
    })?;

    read_service_account_key(Path::new(key_path))
        .await
        .map_err(|e| {
            FirebaseError::ConfigError(format!("Cannot read service account key {key_path}: {e}"))
        })
}
