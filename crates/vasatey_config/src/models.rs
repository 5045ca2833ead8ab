// --- File: crates/vasatey_config/src/models.rs ---

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default number of delivery attempts per alert.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default linear backoff base between attempts.
pub const DEFAULT_RETRY_DELAY_BASE_MS: u64 = 1000;
/// Deletes per batch; stays under the 500-operation commit ceiling of the record store.
pub const DEFAULT_CLEANUP_BATCH_SIZE: usize = 450;
/// Hard ceiling for a single batch commit.
pub const MAX_CLEANUP_BATCH_SIZE: usize = 500;
/// Retention window for alert records.
pub const DEFAULT_RETENTION_DAYS: u32 = 30;
/// Shortest device token accepted for delivery.
pub const DEFAULT_MIN_TOKEN_LENGTH: usize = 10;
pub const DEFAULT_ANDROID_CHANNEL_ID: &str = "emergency_alerts";
pub const DEFAULT_FCM_ENDPOINT: &str = "https://fcm.googleapis.com";

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    // e.g. sqlite:data/vasatey.db, loaded via VASATEY__DATABASE__URL or DATABASE_URL
    pub url: String,
}

// --- Firebase Cloud Messaging Config ---
// Credentials come either from a key file or from inline JSON (FIREBASE_SERVICE_ACCOUNT).
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FirebaseConfig {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub key_path: Option<String>,
    #[serde(default)]
    pub service_account_json: Option<String>,
    #[serde(default = "default_fcm_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra backend error codes mapped to a classification name
    /// (`invalid-token`, `expired-token`, `rate-limited`, `transient`,
    /// `invalid-argument`, `unknown`).
    #[serde(default)]
    pub error_code_overrides: HashMap<String, String>,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            key_path: None,
            service_account_json: None,
            endpoint: default_fcm_endpoint(),
            timeout_secs: default_timeout_secs(),
            error_code_overrides: HashMap::new(),
        }
    }
}

impl FirebaseConfig {
    /// Whether any credential source is present.
    pub fn has_credentials(&self) -> bool {
        self.key_path.as_deref().is_some_and(|p| !p.is_empty())
            || self
                .service_account_json
                .as_deref()
                .is_some_and(|j| !j.trim().is_empty())
    }
}

fn default_fcm_endpoint() -> String {
    DEFAULT_FCM_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// How alerts are presented on the receiving device.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageMode {
    /// The OS renders title and body directly.
    #[default]
    Visible,
    /// Data-only; the app renders the alert itself.
    Silent,
}

/// Request fields that a deployment may declare mandatory.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    #[serde(alias = "deviceToken", alias = "token")]
    DeviceToken,
    Title,
    Body,
    #[serde(alias = "recipientEmail", alias = "email")]
    RecipientEmail,
    #[serde(alias = "fullName")]
    FullName,
    #[serde(alias = "phoneNumber")]
    PhoneNumber,
}

impl RequiredField {
    /// The field name as it appears in the request JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredField::DeviceToken => "deviceToken",
            RequiredField::Title => "title",
            RequiredField::Body => "body",
            RequiredField::RecipientEmail => "recipientEmail",
            RequiredField::FullName => "fullName",
            RequiredField::PhoneNumber => "phoneNumber",
        }
    }
}

// --- Dispatch Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DispatchConfig {
    /// Total delivery attempts, first one included.
    pub max_retries: u32,
    pub retry_delay_base_ms: u64,
    /// Allow one backed-off retry after a rate-limit response instead of aborting.
    pub retry_rate_limited_once: bool,
    pub min_token_length: usize,
    pub required_fields: Vec<RequiredField>,
    pub message_mode: MessageMode,
    pub android_channel_id: String,
    /// Record each dispatch in the notification store when one is available.
    pub persist_notifications: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_base_ms: DEFAULT_RETRY_DELAY_BASE_MS,
            retry_rate_limited_once: false,
            min_token_length: DEFAULT_MIN_TOKEN_LENGTH,
            required_fields: vec![
                RequiredField::DeviceToken,
                RequiredField::Title,
                RequiredField::Body,
                RequiredField::RecipientEmail,
            ],
            message_mode: MessageMode::Visible,
            android_channel_id: DEFAULT_ANDROID_CHANNEL_ID.to_string(),
            persist_notifications: true,
        }
    }
}

// --- Cleanup Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CleanupConfig {
    pub batch_size: usize,
    pub default_days_old: u32,
    /// Run the retention cleanup in-process every N hours. Disabled when absent.
    pub schedule_interval_hours: Option<u64>,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_CLEANUP_BATCH_SIZE,
            default_days_old: DEFAULT_RETENTION_DAYS,
            schedule_interval_hours: None,
        }
    }
}

// --- Logging Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for daily-rolling log files; stdout only when absent.
    pub directory: Option<String>,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "vasatey".to_string(),
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub environment: String,

    // --- Optional integrations ---
    pub firebase: Option<FirebaseConfig>,
    pub database: Option<DatabaseConfig>,

    pub dispatch: DispatchConfig,
    pub cleanup: CleanupConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            environment: "development".to_string(),
            firebase: None,
            database: None,
            dispatch: DispatchConfig::default(),
            cleanup: CleanupConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
