//! HTTP handlers for alert dispatch, retention cleanup and health.
//!
//! Errors are returned as [`VasateyError`], which renders the
//! `{success: false, error, message, code}` body with the matching status.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use vasatey_common::models::{AlertRequest, DeliveryOutcome};
use vasatey_common::VasateyError;

use crate::cleanup::{CleanupError, CleanupJob, CleanupStats};
use crate::dispatcher::{DispatchError, Dispatcher};

/// Static facts about the running service, reported by `/health`.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub environment: String,
    pub database_configured: bool,
    pub started_at: Instant,
}

impl ServiceInfo {
    pub fn new(environment: impl Into<String>, database_configured: bool) -> Self {
        Self {
            name: "vasatey-notify".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: environment.into(),
            database_configured,
            started_at: Instant::now(),
        }
    }
}

/// Shared state for the alert handlers
pub struct AlertsState {
    pub dispatcher: Arc<Dispatcher>,
    pub cleanup: Arc<CleanupJob>,
    /// Retention used when a request names none
    pub default_days_old: u32,
    pub service: ServiceInfo,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationResponse {
    pub success: bool,
    pub message_id: String,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupRequest {
    /// Age threshold in days
    pub days_old: Option<u32>,
    #[serde(default)]
    pub delete_all: bool,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub success: bool,
    pub message: String,
    pub stats: CleanupStats,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledCleanupResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub result: CleanupStats,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub environment: String,
    pub firebase_configured: bool,
    pub database_configured: bool,
}

/// Send one emergency alert to one device.
///
/// Invalid requests are rejected with 400 even when no gateway is configured.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/notifications/send",
    request_body = AlertRequest,
    responses(
        (status = 200, description = "Alert accepted by the push gateway", body = SendNotificationResponse),
        (status = 400, description = "Malformed body or missing/invalid fields"),
        (status = 404, description = "Registration token invalid"),
        (status = 410, description = "Registration token expired"),
        (status = 429, description = "Rate limited, retry later"),
        (status = 500, description = "Delivery failed after retries, or storage failure")
    ),
    tag = "Alerts"
))]
pub async fn send_notification_handler(
    State(state): State<Arc<AlertsState>>,
    payload: Result<Json<AlertRequest>, JsonRejection>,
) -> Result<Json<SendNotificationResponse>, VasateyError> {
    let Json(request) =
        payload.map_err(|rejection| VasateyError::ParseError(rejection.body_text()))?;

    let result = state.dispatcher.dispatch(request).await.map_err(|e| match e {
        DispatchError::Validation(e) => VasateyError::ValidationError(e.to_string()),
        DispatchError::NotConfigured => {
            warn!("Rejecting alert: Firebase is not configured");
            VasateyError::ConfigError(e.to_string())
        }
        DispatchError::Storage(e) => VasateyError::from(e),
    })?;

    match result.outcome {
        DeliveryOutcome::Sent { message_id } => Ok(Json(SendNotificationResponse {
            success: true,
            message_id,
            attempts: result.attempts,
            notification_id: result.notification_id,
        })),
        DeliveryOutcome::Failed(error) => Err(VasateyError::DeliveryFailed {
            source: error,
            attempts: result.attempts,
        }),
    }
}

/// Purge alerts older than `daysOld` days, or all of them with `deleteAll`.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/cleanup",
    request_body(content = CleanupRequest, example = json!({"daysOld": 30})),
    responses(
        (status = 200, description = "Cleanup ran; failed batches are listed in the stats", body = CleanupResponse),
        (status = 400, description = "Malformed body"),
        (status = 500, description = "The alert query failed")
    ),
    tag = "Cleanup"
))]
pub async fn cleanup_handler(
    State(state): State<Arc<AlertsState>>,
    body: Bytes,
) -> Result<Json<CleanupResponse>, VasateyError> {
    // an empty body means "use the defaults"
    let request: CleanupRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CleanupRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };

    let stats = if request.delete_all {
        info!("Deleting all alerts on request");
        state.cleanup.run_all().await
    } else {
        state
            .cleanup
            .run(request.days_old.unwrap_or(state.default_days_old))
            .await
    }
    .map_err(cleanup_error)?;

    Ok(Json(CleanupResponse {
        success: true,
        message: summarize(&stats),
        stats,
    }))
}

/// Run the periodic retention cleanup with the configured default age.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/cron/monthly-cleanup",
    responses(
        (status = 200, description = "Cleanup ran", body = ScheduledCleanupResponse),
        (status = 500, description = "The alert query failed")
    ),
    tag = "Cleanup"
))]
pub async fn monthly_cleanup_handler(
    State(state): State<Arc<AlertsState>>,
) -> Result<Json<ScheduledCleanupResponse>, VasateyError> {
    let stats = state
        .cleanup
        .run(state.default_days_old)
        .await
        .map_err(cleanup_error)?;

    Ok(Json(ScheduledCleanupResponse {
        success: true,
        message: format!("Monthly cleanup completed: {}", summarize(&stats)),
        timestamp: Utc::now(),
        result: stats,
    }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "Health"
))]
pub async fn health_handler(State(state): State<Arc<AlertsState>>) -> Json<HealthResponse> {
    let service = &state.service;
    Json(HealthResponse {
        status: "ok".to_string(),
        service: service.name.clone(),
        version: service.version.clone(),
        timestamp: Utc::now(),
        uptime_seconds: service.started_at.elapsed().as_secs(),
        environment: service.environment.clone(),
        firebase_configured: state.dispatcher.is_configured(),
        database_configured: service.database_configured,
    })
}

fn cleanup_error(error: CleanupError) -> VasateyError {
    VasateyError::DatabaseError(error.to_string())
}

fn summarize(stats: &CleanupStats) -> String {
    let scope = match stats.days_old {
        Some(days) => format!("older than {days} days"),
        None => "(all)".to_string(),
    };
    if stats.is_complete() {
        format!("Deleted {} alerts {}", stats.total_deleted, scope)
    } else {
        format!(
            "Deleted {} of {} alerts {}; {} batch(es) failed",
            stats.total_deleted,
            stats.scanned_count,
            scope,
            stats.batch_errors.len()
        )
    }
}
