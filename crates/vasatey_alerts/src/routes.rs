use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers::{
    cleanup_handler, health_handler, monthly_cleanup_handler, send_notification_handler,
    AlertsState,
};

/// Creates a router with the alert, cleanup and health endpoints.
///
/// The camelCase paths serve older mobile clients.
pub fn routes(state: Arc<AlertsState>) -> Router {
    Router::new()
        .route("/notifications/send", post(send_notification_handler))
        .route("/sendNotification", post(send_notification_handler))
        .route("/cleanup", post(cleanup_handler))
        .route("/cleanupAlerts", post(cleanup_handler))
        .route("/cron/monthly-cleanup", get(monthly_cleanup_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}
