use utoipa::OpenApi;

use crate::cleanup::{BatchError, CleanupStats};
use crate::handlers::{
    CleanupRequest, CleanupResponse, HealthResponse, ScheduledCleanupResponse,
    SendNotificationResponse,
};
use vasatey_common::models::AlertRequest;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::send_notification_handler,
        crate::handlers::cleanup_handler,
        crate::handlers::monthly_cleanup_handler,
        crate::handlers::health_handler,
    ),
    components(schemas(
        AlertRequest,
        SendNotificationResponse,
        CleanupRequest,
        CleanupResponse,
        ScheduledCleanupResponse,
        CleanupStats,
        BatchError,
        HealthResponse,
    )),
    tags(
        (name = "Alerts", description = "Emergency alert dispatch"),
        (name = "Cleanup", description = "Alert retention"),
        (name = "Health", description = "Liveness")
    )
)]
pub struct AlertsApiDoc;
