// --- File: crates/services/vasatey_backend/src/lib.rs ---
//! Vasatey backend service: wires configuration, the delivery client, the
//! stores and the alert routes into one axum application.

pub mod app_state;
pub mod scheduler;
pub mod service_factory;

use axum::{routing::get, Router};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Build the full application router.
///
/// Alert routes are nested under `/api`; Swagger UI is mounted at `/api/docs`
/// when the `openapi` feature is enabled.
pub fn build_router(state: &AppState) -> Router {
    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the Vasatey notification API!" }))
        .merge(vasatey_alerts::routes(state.alerts.clone()));

    #[allow(unused_mut)] // mutated only with the openapi feature
    let mut app = Router::new().nest("/api", api_router);

    #[cfg(feature = "openapi")]
    {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;
        use vasatey_alerts::openapi::AlertsApiDoc;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Vasatey API",
                version = "0.1.0",
                description = "Emergency alert notification service"
            ),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(AlertsApiDoc::openapi());
        tracing::info!("Adding Swagger UI at /api/docs");

        app = app.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc));
    }

    app.layer(cors_layer()).layer(TraceLayer::new_for_http())
}

/// Any origin may call the API; browsers cache the preflight for a day.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(86_400))
}
