// File: services/vasatey_backend/src/main.rs
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use vasatey_backend::app_state::AppState;
use vasatey_backend::build_router;
use vasatey_backend::scheduler::spawn_cleanup_schedule;
use vasatey_common::{logging, VasateyError};
use vasatey_config::load_config;

#[tokio::main]
async fn main() -> Result<(), VasateyError> {
    let config = Arc::new(load_config().map_err(|e| VasateyError::ConfigError(e.to_string()))?);
    let _log_guard = logging::init(&config.logging);

    let state = AppState::new(config.clone()).await?;

    let cancel = CancellationToken::new();
    let schedule = spawn_cleanup_schedule(
        state.cleanup_job(),
        config.cleanup.default_days_old,
        config.cleanup.schedule_interval_hours,
        cancel.clone(),
    );

    let app = build_router(&state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Starting server at http://{}", addr);
    tracing::info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await?;

    cancel.cancel();
    if let Some(handle) = schedule {
        if let Err(e) = handle.await {
            tracing::warn!("Retention schedule did not stop cleanly: {}", e);
        }
    }
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(cancel: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
    cancel.cancel();
}
