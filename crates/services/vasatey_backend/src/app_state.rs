// --- File: crates/services/vasatey_backend/src/app_state.rs ---
use std::sync::Arc;
use vasatey_alerts::cleanup::CleanupJob;
use vasatey_alerts::handlers::{AlertsState, ServiceInfo};
use vasatey_common::VasateyError;
use vasatey_config::AppConfig;

use crate::service_factory::VasateyServiceFactory;

/// Application state shared by the router and the background tasks.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub alerts: Arc<AlertsState>,
}

impl AppState {
    /// Build every service from the configuration.
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, VasateyError> {
        let factory = VasateyServiceFactory::new(config).await?;
        Ok(Self::from_factory(&factory))
    }

    pub fn from_factory(factory: &VasateyServiceFactory) -> Self {
        let config = factory.config().clone();
        let alerts = AlertsState {
            dispatcher: Arc::new(factory.dispatcher()),
            cleanup: Arc::new(factory.cleanup_job()),
            default_days_old: config.cleanup.default_days_old,
            service: ServiceInfo::new(config.environment.clone(), factory.database_configured()),
        };

        Self {
            config,
            alerts: Arc::new(alerts),
        }
    }

    pub fn cleanup_job(&self) -> Arc<CleanupJob> {
        self.alerts.cleanup.clone()
    }
}
