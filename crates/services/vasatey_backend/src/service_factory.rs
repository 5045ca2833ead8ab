// --- File: crates/services/vasatey_backend/src/service_factory.rs ---
//! Service factory.
//!
//! Builds the delivery client and the stores once at start-up from the
//! configuration, and hands them to the engines. Nothing is created lazily.
use std::sync::Arc;
use tracing::{error, info, warn};
use vasatey_alerts::cleanup::CleanupJob;
use vasatey_alerts::dispatcher::Dispatcher;
use vasatey_alerts::memory::{InMemoryAlertStore, InMemoryNotificationStore};
use vasatey_common::{AlertStore, DeliveryClient, NotificationStore, VasateyError};
use vasatey_config::AppConfig;
use vasatey_db::{DbClient, SqlAlertRepository, SqlNotificationRepository};
use vasatey_firebase::{FirebaseClient, UnconfiguredClient};

pub struct VasateyServiceFactory {
    config: Arc<AppConfig>,
    delivery: Arc<dyn DeliveryClient>,
    notifications: Arc<dyn NotificationStore>,
    alerts: Arc<dyn AlertStore>,
    database_configured: bool,
}

impl VasateyServiceFactory {
    /// Create the services named by the configuration.
    ///
    /// Missing Firebase credentials leave the service running with dispatch
    /// refused. A configured database that cannot be reached is fatal; without
    /// one, in-memory stores are used.
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, VasateyError> {
        let delivery = Self::delivery_client(&config).await;

        let (notifications, alerts, database_configured): (
            Arc<dyn NotificationStore>,
            Arc<dyn AlertStore>,
            bool,
        ) = match config.database.as_ref() {
            Some(db_config) => {
                info!("Initializing database stores...");
                let db_client = DbClient::from_config(db_config).await.map_err(|e| {
                    error!("Database initialization failed: {}", e);
                    VasateyError::DatabaseError(e.to_string())
                })?;

                let notifications = SqlNotificationRepository::new(db_client.clone());
                let alerts = SqlAlertRepository::new(db_client);
                notifications
                    .init_schema()
                    .await
                    .map_err(|e| VasateyError::DatabaseError(e.to_string()))?;
                alerts
                    .init_schema()
                    .await
                    .map_err(|e| VasateyError::DatabaseError(e.to_string()))?;

                (Arc::new(notifications), Arc::new(alerts), true)
            }
            None => {
                warn!("No database configured; notifications and alerts are kept in memory");
                (
                    Arc::new(InMemoryNotificationStore::new()),
                    Arc::new(InMemoryAlertStore::new()),
                    false,
                )
            }
        };

        Ok(Self::from_parts(
            config,
            delivery,
            notifications,
            alerts,
            database_configured,
        ))
    }

    /// Assemble a factory from ready-made services.
    pub fn from_parts(
        config: Arc<AppConfig>,
        delivery: Arc<dyn DeliveryClient>,
        notifications: Arc<dyn NotificationStore>,
        alerts: Arc<dyn AlertStore>,
        database_configured: bool,
    ) -> Self {
        Self {
            config,
            delivery,
            notifications,
            alerts,
            database_configured,
        }
    }

    async fn delivery_client(config: &AppConfig) -> Arc<dyn DeliveryClient> {
        let Some(firebase) = config.firebase.as_ref().filter(|f| f.has_credentials()) else {
            warn!("Firebase credentials not configured; alert dispatch is disabled");
            return Arc::new(UnconfiguredClient);
        };

        info!("Initializing Firebase client...");
        match FirebaseClient::from_config(firebase).await {
            Ok(client) => {
                info!(project_id = client.project_id(), "Firebase client ready");
                Arc::new(client)
            }
            Err(e) => {
                error!("Firebase initialization failed: {}", e);
                Arc::new(UnconfiguredClient)
            }
        }
    }

    pub fn config(&self) -> &Arc<AppConfig> {
        &self.config
    }

    pub fn database_configured(&self) -> bool {
        self.database_configured
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::from_config(
            &self.config.dispatch,
            self.delivery.clone(),
            Some(self.notifications.clone()),
        )
    }

    pub fn cleanup_job(&self) -> CleanupJob {
        CleanupJob::from_config(self.alerts.clone(), &self.config.cleanup)
    }
}
