//! Emergency-alert dispatch and retention cleanup
//!
//! - [`dispatcher::Dispatcher`] validates an alert request, builds one push
//!   message and delivers it through a [`vasatey_common::DeliveryClient`] with
//!   bounded, classified retries.
//! - [`cleanup::CleanupJob`] purges alert records older than a cutoff in
//!   size-bounded batches, tolerating failed batches.
//! - [`routes`] exposes both over HTTP.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vasatey_alerts::cleanup::CleanupJob;
//! use vasatey_alerts::dispatcher::Dispatcher;
//! use vasatey_alerts::handlers::{AlertsState, ServiceInfo};
//! use vasatey_alerts::memory::{InMemoryAlertStore, InMemoryNotificationStore};
//! use vasatey_common::DeliveryClient;
//! use vasatey_config::AppConfig;
//!
//! fn router(config: &AppConfig, client: Arc<dyn DeliveryClient>) -> axum::Router {
//!     let dispatcher = Dispatcher::from_config(
//!         &config.dispatch,
//!         client,
//!         Some(Arc::new(InMemoryNotificationStore::new())),
//!     );
//!     let cleanup = CleanupJob::from_config(Arc::new(InMemoryAlertStore::new()), &config.cleanup);
//!     vasatey_alerts::routes(Arc::new(AlertsState {
//!         dispatcher: Arc::new(dispatcher),
//!         cleanup: Arc::new(cleanup),
//!         default_days_old: config.cleanup.default_days_old,
//!         service: ServiceInfo::new(config.environment.clone(), false),
//!     }))
//! }
//! ```

pub mod cleanup;
pub mod dispatcher;
#[cfg(feature = "openapi")]
pub mod doc;
pub mod handlers;
pub mod memory;
pub mod message;
pub mod retry;
pub mod routes;
pub mod validator;


pub use routes::routes;

#[cfg(feature = "openapi")]
pub mod openapi {
    pub use crate::doc::AlertsApiDoc;
}
