//! SQL storage for Vasatey
//!
//! Implements the [`vasatey_common::NotificationStore`] and
//! [`vasatey_common::AlertStore`] ports on top of SQLx's `Any` driver, so the
//! same code runs against SQLite, PostgreSQL or MySQL depending on the enabled
//! features and the configured URL.
//!
//! # Example
//!
//! ```rust,no_run
//! use vasatey_db::{DbClient, SqlAlertRepository};
//!
//! async fn setup() -> Result<SqlAlertRepository, vasatey_db::DbError> {
//!     let db_client = DbClient::from_url("sqlite:data/vasatey.db").await?;
//!     let alerts = SqlAlertRepository::new(db_client);
//!     alerts.init_schema().await?;
//!     Ok(alerts)
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;

pub use client::DbClient;
pub use error::DbError;
pub use repositories::{SqlAlertRepository, SqlNotificationRepository};
