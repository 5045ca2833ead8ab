//! Firebase Cloud Messaging delivery for Vasatey
//!
//! This crate implements the [`vasatey_common::DeliveryClient`] port on top of
//! the FCM HTTP v1 API.
//!
//! # Features
//!
//! - Service-account authentication, from a key file or inline JSON
//! - Access-token caching between sends
//! - Classification of gateway errors into delivery error kinds, with
//!   per-deployment overrides
//!
//! # Example
//!
//! ```rust,no_run
//! use vasatey_config::FirebaseConfig;
//! use vasatey_firebase::FirebaseClient;
//!
//! async fn build() -> Result<FirebaseClient, vasatey_firebase::FirebaseError> {
//!     let config = FirebaseConfig {
//!         key_path: Some("/path/to/service-account.json".to_string()),
//!         ..FirebaseConfig::default()
//!     };
//!     FirebaseClient::from_config(&config).await
//! }
//! ```

pub mod auth;
pub mod classification;
pub mod client;
pub mod models;

pub use auth::{AccessTokenProvider, ServiceAccountTokenProvider, StaticTokenProvider};
pub use classification::ClassificationTable;
pub use client::{FirebaseClient, FirebaseError, UnconfiguredClient};
