// --- File: crates/vasatey_common/src/lib.rs ---

pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Shared domain models
pub mod services; // Port traits for external collaborators


// Re-export error types and utilities for easier access
pub use error::{HttpStatusCode, VasateyError};

// Re-export HTTP utilities for easier access
pub use http::{client::create_client, IntoHttpResponse};

// Re-export the ports
pub use services::{AlertStore, DeliveryClient, NotificationStore, StorageError};

// This crate holds what the dispatch engine, the retention engine and their
// adapters share: the domain models, the port traits, the error type and logging.
