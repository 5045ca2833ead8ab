// --- File: crates/vasatey_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{HttpStatusCode, VasateyError};

// Include the client module
pub mod client;

/// Extension trait for VasateyError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for VasateyError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // `{success, error, message, code}` is what the mobile clients parse
        let body = Json(json!({
            "success": false,
            "error": self.title(),
            "message": self.to_string(),
            "code": self.code(),
        }));

        (status_code, body).into_response()
    }
}

/// Implement IntoResponse for VasateyError to make it easier to use in Axum handlers.
impl IntoResponse for VasateyError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}
