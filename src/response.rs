//! The JSON envelopes wrapped around every API response.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The envelope for a successful response, e.g. `{"status": "success", "data": {...}}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    status: &'static str,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap `data` in a success envelope.
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// The envelope for a successful response that only carries a message,
/// e.g. `{"status": "success", "message": "Password updated successfully"}`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    status: &'static str,
    message: String,
}

impl MessageResponse {
    /// Create a success envelope with `message`.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
        }
    }
}

impl IntoResponse for MessageResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// The envelope for a failed response, e.g. `{"status": "error", "message": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    status: &'static str,
    message: String,
}

impl ErrorResponse {
    /// Create an error envelope with a message that is safe to show to the client.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}
