//! Error rendering at the HTTP boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gateway_core::GatewayError;
use serde_json::json;
use tracing::{error, warn};

/// Error body shape expected by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDialect {
    /// `{"error":{"message","type"}}`
    OpenAi,
    /// `{"type":"error","error":{"type","message"}}`
    Anthropic,
}

impl ErrorDialect {
    /// Dialect for an inbound path
    #[must_use]
    pub fn for_path(path: &str) -> Self {
        if path.starts_with("/v1/messages") {
            Self::Anthropic
        } else {
            Self::OpenAi
        }
    }
}

/// A [`GatewayError`] bound to the dialect it is rendered in
#[derive(Debug)]
pub struct ApiError {
    /// Underlying error
    pub error: GatewayError,
    /// Output shape
    pub dialect: ErrorDialect,
}

impl ApiError {
    /// Render in the OpenAI shape
    #[must_use]
    pub fn openai(error: GatewayError) -> Self {
        Self {
            error,
            dialect: ErrorDialect::OpenAi,
        }
    }

    /// Render in the Anthropic shape
    #[must_use]
    pub fn anthropic(error: GatewayError) -> Self {
        Self {
            error,
            dialect: ErrorDialect::Anthropic,
        }
    }

    /// HTTP status
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// JSON body
    #[must_use]
    pub fn body(&self) -> serde_json::Value {
        let message = self.error.to_string();
        match self.dialect {
            ErrorDialect::OpenAi => json!({
                "error": {
                    "message": message,
                    "type": self.error.error_type(),
                }
            }),
            ErrorDialect::Anthropic => json!({
                "type": "error",
                "error": {
                    "type": anthropic_error_type(&self.error),
                    "message": message,
                }
            }),
        }
    }
}

/// Anthropic error type string
fn anthropic_error_type(error: &GatewayError) -> &'static str {
    match error.status_code() {
        400 => "invalid_request_error",
        401 => "authentication_error",
        403 => "permission_error",
        404 => "not_found_error",
        405 => "invalid_request_error",
        413 => "request_too_large",
        429 => "rate_limit_error",
        529 => "overloaded_error",
        _ => "api_error",
    }
}

impl From<GatewayError> for ApiError {
    fn from(error: GatewayError) -> Self {
        Self::openai(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.error, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self.error, "Request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}
