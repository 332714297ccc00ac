//! Error types for the gateway.
//!
//! Every failure on the request path is expressed as a [`GatewayError`]. The
//! server crate decides which protocol shape the error is rendered in; this
//! module only fixes the status code and the error type string.

use thiserror::Error;

/// Result alias used throughout the gateway crates
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway error taxonomy
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Malformed body or missing required field
    #[error("{0}")]
    InvalidRequest(String),

    /// Inbound credentials missing or wrong
    #[error("{0}")]
    Unauthorized(String),

    /// Neither a direct nor a composite model key resolved
    #[error("Model '{0}' not found")]
    ModelNotFound(String),

    /// A route resolved but held no provider to pick from
    #[error("No provider available for model '{0}'")]
    NoProviderAvailable(String),

    /// Provider answered with a non-2xx status and a JSON error body
    #[error("[{provider}] API request failed, message: {message}")]
    Upstream {
        /// Provider name from configuration
        provider: String,
        /// Status code returned by the provider
        status: u16,
        /// Message extracted from the provider's error body
        message: String,
    },

    /// Provider answered with a non-2xx status and a body that is not JSON
    #[error("[{provider}] API request failed with status {status}")]
    UpstreamUnparseable {
        /// Provider name from configuration
        provider: String,
        /// Status code returned by the provider
        status: u16,
    },

    /// A provider payload could not be mapped into the client protocol
    #[error("Translation error: {0}")]
    Translation(String),

    /// No registry entry for a response identifier
    #[error("Response ID '{0}' not found")]
    ResponseNotFound(String),

    /// HTTP method not supported on this path
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Configuration problem detected at request time
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Anything else; the message keeps the original failure text
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a translation error
    pub fn translation(message: impl Into<String>) -> Self {
        Self::Translation(message.into())
    }

    /// Create an upstream error
    pub fn upstream(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    /// HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::ModelNotFound(_) | Self::ResponseNotFound(_) => 404,
            Self::MethodNotAllowed => 405,
            Self::Upstream { status, .. } => *status,
            Self::NoProviderAvailable(_)
            | Self::UpstreamUnparseable { .. }
            | Self::Translation(_)
            | Self::Configuration(_)
            | Self::Internal(_) => 500,
        }
    }

    /// OpenAI-style error type string
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request_error",
            Self::Unauthorized(_) => "unauthorized",
            Self::ModelNotFound(_) => "model_not_found",
            Self::ResponseNotFound(_) => "response_not_found",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::Configuration(_) => "configuration_error",
            Self::Upstream { .. } | Self::UpstreamUnparseable { .. } => "internal_server_error",
            Self::NoProviderAvailable(_) | Self::Translation(_) | Self::Internal(_) => {
                "internal_error"
            }
        }
    }

    /// Whether the error was caused by the client
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
