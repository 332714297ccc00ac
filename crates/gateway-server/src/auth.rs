//! Front-door authentication against the service key.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use gateway_core::GatewayError;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::{
    error::{ApiError, ErrorDialect},
    extractors::PresentedKey,
    state::AppState,
};

/// SHA-256 digest of the configured service key
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceKey([u8; 32]);

impl ServiceKey {
    /// Digest a raw key
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self(hash_key(key))
    }

    /// Whether `candidate` is the service key
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == hash_key(candidate)
    }
}

impl std::fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ServiceKey([REDACTED])")
    }
}

fn hash_key(key: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.finalize().into()
}

/// Reject `/v1` requests that do not present the service key.
///
/// Passes everything through when no service key is configured.
pub async fn auth_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(service_key) = state.service_key.as_ref() else {
        return next.run(request).await;
    };

    let path = request.uri().path().to_string();
    match PresentedKey::from_headers(request.headers()).0 {
        Some(key) if service_key.matches(&key) => {
            debug!(path = %path, "Request authenticated");
            next.run(request).await
        }
        presented => {
            warn!(path = %path, presented = presented.is_some(), "Authentication failed");
            let error = GatewayError::Unauthorized("Unauthorized".to_string());
            ApiError {
                error,
                dialect: ErrorDialect::for_path(&path),
            }
            .into_response()
        }
    }
}
