//! Custom Axum extractors for the gateway.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use std::convert::Infallible;

/// Request ID from `x-request-id` (or `x-correlation-id`), generated when absent
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("x-request-id")
            .or_else(|| parts.headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

        Ok(Self(id))
    }
}

/// Client credential from `Authorization: Bearer <key>` or `x-api-key`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedKey(pub Option<String>);

impl PresentedKey {
    /// Read the credential from request headers; bearer wins over `x-api-key`
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        let key = bearer
            .or_else(|| headers.get("x-api-key").and_then(|v| v.to_str().ok()).map(str::trim))
            .filter(|k| !k.is_empty())
            .map(String::from);

        Self(key)
    }
}
