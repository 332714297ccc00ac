//! HTTP request handlers for the gateway API.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::Method,
    response::Response,
    Json,
};
use gateway_core::{GatewayError, GatewayResult, Operation, UnifiedRequest};
use gateway_telemetry::request_span;
use serde::Serialize;
use tracing::{debug, Instrument};

use crate::{
    error::{ApiError, ErrorDialect},
    extractors::RequestId,
    proxy,
    state::AppState,
};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// Version
    pub version: &'static str,
    /// Logical models in the current routing table
    pub models: usize,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        models: state.routing.snapshot().model_count(),
    })
}

/// One entry of `/v1/models`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelObject {
    /// Logical model name
    pub id: String,
    /// Always `"model"`
    pub object: &'static str,
    /// Unix seconds
    pub created: i64,
    /// Configured owner label
    pub owned_by: String,
}

impl ModelObject {
    fn new(id: &str, owned_by: &str) -> Self {
        Self {
            id: id.to_string(),
            object: "model",
            created: chrono::Utc::now().timestamp(),
            owned_by: owned_by.to_string(),
        }
    }
}

/// `/v1/models` body
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    /// Always `"list"`
    pub object: &'static str,
    /// Listed models
    pub data: Vec<ModelObject>,
}

/// List logical models
pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let table = state.routing.snapshot();
    let owned_by = state.config.models.owned_by.as_str();
    let data = table.model_names().map(|name| ModelObject::new(name, owned_by)).collect();

    Json(ModelsResponse { object: "list", data })
}

/// Get one logical model
pub async fn get_model(
    State(state): State<AppState>,
    Path(model_id): Path<String>,
) -> Result<Json<ModelObject>, ApiError> {
    let table = state.routing.snapshot();
    if table.route(&model_id).is_none() {
        return Err(ApiError::openai(GatewayError::ModelNotFound(model_id)));
    }
    Ok(Json(ModelObject::new(&model_id, &state.config.models.owned_by)))
}

/// `POST /v1/chat/completions`
pub async fn chat_completions(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = UnifiedRequest::chat_completions(&body).map_err(ApiError::openai)?;
    dispatch(&state, request, &request_id, ErrorDialect::OpenAi).await
}

/// `POST /v1/messages`
pub async fn messages(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = UnifiedRequest::messages(&body).map_err(ApiError::anthropic)?;
    dispatch(&state, request, &request_id, ErrorDialect::Anthropic).await
}

/// `POST /v1/embeddings`
pub async fn embeddings(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = UnifiedRequest::embeddings(&body).map_err(ApiError::openai)?;
    dispatch(&state, request, &request_id, ErrorDialect::OpenAi).await
}

/// `POST /v1/responses`
pub async fn create_response(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = UnifiedRequest::responses(&body).map_err(ApiError::openai)?;
    dispatch(&state, request, &request_id, ErrorDialect::OpenAi).await
}

/// `GET /v1/responses/{id}`
pub async fn get_response(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    replay(&state, Method::GET, Operation::Response(id.clone()), &id, &request_id).await
}

/// `DELETE /v1/responses/{id}`
pub async fn delete_response(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    replay(&state, Method::DELETE, Operation::Response(id.clone()), &id, &request_id).await
}

/// `GET /v1/responses/{id}/input_items`
pub async fn list_input_items(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    replay(&state, Method::GET, Operation::ResponseInputItems(id.clone()), &id, &request_id).await
}

/// Any method a route does not serve
pub async fn method_not_allowed() -> ApiError {
    ApiError::openai(GatewayError::MethodNotAllowed)
}

async fn dispatch(
    state: &AppState,
    request: UnifiedRequest,
    request_id: &str,
    dialect: ErrorDialect,
) -> Result<Response, ApiError> {
    let span = request_span!(request.operation(), request.model());
    async move {
        debug!(request_id, stream = request.is_stream(), "Processing request");
        proxy::forward(state, request).await
    }
    .instrument(span)
    .await
    .map_err(|error| ApiError { error, dialect })
}

async fn replay(
    state: &AppState,
    method: Method,
    operation: Operation,
    id: &str,
    request_id: &str,
) -> Result<Response, ApiError> {
    let span = request_span!(operation, id);
    let result: GatewayResult<Response> = async {
        debug!(request_id, %method, "Replaying response call");
        proxy::follow_up(state, method, operation, id).await
    }
    .instrument(span)
    .await;
    result.map_err(ApiError::openai)
}
