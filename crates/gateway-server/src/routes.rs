//! Route definitions for the gateway API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{auth, cors, handlers, state::AppState};

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(cors::cors_middleware))
        .with_state(state)
}

/// Authenticated `/v1` routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/chat/completions", post(handlers::chat_completions).fallback(handlers::method_not_allowed))
        .route("/messages", post(handlers::messages).fallback(handlers::method_not_allowed))
        .route("/embeddings", post(handlers::embeddings).fallback(handlers::method_not_allowed))
        .route("/models", get(handlers::list_models))
        .route("/models/:model_id", get(handlers::get_model))
        .route(
            "/responses",
            post(handlers::create_response).fallback(handlers::method_not_allowed),
        )
        .route(
            "/responses/:id",
            get(handlers::get_response)
                .delete(handlers::delete_response)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/responses/:id/input_items",
            get(handlers::list_input_items).fallback(handlers::method_not_allowed),
        )
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
