//! # Gateway Server
//!
//! HTTP front end of the Apex gateway:
//! - OpenAI- and Anthropic-style endpoints on an axum router
//! - Service-key authentication and permissive CORS
//! - Error rendering in the caller's protocol dialect
//! - Graceful shutdown

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod cors;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod proxy;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod state;

pub use auth::{auth_middleware, ServiceKey};
pub use error::{ApiError, ErrorDialect};
pub use routes::create_router;
pub use server::{Server, ServerError};
pub use shutdown::{shutdown_signal, ShutdownHandle};
pub use state::{AppState, AppStateBuilder};
