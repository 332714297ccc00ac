//! HTTP server lifecycle.

use std::future::{Future, IntoFuture};
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{routes::create_router, shutdown::ShutdownHandle, state::AppState};

/// Server startup and runtime errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Listener could not bind
    #[error("Failed to bind {address}: {source}")]
    Bind {
        /// Requested address
        address: String,
        /// Underlying error
        source: std::io::Error,
    },
    /// Serving failed
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// The gateway HTTP server
#[derive(Debug, Clone)]
pub struct Server {
    state: AppState,
    shutdown: ShutdownHandle,
}

impl Server {
    /// Server over prepared state
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            shutdown: ShutdownHandle::new(),
        }
    }

    /// Handle that stops the server when triggered
    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Bind the configured address and serve until shutdown
    pub async fn run(self) -> Result<(), ServerError> {
        let address = self.state.config.server.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::Bind { address, source })?;
        self.serve(listener).await
    }

    /// Serve on an existing listener until a signal or the shutdown handle fires.
    ///
    /// In-flight requests get `shutdown_timeout` to finish.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        let grace = self.state.config.server.shutdown_timeout;
        let local = listener.local_addr()?;
        info!(address = %local, "Gateway listening");

        let handle = self.shutdown.clone();
        let signal_handle = self.shutdown.clone();
        let signal_task = tokio::spawn(async move {
            let name = crate::shutdown::shutdown_signal().await;
            signal_handle.trigger(name);
        });

        let router = create_router(self.state);
        let serving = axum::serve(listener, router)
            .with_graceful_shutdown(handle.triggered())
            .into_future();

        let result = run_with_grace(serving, handle.triggered(), grace).await;
        signal_task.abort();
        info!("Gateway stopped");
        result
    }
}

async fn run_with_grace<S, T>(serving: S, triggered: T, grace: Duration) -> Result<(), ServerError>
where
    S: Future<Output = std::io::Result<()>>,
    T: Future<Output = ()>,
{
    tokio::select! {
        result = serving => result.map_err(ServerError::from),
        () = async {
            triggered.await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(grace_secs = grace.as_secs(), "Grace period elapsed, dropping open connections");
            Ok(())
        }
    }
}
