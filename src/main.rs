//! # Apex Gateway
//!
//! Protocol-translating API gateway: clients speak OpenAI Chat Completions or
//! Anthropic Messages, requests are served by any configured provider.
//!
//! ## Usage
//!
//! ```bash
//! # Routing tables from the environment
//! PROVIDER_CONFIG='{"deepseek":{"base_url":"https://api.deepseek.com/v1","api_keys":["sk-..."]}}' \
//! MODEL_PROVIDER_CONFIG='{"ds":{"providers":[{"provider":"deepseek","model":"deepseek-chat"}]}}' \
//! apex-gateway
//!
//! # Settings file plus overrides
//! apex-gateway --config gateway.yaml --port 9000
//! ```

use anyhow::Context;
use clap::Parser;
use gateway_config::{ConfigHandle, ConfigLoader, GatewayConfig, LogFormat, RoutingSource};
use gateway_server::{AppState, Server};
use gateway_telemetry::{init_logging, LoggingConfig};
use std::path::PathBuf;
use tracing::{error, info};

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "apex-gateway", version, about = "OpenAI / Anthropic protocol-translating gateway")]
struct Args {
    /// Settings file (YAML, TOML or JSON)
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long, env = "GATEWAY_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "GATEWAY_PORT")]
    port: Option<u16>,

    /// Default log level
    #[arg(long, env = "GATEWAY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: pretty or json
    #[arg(long, env = "GATEWAY_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Key clients must present; authentication is off when unset
    #[arg(long, env = "SERVICE_API_KEY", hide_env_values = true)]
    service_api_key: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut GatewayConfig) {
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}

/// Application entry point
#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!(error = %e, "Application failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Main application logic
async fn run(args: Args) -> anyhow::Result<()> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_file(path);
    }
    let mut config = loader.load().await.context("Failed to load settings")?;
    args.apply(&mut config);

    let logging = LoggingConfig::new()
        .with_level(config.logging.level.clone())
        .with_json(config.logging.format == LogFormat::Json);
    if let Err(e) = init_logging(&logging) {
        eprintln!("Failed to initialize logging: {e}");
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Apex gateway");

    let source = RoutingSource::from_env();
    let table = source.load().await.context("Failed to load routing tables")?;
    let routing = ConfigHandle::new(table);

    info!(
        host = %config.server.host,
        port = config.server.port,
        models = routing.snapshot().model_count(),
        auth = args.service_api_key.is_some(),
        "Configuration loaded"
    );

    spawn_reload_listener(routing.clone(), source);

    let state = AppState::builder()
        .config(config)
        .routing(routing)
        .service_key(args.service_api_key)
        .build()
        .context("Failed to build application state")?;

    Server::new(state).run().await?;
    Ok(())
}

/// Rebuild the routing table on SIGHUP
#[cfg(unix)]
fn spawn_reload_listener(routing: ConfigHandle, source: RoutingSource) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(hangup) => hangup,
        Err(e) => {
            error!(error = %e, "Failed to install SIGHUP handler, reload disabled");
            return;
        }
    };

    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            info!("Received SIGHUP, reloading routing tables");
            if let Err(e) = routing.reload(&source).await {
                error!(error = %e, "Reload failed, keeping current routing table");
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_reload_listener(_routing: ConfigHandle, _source: RoutingSource) {}
