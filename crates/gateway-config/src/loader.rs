//! Configuration loading.
//!
//! Settings come from an optional YAML, TOML or JSON file. The routing
//! documents come from environment variables, either inline
//! (`PROVIDER_CONFIG`, `MODEL_PROVIDER_CONFIG`) or as file paths
//! (`PROVIDER_CONFIG_FILE`, `MODEL_PROVIDER_CONFIG_FILE`).

use crate::error::ConfigError;
use crate::routing::RoutingTable;
use crate::settings::GatewayConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Inline provider table variable
pub const PROVIDER_CONFIG_ENV: &str = "PROVIDER_CONFIG";
/// Provider table file variable
pub const PROVIDER_CONFIG_FILE_ENV: &str = "PROVIDER_CONFIG_FILE";
/// Inline model table variable
pub const MODEL_CONFIG_ENV: &str = "MODEL_PROVIDER_CONFIG";
/// Model table file variable
pub const MODEL_CONFIG_FILE_ENV: &str = "MODEL_PROVIDER_CONFIG_FILE";

/// Settings file loader
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
}

impl ConfigLoader {
    /// Loader with no file (defaults only)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read settings from this file
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Load settings
    pub async fn load(&self) -> Result<GatewayConfig, ConfigError> {
        let Some(path) = &self.file else {
            debug!("No configuration file given, using defaults");
            return Ok(GatewayConfig::default());
        };

        let text = read_file(path).await?;
        let config = parse_settings(path, &text)?;
        info!(path = %path.display(), "Configuration file loaded");
        Ok(config)
    }
}

fn parse_settings(path: &Path, text: &str) -> Result<GatewayConfig, ConfigError> {
    let document = path.display().to_string();
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(text).map_err(|e| ConfigError::parse(document, e)),
        Some("toml") => toml::from_str(text).map_err(|e| ConfigError::parse(document, e)),
        Some("json") => serde_json::from_str(text).map_err(|e| ConfigError::parse(document, e)),
        other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string())),
    }
}

async fn read_file(path: &Path) -> Result<String, ConfigError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Where one routing document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// JSON text
    Inline(String),
    /// JSON file
    File(PathBuf),
    /// Not configured; treated as an empty object
    Missing,
}

impl DocumentSource {
    async fn read(&self) -> Result<String, ConfigError> {
        match self {
            Self::Inline(text) => Ok(text.clone()),
            Self::File(path) => read_file(path).await,
            Self::Missing => Ok(String::new()),
        }
    }

    fn from_lookup<F>(lookup: &F, inline: &str, file: &str) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(text) = lookup(inline).filter(|t| !t.trim().is_empty()) {
            Self::Inline(text)
        } else if let Some(path) = lookup(file).filter(|p| !p.is_empty()) {
            Self::File(PathBuf::from(path))
        } else {
            Self::Missing
        }
    }
}

/// Sources of the two routing documents.
///
/// Kept around after startup so the table can be rebuilt on reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingSource {
    /// Provider table
    pub providers: DocumentSource,
    /// Model table
    pub models: DocumentSource,
}

impl RoutingSource {
    /// Read sources from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read sources through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            providers: DocumentSource::from_lookup(&lookup, PROVIDER_CONFIG_ENV, PROVIDER_CONFIG_FILE_ENV),
            models: DocumentSource::from_lookup(&lookup, MODEL_CONFIG_ENV, MODEL_CONFIG_FILE_ENV),
        }
    }

    /// Inline documents
    pub fn inline(providers: impl Into<String>, models: impl Into<String>) -> Self {
        Self {
            providers: DocumentSource::Inline(providers.into()),
            models: DocumentSource::Inline(models.into()),
        }
    }

    /// Read and build the routing table
    pub async fn load(&self) -> Result<RoutingTable, ConfigError> {
        let providers = self.providers.read().await?;
        let models = self.models.read().await?;
        let table = RoutingTable::from_json(&providers, &models)?;
        info!(
            models = table.model_count(),
            providers = table.provider_count(),
            "Routing table loaded"
        );
        Ok(table)
    }
}
