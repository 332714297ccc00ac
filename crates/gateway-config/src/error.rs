//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A document could not be parsed
    #[error("Invalid {document}: {message}")]
    Parse {
        /// Which document failed (e.g. "PROVIDER_CONFIG")
        document: String,
        /// Parser message
        message: String,
    },

    /// File extension not recognised
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// A model's provider entry has no usable API key
    #[error("Model '{model}' provider '{provider}' has no api key")]
    MissingCredential {
        /// Logical model
        model: String,
        /// Provider name
        provider: String,
    },

    /// A model's provider entry has no base URL
    #[error("Model '{model}' provider '{provider}' has no base_url")]
    MissingBaseUrl {
        /// Logical model
        model: String,
        /// Provider name
        provider: String,
    },

    /// Semantic validation failure
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub(crate) fn parse(document: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Parse {
            document: document.into(),
            message: err.to_string(),
        }
    }
}
