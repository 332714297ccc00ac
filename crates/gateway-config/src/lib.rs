//! # Gateway Config
//!
//! Settings file loading, the provider and model routing tables, and the
//! swappable snapshot handle the server reads them through.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod handle;
pub mod loader;
pub mod routing;
pub mod settings;

pub use error::ConfigError;
pub use handle::ConfigHandle;
pub use loader::{ConfigLoader, DocumentSource, RoutingSource};
pub use routing::{ModelEntry, ModelProviderEntry, ProviderEntry, RoutingTable};
pub use settings::{GatewayConfig, LogFormat, LoggingSettings, ModelListSettings, ServerConfig};
