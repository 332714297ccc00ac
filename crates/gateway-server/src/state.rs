//! Shared application state.

use std::sync::Arc;

use gateway_config::{ConfigHandle, GatewayConfig, RoutingTable};
use gateway_core::GatewayResult;
use gateway_providers::ProviderClient;
use gateway_routing::{ProviderRegistry, ProviderSelector, RandomSource};
use gateway_store::{KvStore, MemoryKvStore, ResponseRegistry};

use crate::auth::ServiceKey;

/// State handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    /// Current routing table
    pub routing: ConfigHandle,
    /// Provider and credential draw
    pub selector: ProviderSelector,
    /// Outbound HTTP client
    pub client: ProviderClient,
    /// Response id to provider mapping
    pub responses: ResponseRegistry,
    /// Server settings
    pub config: Arc<GatewayConfig>,
    /// Front-door key; `None` disables authentication
    pub service_key: Option<ServiceKey>,
}

impl AppState {
    /// Start building state
    #[must_use]
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::default()
    }

    /// Registry over the current routing snapshot
    #[must_use]
    pub fn registry(&self) -> ProviderRegistry {
        ProviderRegistry::new(self.routing.snapshot())
    }
}

/// Builder for [`AppState`]
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<GatewayConfig>,
    routing: Option<ConfigHandle>,
    random: Option<Arc<dyn RandomSource>>,
    store: Option<Arc<dyn KvStore>>,
    client: Option<ProviderClient>,
    service_key: Option<String>,
}

impl AppStateBuilder {
    /// Server settings
    #[must_use]
    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Routing handle shared with the reload task
    #[must_use]
    pub fn routing(mut self, routing: ConfigHandle) -> Self {
        self.routing = Some(routing);
        self
    }

    /// Fixed routing table
    #[must_use]
    pub fn routing_table(self, table: RoutingTable) -> Self {
        self.routing(ConfigHandle::new(table))
    }

    /// Random source for provider selection
    #[must_use]
    pub fn random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = Some(random);
        self
    }

    /// Backing store for the response registry
    #[must_use]
    pub fn store(mut self, store: Arc<dyn KvStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Outbound client
    #[must_use]
    pub fn client(mut self, client: ProviderClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Service key; empty values leave authentication off
    #[must_use]
    pub fn service_key(mut self, key: Option<String>) -> Self {
        self.service_key = key.filter(|k| !k.is_empty());
        self
    }

    /// Build the state
    pub fn build(self) -> GatewayResult<AppState> {
        let config = self.config.unwrap_or_default();
        let client = match self.client {
            Some(client) => client,
            None => ProviderClient::new(config.server.request_timeout)?,
        };
        let selector = self.random.map_or_else(ProviderSelector::default, ProviderSelector::new);
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryKvStore::new()) as Arc<dyn KvStore>);

        Ok(AppState {
            routing: self.routing.unwrap_or_default(),
            selector,
            client,
            responses: ResponseRegistry::new(store),
            config: Arc::new(config),
            service_key: self.service_key.as_deref().map(ServiceKey::new),
        })
    }
}
