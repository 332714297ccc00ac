//! Model name resolution.

use gateway_config::RoutingTable;
use gateway_core::{GatewayError, GatewayResult, ModelRoute};
use std::sync::Arc;
use tracing::debug;

/// Separator of the composite `model#provider` form
pub const COMPOSITE_SEPARATOR: char = '#';

/// Resolves logical model names against one routing-table snapshot
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    table: Arc<RoutingTable>,
}

impl ProviderRegistry {
    /// Registry over a snapshot
    #[must_use]
    pub fn new(table: Arc<RoutingTable>) -> Self {
        Self { table }
    }

    /// Underlying snapshot
    #[must_use]
    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// Resolve a model name to its candidate providers.
    ///
    /// A direct model key wins. Otherwise `"<model>#<provider>"` yields a
    /// single-provider route built from the named provider's base entry and
    /// the literal backend model. Segments after a second `#` are ignored.
    pub fn resolve(&self, model: &str) -> GatewayResult<ModelRoute> {
        if let Some(route) = self.table.route(model).filter(|r| !r.is_empty()) {
            debug!(model, providers = route.providers.len(), "Resolved direct model route");
            return Ok(route.clone());
        }

        let mut parts = model.split(COMPOSITE_SEPARATOR);
        if let (Some(backend_model), Some(provider)) = (parts.next(), parts.next()) {
            if !backend_model.is_empty() && !provider.is_empty() {
                if let Some(descriptor) = self.table.provider_descriptor(provider, backend_model) {
                    debug!(model, provider, backend_model, "Resolved composite model route");
                    return Ok(ModelRoute::new(model, vec![descriptor]));
                }
            }
        }

        Err(GatewayError::ModelNotFound(model.to_string()))
    }
}
