//! Response id → provider correlation.

use crate::kv::{KvStore, StoreError, StoreResult};
use chrono::Utc;
use gateway_core::ProviderDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Retention window for registry entries
pub const RESPONSE_TTL: Duration = Duration::from_secs(86_400);

/// Stored value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRegistryEntry {
    /// Provider that produced the response, with the credential used
    pub provider: ProviderDescriptor,
    /// Creation time, milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Registry façade over a [`KvStore`]
#[derive(Clone)]
pub struct ResponseRegistry {
    store: Arc<dyn KvStore>,
    ttl: Duration,
}

impl fmt::Debug for ResponseRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseRegistry")
            .field("store", &self.store.name())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl ResponseRegistry {
    /// Registry with the default 24h retention
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            ttl: RESPONSE_TTL,
        }
    }

    /// Override retention
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Remember which provider produced `response_id`
    pub async fn record(&self, response_id: &str, provider: &ProviderDescriptor) -> StoreResult<()> {
        let entry = ResponseRegistryEntry {
            provider: provider.clone(),
            timestamp: Utc::now().timestamp_millis(),
        };
        let bytes = serde_json::to_vec(&entry).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.store.put(response_id, bytes, self.ttl).await?;
        debug!(response_id, provider = %provider.provider, "Recorded response id");
        Ok(())
    }

    /// Look up a response id
    pub async fn lookup(&self, response_id: &str) -> StoreResult<Option<ResponseRegistryEntry>> {
        let Some(bytes) = self.store.get(response_id).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Drop a response id
    pub async fn forget(&self, response_id: &str) -> StoreResult<()> {
        self.store.delete(response_id).await
    }
}
