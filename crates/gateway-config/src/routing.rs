//! Provider and model tables.
//!
//! Two JSON documents drive routing:
//!
//! ```json
//! // PROVIDER_CONFIG
//! {"deepseek": {"base_url": "https://api.deepseek.com/v1", "api_keys": ["sk-1", "sk-2"]}}
//!
//! // MODEL_PROVIDER_CONFIG
//! {"gpt-4o": {"providers": [
//!     {"provider": "azure", "base_url": "https://r.openai.azure.com", "api_key": "k", "model": "gpt-4o"}
//! ]}}
//! ```
//!
//! Both are parsed into a [`RoutingTable`], which is immutable once built.

use crate::error::ConfigError;
use gateway_core::{ModelRoute, ProviderDescriptor, ProviderKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Named provider base configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEntry {
    /// Base URL
    pub base_url: String,
    /// Credential pool
    #[serde(default)]
    pub api_keys: Vec<String>,
    /// Single credential, used when `api_keys` is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Explicit dialect; derived from the provider name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProviderKind>,
}

impl ProviderEntry {
    /// Every configured key, pool first
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        collect_keys(Some(&self.api_keys), self.api_key.as_ref())
    }
}

/// One provider line of a model entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelProviderEntry {
    /// Provider name
    pub provider: String,
    /// Base URL; falls back to the named provider's
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Single credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Credential pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_keys: Option<Vec<String>>,
    /// Backend model name
    pub model: String,
    /// Explicit dialect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProviderKind>,
}

/// Model table value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Candidate providers, in configuration order
    #[serde(default)]
    pub providers: Vec<ModelProviderEntry>,
}

/// `PROVIDER_CONFIG` document
pub type ProviderTable = BTreeMap<String, ProviderEntry>;

/// `MODEL_PROVIDER_CONFIG` document
pub type ModelTable = BTreeMap<String, ModelEntry>;

fn collect_keys(pool: Option<&Vec<String>>, single: Option<&String>) -> Vec<String> {
    let pool: Vec<String> = pool
        .into_iter()
        .flatten()
        .filter(|k| !k.is_empty())
        .cloned()
        .collect();
    if !pool.is_empty() {
        return pool;
    }
    single.filter(|k| !k.is_empty()).cloned().into_iter().collect()
}

fn resolve_kind(explicit: Option<ProviderKind>, provider: &str) -> ProviderKind {
    explicit.unwrap_or_else(|| ProviderKind::from_provider_name(provider))
}

/// Resolved routing configuration.
///
/// Model entries are expanded into [`ModelRoute`]s at build time; named
/// providers are kept as-is for composite `model#provider` lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTable {
    providers: ProviderTable,
    models: BTreeMap<String, ModelRoute>,
}

impl RoutingTable {
    /// Parse both documents and build the table
    pub fn from_json(providers_json: &str, models_json: &str) -> Result<Self, ConfigError> {
        let providers = parse_document::<ProviderTable>("PROVIDER_CONFIG", providers_json)?;
        let models = parse_document::<ModelTable>("MODEL_PROVIDER_CONFIG", models_json)?;
        Self::build(providers, models)
    }

    /// Build from parsed documents
    pub fn build(providers: ProviderTable, models: ModelTable) -> Result<Self, ConfigError> {
        if models.is_empty() {
            warn!("Model table is empty; only composite model#provider names will resolve");
        }

        let mut routes = BTreeMap::new();
        for (name, entry) in models {
            let descriptors = entry
                .providers
                .iter()
                .map(|line| expand_line(&name, line, providers.get(&line.provider)))
                .collect::<Result<Vec<_>, _>>()?;
            routes.insert(name.clone(), ModelRoute::new(name, descriptors));
        }

        Ok(Self {
            providers,
            models: routes,
        })
    }

    /// Direct model lookup
    #[must_use]
    pub fn route(&self, model: &str) -> Option<&ModelRoute> {
        self.models.get(model)
    }

    /// Named provider lookup
    #[must_use]
    pub fn provider(&self, name: &str) -> Option<&ProviderEntry> {
        self.providers.get(name)
    }

    /// Logical model names, sorted
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Number of configured models
    #[must_use]
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Number of named providers
    #[must_use]
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Descriptor for a named provider serving `backend_model`.
    ///
    /// Builds a fresh value; the provider entry itself is never touched.
    /// Returns `None` when the provider is unknown or has no key.
    #[must_use]
    pub fn provider_descriptor(&self, name: &str, backend_model: &str) -> Option<ProviderDescriptor> {
        let entry = self.providers.get(name)?;
        let keys = entry.keys();
        let first = keys.first()?.clone();
        Some(
            ProviderDescriptor::new(
                name,
                resolve_kind(entry.kind, name),
                entry.base_url.clone(),
                backend_model,
                first,
            )
            .with_api_keys(keys),
        )
    }
}

fn expand_line(
    model: &str,
    line: &ModelProviderEntry,
    named: Option<&ProviderEntry>,
) -> Result<ProviderDescriptor, ConfigError> {
    let mut keys = collect_keys(line.api_keys.as_ref(), line.api_key.as_ref());
    if keys.is_empty() {
        keys = named.map(ProviderEntry::keys).unwrap_or_default();
    }
    let first = keys.first().cloned().ok_or_else(|| ConfigError::MissingCredential {
        model: model.to_string(),
        provider: line.provider.clone(),
    })?;

    let base_url = line
        .base_url
        .clone()
        .filter(|u| !u.is_empty())
        .or_else(|| named.map(|p| p.base_url.clone()).filter(|u| !u.is_empty()))
        .ok_or_else(|| ConfigError::MissingBaseUrl {
            model: model.to_string(),
            provider: line.provider.clone(),
        })?;

    let kind = resolve_kind(line.kind.or_else(|| named.and_then(|p| p.kind)), &line.provider);

    Ok(ProviderDescriptor::new(&line.provider, kind, base_url, &line.model, first).with_api_keys(keys))
}

fn parse_document<T>(document: &str, text: &str) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(text).map_err(|e| ConfigError::parse(document, e))
}
