//! Provider descriptors and model routes.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Wire dialect and auth scheme spoken by a backend provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Any OpenAI-compatible endpoint (bearer token auth)
    #[default]
    OpenAiCompatible,
    /// Azure OpenAI (deployment-scoped paths, `api-key` header)
    Azure,
    /// Anthropic native API (`x-api-key` header)
    Anthropic,
}

impl ProviderKind {
    /// Derive the kind from a configured provider name.
    #[must_use]
    pub fn from_provider_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "azure" => Self::Azure,
            "anthropic" => Self::Anthropic,
            _ => Self::OpenAiCompatible,
        }
    }

    /// Stable lowercase label for logs
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAiCompatible => "openai_compatible",
            Self::Azure => "azure",
            Self::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider API key.
///
/// Redacted in `Debug` output. Serializes to its plain value because the
/// response registry must be able to replay the call later.
#[derive(Clone)]
pub struct Credential(SecretString);

impl Credential {
    /// Wrap a raw key
    pub fn new(key: impl Into<String>) -> Self {
        Self(SecretString::new(key.into()))
    }

    /// Expose the raw key for header construction
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for Credential {}

impl Serialize for Credential {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// One backend entry able to serve a logical model.
///
/// `api_key` is the credential used for the outbound call; `api_keys` is the
/// full pool it was (or will be) drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Provider name from configuration (e.g. "deepseek", "azure")
    pub provider: String,
    /// Dialect tag
    pub kind: ProviderKind,
    /// Base URL without trailing slash
    pub base_url: String,
    /// Model identifier the provider expects
    pub model: String,
    /// Active credential
    pub api_key: Credential,
    /// Every registered credential
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub api_keys: Vec<Credential>,
}

impl ProviderDescriptor {
    /// Create a descriptor with a single credential
    pub fn new(
        provider: impl Into<String>,
        kind: ProviderKind,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let api_key = Credential::new(api_key);
        Self {
            provider: provider.into(),
            kind,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_keys: vec![api_key.clone()],
            api_key,
        }
    }

    /// Replace the credential pool; the first key becomes the active one
    #[must_use]
    pub fn with_api_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let keys: Vec<Credential> = keys.into_iter().map(Credential::new).collect();
        if let Some(first) = keys.first() {
            self.api_key = first.clone();
        }
        self.api_keys = keys;
        self
    }
}

/// Ordered set of providers serving one logical model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRoute {
    /// Logical model name as requested by the client
    pub model: String,
    /// Candidate providers
    pub providers: Vec<ProviderDescriptor>,
}

impl ModelRoute {
    /// Create a route
    pub fn new(model: impl Into<String>, providers: Vec<ProviderDescriptor>) -> Self {
        Self {
            model: model.into(),
            providers,
        }
    }

    /// Whether the route has no provider
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
