mod entry;

pub(crate) use entry::default_daily_limit;
pub use entry::ProviderEntryConfig;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::PathBuf};
use url::Url;

/// Global provider defaults shared by every vendor adapter.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderDefaults {
    /// Optional upstream HTTP proxy. If set, used for the reqwest client.
    /// TOML: `providers.defaults.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Allow HTTP/2 multiplexing for the reqwest client; disabled forces HTTP/1.
    /// TOML: `providers.defaults.enable_multiplexing`. Default: `false`.
    #[serde(default)]
    pub enable_multiplexing: bool,

    /// Whole-request timeout for one vendor call, in seconds.
    /// TOML: `providers.defaults.request_timeout_secs`. Default: `30`.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// TCP connect timeout, in seconds.
    /// TOML: `providers.defaults.connect_timeout_secs`. Default: `10`.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ProviderDefaults {
    fn default() -> Self {
        Self {
            proxy: None,
            enable_multiplexing: false,
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// All provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub defaults: ProviderDefaults,

    /// Providers in rotation order.
    /// TOML: `[[providers.list]]`.
    #[serde(default)]
    pub list: Vec<ProviderEntryConfig>,

    /// Optional JSON manifest (name, kind, base_url, model, daily_limit) appended after `list`.
    /// TOML: `providers.manifest_path`.
    #[serde(default)]
    pub manifest_path: Option<PathBuf>,

    /// Credentials keyed by lowercase provider name.
    /// TOML: `[providers.api_keys]`. Env: `HEARTH_PROVIDERS__API_KEYS__<NAME>`.
    #[serde(default)]
    pub api_keys: BTreeMap<String, String>,
}

impl ProvidersConfig {
    /// Credential lookup table with lowercase keys.
    pub fn key_table(&self) -> AHashMap<String, String> {
        self.api_keys
            .iter()
            .filter(|(_, key)| !key.trim().is_empty())
            .map(|(name, key)| (name.to_lowercase(), key.clone()))
            .collect()
    }

    /// Resolves the credential for a provider: the inline key wins over `api_keys`.
    pub fn api_key_for(&self, name: &str, inline: Option<&str>) -> Option<String> {
        inline
            .filter(|key| !key.trim().is_empty())
            .map(ToString::to_string)
            .or_else(|| self.key_table().remove(&name.to_lowercase()))
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}
