use serde::{Deserialize, Serialize};
use url::Url;

use crate::providers::ProviderKind;

/// One provider in `[[providers.list]]`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderEntryConfig {
    /// Display name; also the lookup key into `providers.api_keys` (case-insensitive).
    pub name: String,

    /// Vendor adapter. Inferred from `name` when unset ("openai", "claude", "deepseek").
    #[serde(default)]
    pub kind: Option<ProviderKind>,

    /// API base URL. Falls back to the vendor default.
    #[serde(default)]
    pub base_url: Option<Url>,

    /// Model identifier. Falls back to the vendor default.
    #[serde(default)]
    pub model: Option<String>,

    /// Messages allowed per calendar day. Default: `1000`.
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,

    /// Inline credential. Prefer `providers.api_keys` or the environment.
    #[serde(default)]
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl ProviderEntryConfig {
    pub fn resolved_kind(&self) -> Option<ProviderKind> {
        self.kind.or_else(|| ProviderKind::from_name(&self.name))
    }
}

pub(crate) fn default_daily_limit() -> u32 {
    1000
}
