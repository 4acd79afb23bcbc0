mod basic;
mod providers;
mod router;

pub use basic::BasicConfig;
pub(crate) use providers::default_daily_limit;
pub use providers::{ProviderDefaults, ProviderEntryConfig, ProvidersConfig};
pub use router::RouterConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Failover router settings (see `router` table in config.toml).
    #[serde(default)]
    pub router: RouterConfig,

    /// Provider list and upstream settings (see `providers` table in config.toml).
    #[serde(default)]
    pub providers: ProvidersConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "HEARTH_";

impl Config {
    /// Builds a Figment that merges defaults, `config.toml` (if present) and `HEARTH_*` env vars.
    ///
    /// Nested keys use `__`, e.g. `HEARTH_PROVIDERS__API_KEYS__OPENAI=sk-...`.
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        };
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration from defaults, the optional TOML file and the environment.
    pub fn load() -> Result<Self, figment::Error> {
        Self::from_figment(&Self::figment())
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, figment::Error> {
        figment.extract()
    }
}
