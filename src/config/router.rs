use serde::{Deserialize, Serialize};

use crate::failover::DEFAULT_MAX_CONTEXT_ENTRIES;

/// Failover router settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouterConfig {
    /// Number of conversation entries (not turns) kept for context.
    /// TOML: `router.max_context_entries`. Default: `20`.
    #[serde(default = "default_max_context_entries")]
    pub max_context_entries: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_context_entries: default_max_context_entries(),
        }
    }
}

fn default_max_context_entries() -> usize {
    DEFAULT_MAX_CONTEXT_ENTRIES
}
