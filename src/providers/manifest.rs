//! Provider manifest: the persisted, credential-free description of the rotation.

use serde::{Deserialize, Serialize};
use std::{io::ErrorKind, path::Path};
use tracing::{info, warn};
use url::Url;

use super::ProviderKind;
use crate::error::HearthError;

/// One provider as written to disk. Credentials are never part of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderManifestEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProviderKind>,
    pub base_url: Url,
    pub model: String,
    #[serde(default = "crate::config::default_daily_limit")]
    pub daily_limit: u32,
}

impl ProviderManifestEntry {
    pub fn resolved_kind(&self) -> Option<ProviderKind> {
        self.kind.or_else(|| ProviderKind::from_name(&self.name))
    }
}

pub fn save_manifest(
    path: impl AsRef<Path>,
    entries: &[ProviderManifestEntry],
) -> Result<(), HearthError> {
    let path = path.as_ref();
    let raw = serde_json::to_string_pretty(entries)?;
    std::fs::write(path, raw)?;
    info!(path = %path.display(), providers = entries.len(), "Provider manifest saved");
    Ok(())
}

/// Reads a manifest. A missing file yields `Ok(None)` with a warning.
pub fn load_manifest(
    path: impl AsRef<Path>,
) -> Result<Option<Vec<ProviderManifestEntry>>, HearthError> {
    let path = path.as_ref();
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "Provider manifest not found");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let entries: Vec<ProviderManifestEntry> = serde_json::from_str(&raw)?;
    Ok(Some(entries))
}
