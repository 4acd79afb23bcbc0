use super::{ProviderKind, VendorCredentials, build_adapter, build_http_client, load_manifest};
use crate::config::{Config, ProvidersConfig};
use crate::error::HearthError;
use crate::failover::{FailoverRouter, ProviderSpec};
use tracing::{info, warn};
use url::Url;

struct ResolvedEntry<'a> {
    name: &'a str,
    kind: ProviderKind,
    base_url: Option<&'a Url>,
    model: Option<&'a str>,
    daily_limit: u32,
    api_key: String,
}

fn to_spec(client: &reqwest::Client, entry: ResolvedEntry<'_>) -> Result<ProviderSpec, HearthError> {
    let base_url = entry
        .base_url
        .cloned()
        .unwrap_or_else(|| entry.kind.default_base_url());
    let model = entry
        .model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(entry.kind.default_model())
        .to_string();

    let adapter = build_adapter(
        entry.kind,
        client.clone(),
        VendorCredentials {
            base_url: base_url.clone(),
            model: model.clone(),
            api_key: entry.api_key,
        },
    )?;

    Ok(ProviderSpec {
        name: entry.name.to_string(),
        kind: entry.kind,
        base_url,
        model,
        daily_limit: entry.daily_limit,
        adapter,
    })
}

/// Builds provider specs in rotation order: `providers.list` first, then the manifest.
///
/// Entries without a credential or with an unknown vendor are skipped with a warning.
pub fn provider_specs_from_config(
    cfg: &ProvidersConfig,
    client: &reqwest::Client,
) -> Result<Vec<ProviderSpec>, HearthError> {
    let mut specs = Vec::with_capacity(cfg.list.len());

    for entry in &cfg.list {
        let Some(kind) = entry.resolved_kind() else {
            warn!(provider = %entry.name, "Unknown provider kind, skipping");
            continue;
        };
        let Some(api_key) = cfg.api_key_for(&entry.name, entry.api_key.as_deref()) else {
            warn!(provider = %entry.name, "No API key configured, skipping");
            continue;
        };

        specs.push(to_spec(
            client,
            ResolvedEntry {
                name: &entry.name,
                kind,
                base_url: entry.base_url.as_ref(),
                model: entry.model.as_deref(),
                daily_limit: entry.daily_limit,
                api_key,
            },
        )?);
    }

    let Some(path) = cfg.manifest_path.as_ref() else {
        return Ok(specs);
    };
    let Some(manifest) = load_manifest(path)? else {
        return Ok(specs);
    };

    let keys = cfg.key_table();
    for entry in &manifest {
        let Some(kind) = entry.resolved_kind() else {
            warn!(provider = %entry.name, "Unknown provider kind in manifest, skipping");
            continue;
        };
        let Some(api_key) = keys.get(&entry.name.to_lowercase()).cloned() else {
            warn!(provider = %entry.name, "No API key for manifest provider, skipping");
            continue;
        };

        specs.push(to_spec(
            client,
            ResolvedEntry {
                name: &entry.name,
                kind,
                base_url: Some(&entry.base_url),
                model: Some(&entry.model),
                daily_limit: entry.daily_limit,
                api_key,
            },
        )?);
    }

    info!(
        path = %path.display(),
        manifest_entries = manifest.len(),
        "Provider manifest loaded"
    );
    Ok(specs)
}

/// Resolves providers from config and spawns the failover router.
pub async fn spawn_router(cfg: &Config) -> Result<FailoverRouter, HearthError> {
    let defaults = &cfg.providers.defaults;

    // Log resolved provider settings here so `main` stays wiring-only.
    info!(
        providers_defaults_proxy = %defaults.proxy.as_ref().map_or("<none>", |u| u.as_str()),
        providers_defaults_enable_multiplexing = defaults.enable_multiplexing,
        providers_defaults_request_timeout_secs = defaults.request_timeout_secs,
        providers_defaults_connect_timeout_secs = defaults.connect_timeout_secs,
        providers_manifest_path = ?cfg.providers.manifest_path,
        "Provider defaults loaded"
    );

    let client = build_http_client(defaults)?;
    let specs = provider_specs_from_config(&cfg.providers, &client)?;
    if specs.is_empty() {
        warn!("No AI providers configured; chat requests will fail until one is added");
    }

    FailoverRouter::spawn(specs, cfg.router.max_context_entries).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProviderDefaults, ProviderEntryConfig};
    use crate::providers::{ProviderManifestEntry, save_manifest};

    fn entry(name: &str, api_key: Option<&str>) -> ProviderEntryConfig {
        ProviderEntryConfig {
            name: name.to_string(),
            kind: None,
            base_url: None,
            model: None,
            daily_limit: 1000,
            api_key: api_key.map(ToString::to_string),
        }
    }

    fn client() -> reqwest::Client {
        build_http_client(&ProviderDefaults::default()).expect("client")
    }

    #[test]
    fn skips_entries_without_keys_and_fills_vendor_defaults() {
        let cfg = ProvidersConfig {
            list: vec![
                entry("OpenAI", Some("sk-openai")),
                entry("Claude", None),
                entry("DeepSeek", None),
                entry("Mystery", Some("k")),
            ],
            api_keys: [("deepseek".to_string(), "sk-ds".to_string())].into(),
            ..ProvidersConfig::default()
        };

        let specs = provider_specs_from_config(&cfg, &client()).expect("specs");
        let names: Vec<_> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["OpenAI", "DeepSeek"]);
        assert_eq!(specs[0].model, "gpt-4");
        assert_eq!(specs[1].base_url.as_str(), "https://api.deepseek.com/v1");
    }

    #[test]
    fn manifest_entries_follow_the_list_and_need_a_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("providers.json");
        save_manifest(
            &path,
            &[
                ProviderManifestEntry {
                    name: "Claude".to_string(),
                    kind: Some(ProviderKind::Claude),
                    base_url: Url::parse("https://api.anthropic.com/v1").expect("url"),
                    model: "claude-3-haiku-20240307".to_string(),
                    daily_limit: 50,
                },
                ProviderManifestEntry {
                    name: "DeepSeek".to_string(),
                    kind: None,
                    base_url: Url::parse("https://api.deepseek.com/v1").expect("url"),
                    model: "deepseek-chat".to_string(),
                    daily_limit: 50,
                },
            ],
        )
        .expect("save manifest");

        let cfg = ProvidersConfig {
            list: vec![entry("OpenAI", Some("sk-openai"))],
            manifest_path: Some(path),
            api_keys: [("CLAUDE".to_string(), "sk-ant".to_string())].into(),
            ..ProvidersConfig::default()
        };

        let specs = provider_specs_from_config(&cfg, &client()).expect("specs");
        let names: Vec<_> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["OpenAI", "Claude"]);
        assert_eq!(specs[1].model, "claude-3-haiku-20240307");
        assert_eq!(specs[1].daily_limit, 50);
    }
}
