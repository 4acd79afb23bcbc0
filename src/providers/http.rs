use reqwest::header::{CONNECTION, HeaderMap, HeaderValue};
use std::time::Duration;

use crate::config::ProviderDefaults;
use crate::error::HearthError;

pub(crate) const HEARTH_USER_AGENT: &str = concat!("hearth/", env!("CARGO_PKG_VERSION"));

/// Shared outbound client for every vendor adapter.
pub fn build_http_client(defaults: &ProviderDefaults) -> Result<reqwest::Client, HearthError> {
    let mut headers = HeaderMap::new();

    let mut builder = reqwest::Client::builder()
        .user_agent(HEARTH_USER_AGENT)
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(defaults.connect_timeout_secs))
        .timeout(Duration::from_secs(defaults.request_timeout_secs));

    if let Some(proxy_url) = defaults.proxy.as_ref() {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }

    if defaults.enable_multiplexing {
        builder = builder.http2_adaptive_window(true);
    } else {
        headers.insert(CONNECTION, HeaderValue::from_static("close"));

        builder = builder
            .http1_only()
            .pool_max_idle_per_host(0)
            .pool_idle_timeout(Duration::from_secs(0));
    }

    Ok(builder.default_headers(headers).build()?)
}
