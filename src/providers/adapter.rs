use async_trait::async_trait;
use hearth_schema::ChatMessage;
use std::{fmt, sync::Arc};
use url::Url;

use super::{ChatCompletionsAdapter, ClaudeAdapter, ProviderKind};
use crate::error::ProviderError;

/// Answer from one vendor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub tokens_used: u64,
}

/// One vendor endpoint. Each implementation owns its credential and request shape.
#[async_trait]
pub trait ChatAdapter: fmt::Debug + Send + Sync {
    /// Sends `message` after `context` and returns the assistant reply.
    ///
    /// Implementations make exactly one HTTP attempt; failover happens one level up.
    async fn send_message(
        &self,
        message: &str,
        context: &[ChatMessage],
    ) -> Result<Completion, ProviderError>;
}

/// Endpoint, model and secret for one provider.
#[derive(Clone)]
pub struct VendorCredentials {
    pub base_url: Url,
    pub model: String,
    pub api_key: String,
}

impl fmt::Debug for VendorCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VendorCredentials")
            .field("base_url", &self.base_url.as_str())
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl VendorCredentials {
    /// Appends `path` to the base URL, keeping any existing prefix such as `/v1`.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(path.split('/'));
        Ok(url)
    }
}

/// Builds the adapter for `kind`.
pub fn build_adapter(
    kind: ProviderKind,
    client: reqwest::Client,
    credentials: VendorCredentials,
) -> Result<Arc<dyn ChatAdapter>, url::ParseError> {
    let adapter: Arc<dyn ChatAdapter> = match kind {
        ProviderKind::OpenAi | ProviderKind::DeepSeek => {
            Arc::new(ChatCompletionsAdapter::new(kind, client, credentials)?)
        }
        ProviderKind::Claude => Arc::new(ClaudeAdapter::new(client, credentials)?),
    };
    Ok(adapter)
}
