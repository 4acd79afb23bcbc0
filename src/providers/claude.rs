use async_trait::async_trait;
use hearth_schema::{AnthropicMessagesRequest, AnthropicMessagesResponse, ChatMessage};
use std::fmt;
use url::Url;

use super::{ChatAdapter, Completion, VendorCredentials, classify_upstream_error};
use crate::error::ProviderError;

const MAX_TOKENS: u32 = 2000;
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Adapter for the Anthropic messages API.
pub struct ClaudeAdapter {
    client: reqwest::Client,
    url: Url,
    credentials: VendorCredentials,
}

impl fmt::Debug for ClaudeAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaudeAdapter")
            .field("url", &self.url.as_str())
            .field("model", &self.credentials.model)
            .finish_non_exhaustive()
    }
}

impl ClaudeAdapter {
    pub fn new(
        client: reqwest::Client,
        credentials: VendorCredentials,
    ) -> Result<Self, url::ParseError> {
        let url = credentials.endpoint("messages")?;
        Ok(Self {
            client,
            url,
            credentials,
        })
    }

    /// Only user/assistant entries are forwarded; the messages API rejects other roles inline.
    pub fn build_body(&self, message: &str, context: &[ChatMessage]) -> AnthropicMessagesRequest {
        let mut messages: Vec<ChatMessage> = context
            .iter()
            .filter(|entry| entry.is_dialogue())
            .cloned()
            .collect();
        messages.push(ChatMessage::user(message));

        AnthropicMessagesRequest {
            model: self.credentials.model.clone(),
            max_tokens: MAX_TOKENS,
            messages,
        }
    }

    pub fn build_request(
        &self,
        message: &str,
        context: &[ChatMessage],
    ) -> Result<reqwest::Request, reqwest::Error> {
        self.client
            .post(self.url.clone())
            .header("x-api-key", self.credentials.api_key.as_str())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.build_body(message, context))
            .build()
    }
}

#[async_trait]
impl ChatAdapter for ClaudeAdapter {
    async fn send_message(
        &self,
        message: &str,
        context: &[ChatMessage],
    ) -> Result<Completion, ProviderError> {
        let req = self.build_request(message, context)?;
        let resp = self.client.execute(req).await?;

        if !resp.status().is_success() {
            return Err(classify_upstream_error(resp).await);
        }

        let parsed: AnthropicMessagesResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        let text = parsed.first_text().ok_or_else(|| {
            ProviderError::MalformedResponse("response carried no text block".to_string())
        })?;

        Ok(Completion {
            text: text.to_string(),
            tokens_used: parsed.total_tokens(),
        })
    }
}
