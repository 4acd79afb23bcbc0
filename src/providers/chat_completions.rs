use async_trait::async_trait;
use hearth_schema::{ChatCompletionsRequest, ChatCompletionsResponse, ChatMessage};
use std::fmt;
use url::Url;

use super::{ChatAdapter, Completion, ProviderKind, VendorCredentials, classify_upstream_error};
use crate::error::ProviderError;
use crate::utils::logging::with_pretty_json_debug;

const MAX_TOKENS: u32 = 2000;
const TEMPERATURE: f32 = 0.7;

/// Adapter for vendors speaking the chat-completions format (OpenAI, DeepSeek).
pub struct ChatCompletionsAdapter {
    kind: ProviderKind,
    client: reqwest::Client,
    url: Url,
    credentials: VendorCredentials,
}

impl fmt::Debug for ChatCompletionsAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCompletionsAdapter")
            .field("kind", &self.kind)
            .field("url", &self.url.as_str())
            .field("model", &self.credentials.model)
            .finish_non_exhaustive()
    }
}

impl ChatCompletionsAdapter {
    pub fn new(
        kind: ProviderKind,
        client: reqwest::Client,
        credentials: VendorCredentials,
    ) -> Result<Self, url::ParseError> {
        let url = credentials.endpoint("chat/completions")?;
        Ok(Self {
            kind,
            client,
            url,
            credentials,
        })
    }

    /// Context entries first, then the new user message.
    pub fn build_body(&self, message: &str, context: &[ChatMessage]) -> ChatCompletionsRequest {
        let mut messages = Vec::with_capacity(context.len() + 1);
        messages.extend_from_slice(context);
        messages.push(ChatMessage::user(message));

        ChatCompletionsRequest {
            model: self.credentials.model.clone(),
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }

    pub fn build_request(
        &self,
        message: &str,
        context: &[ChatMessage],
    ) -> Result<reqwest::Request, reqwest::Error> {
        let body = self.build_body(message, context);
        with_pretty_json_debug(&body, |pretty| {
            tracing::debug!(vendor = %self.kind, body = %pretty, "Chat-completions request body");
        });

        self.client
            .post(self.url.clone())
            .bearer_auth(&self.credentials.api_key)
            .json(&body)
            .build()
    }
}

#[async_trait]
impl ChatAdapter for ChatCompletionsAdapter {
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

        let parsed: ChatCompletionsResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        let text = parsed.first_text().ok_or_else(|| {
            ProviderError::MalformedResponse("response carried no choice content".to_string())
        })?;

        Ok(Completion {
            text: text.to_string(),
            tokens_used: parsed.total_tokens(),
        })
    }
}
