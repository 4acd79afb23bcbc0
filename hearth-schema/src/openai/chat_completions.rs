//! Chat-completions wire format (OpenAI, DeepSeek and other compatible vendors).

use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatCompletionsRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChatCompletionsResponse {
    #[serde(default)]
    pub choices: Vec<ChatCompletionChoice>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<ChatCompletionUsage>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChatCompletionChoice {
    #[serde(default)]
    pub message: ChatCompletionMessage,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChatCompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct ChatCompletionUsage {
    #[serde(default)]
    pub total_tokens: u64,
}

impl ChatCompletionsResponse {
    /// Text of the first choice, if the vendor returned one.
    pub fn first_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }

    pub fn total_tokens(&self) -> u64 {
        self.usage.map_or(0, |usage| usage.total_tokens)
    }
}
