//! Anthropic messages wire format.

use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnthropicMessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnthropicMessagesResponse {
    #[serde(default)]
    pub content: Vec<AnthropicContentBlock>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<AnthropicUsage>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicContentBlock {
    Text {
        text: String,
    },
    /// Tool use, thinking and any future block types.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct AnthropicUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

impl AnthropicMessagesResponse {
    /// First text block of the reply.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            AnthropicContentBlock::Text { text } => Some(text.as_str()),
            AnthropicContentBlock::Other => None,
        })
    }

    pub fn total_tokens(&self) -> u64 {
        self.usage
            .map_or(0, |usage| usage.input_tokens + usage.output_tokens)
    }
}
