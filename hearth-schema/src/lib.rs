pub mod anthropic;
pub mod chat;
pub mod error;
pub mod message;
pub mod openai;

pub use anthropic::{AnthropicMessagesRequest, AnthropicMessagesResponse};
pub use chat::{ChatReply, ChatRequest};
pub use error::{ApiErrorBody, ApiErrorObject, VendorErrorBody};
pub use message::{ChatMessage, Role};
pub use openai::{ChatCompletionsRequest, ChatCompletionsResponse};
