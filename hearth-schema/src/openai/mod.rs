mod chat_completions;

pub use chat_completions::{
    ChatCompletionChoice, ChatCompletionMessage, ChatCompletionUsage, ChatCompletionsRequest,
    ChatCompletionsResponse,
};
