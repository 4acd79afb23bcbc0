use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inbound chat request.
///
/// `preserve_context` defaults to `true` and also accepts the camelCase spelling used by the
/// web frontend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatRequest {
    pub message: String,

    #[serde(default = "default_preserve_context", alias = "preserveContext")]
    pub preserve_context: bool,
}

fn default_preserve_context() -> bool {
    true
}

/// Successful chat reply.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub provider: String,
    pub timestamp: DateTime<Utc>,
    pub tokens_used: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserve_context_defaults_to_true() {
        let req: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).expect("parse");
        assert!(req.preserve_context);
    }

    #[test]
    fn camel_case_alias_is_accepted() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"message":"hi","preserveContext":false}"#).expect("parse");
        assert!(!req.preserve_context);
    }
}
