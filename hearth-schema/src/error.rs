use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Standardized API error response payload.
#[derive(Debug, Deserialize, Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Error envelope returned by every route: `{ "error": { "code": ..., "message": ... } }`.
#[derive(Debug, Deserialize, Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}

/// Vendor error envelope.
///
/// OpenAI and DeepSeek answer `{ "error": { "message", "type", "code" } }`; Anthropic answers
/// `{ "type": "error", "error": { "type", "message" } }`. Both fit this shape.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct VendorErrorBody {
    #[serde(rename = "error")]
    #[serde(default)]
    pub inner: VendorErrorObject,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct VendorErrorObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    /// OpenAI sends a string here; some compatible vendors send numbers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
}

impl VendorErrorBody {
    /// True when the vendor tagged the error as a rate limit in `error.type` or `error.code`.
    pub fn is_rate_limit(&self) -> bool {
        let tagged = |s: &str| s.to_ascii_lowercase().contains("rate_limit");

        self.inner.r#type.as_deref().is_some_and(tagged)
            || self
                .inner
                .code
                .as_ref()
                .and_then(Value::as_str)
                .is_some_and(tagged)
    }
}
