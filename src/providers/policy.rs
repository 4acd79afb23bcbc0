use hearth_schema::VendorErrorBody;
use reqwest::StatusCode;

use crate::error::ProviderError;
use crate::utils::logging::{body_preview, with_pretty_json_debug};

pub const UPSTREAM_BODY_PREVIEW_CHARS: usize = 300;

/// Raw-body marker used when a vendor reports a rate limit without a 429 or a structured tag.
const RATE_LIMIT_MARKER: &str = "rate_limit";

/// What the router does to provider state after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionForError {
    /// Take the provider out of rotation until the next calendar day.
    MarkUnavailable,
    /// Record the error only.
    None,
}

impl ActionForError {
    pub fn for_error(error: &ProviderError) -> Self {
        if error.is_rate_limited() {
            ActionForError::MarkUnavailable
        } else {
            ActionForError::None
        }
    }
}

/// Classifies a non-2xx answer.
///
/// Order: HTTP 429, then a structured `rate_limit` tag in the vendor error envelope, then the
/// raw-body substring heuristic.
pub fn classify_status(status: StatusCode, body: String) -> ProviderError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return ProviderError::RateLimited { status, body };
    }

    if let Ok(structured) = serde_json::from_str::<VendorErrorBody>(&body)
        && structured.is_rate_limit()
    {
        with_pretty_json_debug(&structured, |pretty| {
            tracing::debug!(%status, body = %pretty, "Structured vendor error tagged as rate limit");
        });
        return ProviderError::RateLimited { status, body };
    }

    if body.to_ascii_lowercase().contains(RATE_LIMIT_MARKER) {
        tracing::debug!(
            %status,
            body = %body_preview(&body, UPSTREAM_BODY_PREVIEW_CHARS),
            "Unstructured vendor error mentions a rate limit"
        );
        return ProviderError::RateLimited { status, body };
    }

    ProviderError::UpstreamStatus { status, body }
}

/// Drains a failed response and classifies it.
pub async fn classify_upstream_error(resp: reqwest::Response) -> ProviderError {
    let status = resp.status();
    let bytes = resp.bytes().await.unwrap_or_default();
    let raw_body = String::from_utf8_lossy(&bytes).into_owned();

    tracing::debug!(
        %status,
        body = %body_preview(&raw_body, UPSTREAM_BODY_PREVIEW_CHARS),
        "Upstream error response"
    );

    classify_status(status, raw_body)
}
