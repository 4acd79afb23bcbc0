use reqwest::StatusCode;
use thiserror::Error as ThisError;

/// Failure of a single provider attempt. Never surfaced to HTTP callers directly; the router
/// logs it, updates provider state and moves on to the next candidate.
#[derive(Debug, ThisError)]
pub enum ProviderError {
    /// Transport-level failure (DNS, connect, timeouts, etc).
    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Vendor signalled a rate limit (429 or a `rate_limit` tagged error body).
    #[error("Rate limited: status={status}, body={body:.200}")]
    RateLimited { status: StatusCode, body: String },

    /// Any other non-2xx answer.
    #[error("Upstream error: status={status}, body={body:.200}")]
    UpstreamStatus { status: StatusCode, body: String },

    /// 2xx answer whose body could not be understood.
    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ProviderError::Transport(e) => e.status(),
            ProviderError::RateLimited { status, .. }
            | ProviderError::UpstreamStatus { status, .. } => Some(*status),
            ProviderError::MalformedResponse(_) => None,
        }
    }
}
